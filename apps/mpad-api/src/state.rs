use std::sync::Arc;

use mpad_service::MpadService;
use mpad_storage::db::Db;

use crate::auth::AuthState;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MpadService>,
	pub auth: Arc<AuthState>,
}
impl AppState {
	pub async fn new(config: mpad_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.storage.vector_dim).await?;

		Ok(Self::from_service(MpadService::new(config, db)))
	}

	/// Wraps an already configured service; authentication follows its `security` section.
	pub fn from_service(service: MpadService) -> Self {
		let auth = AuthState::from_config(&service.cfg.security);

		Self { service: Arc::new(service), auth: Arc::new(auth) }
	}
}
