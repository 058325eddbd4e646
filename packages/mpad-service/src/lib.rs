pub mod delete;
pub mod error;
pub mod linkage;
pub mod list;
pub mod notes;
pub mod sharing;
pub mod upsert;

use std::{future::Future, pin::Pin, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

pub use delete::{DeleteRequest, DeleteResponse};
pub use error::{Error, Result};
pub use linkage::{SetParentRequest, SetParentResponse};
pub use list::{ListRequest, ListResponse};
pub use notes::{
	ChildrenRequest, ChildrenResponse, NoteGetRequest, NoteResponse, RevisionItem,
	RevisionsRequest, RevisionsResponse, SharedNote, SharedNoteRequest,
};
pub use sharing::{SetSharedRequest, SetSharedResponse};
pub use upsert::{NoteWrite, UpsertRequest, UpsertResponse};

use mpad_config::{Config, EmbeddingProviderConfig};
use mpad_domain::{tags::NoteTag, tree::ParentIndex, vector};
use mpad_providers::embedding;
use mpad_storage::{db::Db, models::NoteRow, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

/// Kind of write recorded in the revision log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevisionOp {
	Upsert,
	Share,
	Reparent,
}
impl RevisionOp {
	const ALL: [Self; 3] = [Self::Upsert, Self::Share, Self::Reparent];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Upsert => "UPSERT",
			Self::Share => "SHARE",
			Self::Reparent => "REPARENT",
		}
	}
}
impl FromStr for RevisionOp {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		Self::ALL
			.into_iter()
			.find(|op| op.as_str() == raw)
			.ok_or_else(|| Error::Storage { message: format!("Unknown revision op {raw:?}.") })
	}
}

/// A note as returned to its owner. The embedding itself is never exposed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Note {
	pub id: Uuid,
	pub user_id: String,
	pub title: String,
	pub body: String,
	pub parent: Option<Uuid>,
	pub tags: Vec<NoteTag>,
	pub is_shared: bool,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
	pub has_children: bool,
	pub has_embedding: bool,
	/// Distance to the search query; zero outside of searches.
	pub distance: f64,
}
impl TryFrom<NoteRow> for Note {
	type Error = Error;

	fn try_from(row: NoteRow) -> Result<Self> {
		Ok(Self {
			tags: mpad_domain::tags::decode_tags(&row.tags)?,
			id: row.id,
			user_id: row.user_id,
			title: row.title,
			body: row.body,
			parent: row.parent,
			is_shared: row.is_shared,
			created_at: row.created_at,
			updated_at: row.updated_at,
			has_children: row.has_children,
			has_embedding: row.has_embedding,
			distance: row.distance,
		})
	}
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

pub struct MpadService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}
impl MpadService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}

	/// Embeds one text and checks the vector fits the configured column.
	pub(crate) async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
		let cfg = &self.cfg.providers.embedding;
		let texts = [text.to_string()];
		let mut vectors = self.providers.embedding.embed(cfg, &texts).await?;
		let vec = vectors.pop().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if !vector::is_well_formed(&vec, self.cfg.storage.vector_dim) {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned a malformed vector of dimension {}; expected {}.",
					vec.len(),
					self.cfg.storage.vector_dim
				),
			});
		}

		Ok(vec)
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}

pub(crate) fn require_user_id(user_id: &str) -> Result<&str> {
	let user_id = user_id.trim();

	if user_id.is_empty() {
		return Err(Error::InvalidRequest { message: "user_id is required.".to_string() });
	}

	Ok(user_id)
}

/// `note_id` and every note below it, parents before children.
pub(crate) async fn descendant_closure(
	conn: &mut PgConnection,
	user_id: &str,
	note_id: Uuid,
) -> Result<Vec<Uuid>> {
	let edges = queries::owner_edges(&mut *conn, user_id).await?;

	Ok(ParentIndex::from_edges(edges).closure(note_id))
}

/// Checks that `parent` may become the parent of `note_id`: it must be one of the owner's notes
/// and must not sit inside the subtree of `note_id`. Callers hold the owner's tree lock.
pub(crate) async fn validate_parent(
	conn: &mut PgConnection,
	user_id: &str,
	note_id: Uuid,
	parent: Uuid,
) -> Result<()> {
	if !queries::note_exists(&mut *conn, parent, user_id).await? {
		return Err(Error::Integrity { message: "Parent note not found.".to_string() });
	}

	let edges = queries::owner_edges(&mut *conn, user_id).await?;

	if ParentIndex::from_edges(edges).would_cycle(note_id, parent) {
		return Err(Error::Integrity {
			message: "Setting this parent would create a circular reference.".to_string(),
		});
	}

	Ok(())
}
