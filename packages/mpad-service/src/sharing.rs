use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use mpad_storage::{models::NewRevision, queries};

use crate::{Error, MpadService, Result, RevisionOp};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetSharedRequest {
	pub user_id: String,
	pub note_id: Uuid,
	pub is_shared: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetSharedResponse {
	pub message: String,
	pub is_shared: bool,
}

impl MpadService {
	pub async fn set_shared(&self, req: SetSharedRequest) -> Result<SetSharedResponse> {
		let user_id = crate::require_user_id(&req.user_id)?;
		let now = OffsetDateTime::now_utc();
		let mut tx = self.db.pool.begin().await?;
		let content = queries::set_shared(&mut tx, req.note_id, user_id, req.is_shared, now)
			.await?
			.ok_or_else(Error::note_not_found)?;

		queries::insert_revision(
			&mut tx,
			&NewRevision {
				note_id: req.note_id,
				op: RevisionOp::Share.as_str(),
				title: &content.title,
				body: &content.body,
				user_id,
				created_at: now,
			},
		)
		.await?;

		tx.commit().await?;

		let message = if content.is_shared { "Note is now shared." } else { "Note is no longer shared." };

		Ok(SetSharedResponse { message: message.to_string(), is_shared: content.is_shared })
	}
}
