use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use mpad_storage::{models::NewRevision, queries};

use crate::{Error, MpadService, Result, RevisionOp};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetParentRequest {
	pub user_id: String,
	pub note_id: Uuid,
	/// `None` turns the note into a root.
	pub parent: Option<Uuid>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetParentResponse {
	pub message: String,
	pub parent: Option<Uuid>,
}

impl MpadService {
	/// Moves a note under another of the caller's notes, or to the root.
	///
	/// Rejects parents the caller does not own and any move that would put a note below itself,
	/// including making a note its own parent.
	pub async fn set_parent(&self, req: SetParentRequest) -> Result<SetParentResponse> {
		let user_id = crate::require_user_id(&req.user_id)?;
		let now = OffsetDateTime::now_utc();
		let mut tx = self.db.pool.begin().await?;

		queries::lock_owner_tree(&mut tx, user_id).await?;

		if !queries::note_exists(&mut *tx, req.note_id, user_id).await? {
			return Err(Error::note_not_found());
		}
		if let Some(parent) = req.parent {
			crate::validate_parent(&mut tx, user_id, req.note_id, parent).await?;
		}

		let content = queries::set_parent(&mut tx, req.note_id, user_id, req.parent, now)
			.await?
			.ok_or_else(Error::note_not_found)?;

		queries::insert_revision(
			&mut tx,
			&NewRevision {
				note_id: req.note_id,
				op: RevisionOp::Reparent.as_str(),
				title: &content.title,
				body: &content.body,
				user_id,
				created_at: now,
			},
		)
		.await?;

		tx.commit().await?;

		tracing::info!(note_id = %req.note_id, parent = ?content.parent, "Note reparented.");

		Ok(SetParentResponse { message: "Note parent updated.".to_string(), parent: content.parent })
	}
}
