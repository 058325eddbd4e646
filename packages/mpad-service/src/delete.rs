use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mpad_storage::queries;

use crate::{Error, MpadService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteRequest {
	pub user_id: String,
	pub note_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
	pub message: String,
	pub deleted_count: u64,
}

impl MpadService {
	/// Deletes a note, its whole subtree, and every revision of the removed notes in one
	/// transaction.
	pub async fn delete_note(&self, req: DeleteRequest) -> Result<DeleteResponse> {
		let user_id = crate::require_user_id(&req.user_id)?;
		let mut tx = self.db.pool.begin().await?;

		queries::lock_owner_tree(&mut tx, user_id).await?;

		if !queries::note_exists(&mut *tx, req.note_id, user_id).await? {
			return Err(Error::note_not_found());
		}

		let mut closure = crate::descendant_closure(&mut tx, user_id, req.note_id).await?;

		queries::delete_revisions(&mut tx, &closure).await?;

		closure.reverse();

		let deleted_count = queries::delete_notes_in_order(&mut tx, &closure, user_id).await?;

		tx.commit().await?;

		tracing::info!(note_id = %req.note_id, deleted_count, "Note deleted.");

		let message = if deleted_count > 1 { "Note and child notes deleted." } else { "Note deleted." };

		Ok(DeleteResponse { message: message.to_string(), deleted_count })
	}
}
