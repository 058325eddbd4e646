use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use mpad_domain::tags::NoteTag;
use mpad_storage::queries;

use crate::{Error, MpadService, Note, Result, RevisionOp};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoteGetRequest {
	pub user_id: String,
	pub note_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoteResponse {
	pub note: Note,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChildrenRequest {
	pub user_id: String,
	pub note_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChildrenResponse {
	pub notes: Vec<Note>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SharedNoteRequest {
	pub note_id: Uuid,
}

/// Public view of a shared note. Owner and tree details stay private.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SharedNote {
	pub id: Uuid,
	pub title: String,
	pub body: String,
	pub tags: Vec<NoteTag>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevisionsRequest {
	pub user_id: String,
	pub note_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevisionItem {
	pub revision_id: Uuid,
	pub op: RevisionOp,
	pub title: String,
	pub body: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevisionsResponse {
	pub note_id: Uuid,
	pub revisions: Vec<RevisionItem>,
}

impl MpadService {
	pub async fn get_note(&self, req: NoteGetRequest) -> Result<NoteResponse> {
		let user_id = crate::require_user_id(&req.user_id)?;
		let row = queries::fetch_note(&self.db.pool, req.note_id, user_id)
			.await?
			.ok_or_else(Error::note_not_found)?;

		Ok(NoteResponse { note: Note::try_from(row)? })
	}

	/// Direct children of a note, most recently updated first.
	pub async fn get_children(&self, req: ChildrenRequest) -> Result<ChildrenResponse> {
		let user_id = crate::require_user_id(&req.user_id)?;
		let mut tx = self.db.pool.begin().await?;

		queries::use_snapshot_reads(&mut tx).await?;

		if !queries::note_exists(&mut *tx, req.note_id, user_id).await? {
			return Err(Error::note_not_found());
		}

		let rows = queries::fetch_children(&mut *tx, req.note_id, user_id).await?;

		tx.commit().await?;

		let notes = rows.into_iter().map(Note::try_from).collect::<Result<Vec<_>>>()?;

		Ok(ChildrenResponse { notes })
	}

	/// Reads a note without authentication, provided its owner shared it.
	pub async fn get_shared_note(&self, req: SharedNoteRequest) -> Result<SharedNote> {
		let row = queries::fetch_shared_note(&self.db.pool, req.note_id)
			.await?
			.ok_or_else(Error::note_not_found)?;
		let note = Note::try_from(row)?;

		Ok(SharedNote {
			id: note.id,
			title: note.title,
			body: note.body,
			tags: note.tags,
			created_at: note.created_at,
			updated_at: note.updated_at,
		})
	}

	pub async fn list_revisions(&self, req: RevisionsRequest) -> Result<RevisionsResponse> {
		let user_id = crate::require_user_id(&req.user_id)?;
		let mut tx = self.db.pool.begin().await?;

		queries::use_snapshot_reads(&mut tx).await?;

		if !queries::note_exists(&mut *tx, req.note_id, user_id).await? {
			return Err(Error::note_not_found());
		}

		let rows = queries::list_revisions(&mut *tx, req.note_id).await?;

		tx.commit().await?;

		let revisions = rows
			.into_iter()
			.map(|row| {
				Ok(RevisionItem {
					op: row.op.parse()?,
					revision_id: row.revision_id,
					title: row.title,
					body: row.body,
					created_at: row.created_at,
				})
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(RevisionsResponse { note_id: req.note_id, revisions })
	}
}
