use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use mpad_domain::{
	document,
	notegate::{self, NoteInput},
	tags::{self, NoteTag},
	vector,
};
use mpad_storage::{
	models::{NewRevision, NoteUpsert},
	queries,
};

use crate::{Error, MpadService, Note, Result, RevisionOp};

/// How the note id of an upsert is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteWrite {
	/// A new note with a server-generated id.
	Create,
	/// Create the note with this id, or overwrite the caller's existing note with it.
	Put { note_id: Uuid },
}

#[derive(Clone, Debug)]
pub struct UpsertRequest {
	pub user_id: String,
	pub write: NoteWrite,
	pub title: String,
	pub body: String,
	pub parent: Option<Uuid>,
	pub tags: Vec<NoteTag>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpsertResponse {
	pub note: Note,
}

impl MpadService {
	pub async fn upsert_note(&self, req: UpsertRequest) -> Result<UpsertResponse> {
		let user_id = crate::require_user_id(&req.user_id)?;

		notegate::notegate(
			&NoteInput { title: &req.title, body: &req.body, tags: &req.tags },
			&self.cfg.notes,
		)
		.map_err(|code| Error::InvalidRequest { message: code.message().to_string() })?;

		let embedding_input = document::embedding_input(&req.title, &req.body)?;
		let note_id = match req.write {
			NoteWrite::Create => Uuid::new_v4(),
			NoteWrite::Put { note_id } => note_id,
		};
		// The provider call happens before the transaction opens; a failure only costs the vector.
		let embedding = match self.embed_text(&embedding_input).await {
			Ok(vec) => Some(vector::vector_to_pg(&vec)),
			Err(err) => {
				tracing::warn!(
					note_id = %note_id,
					error = %err,
					"Embedding failed. Storing note without an embedding."
				);

				None
			},
		};
		let tags_json = tags::encode_tags(&req.tags)?;
		let now = OffsetDateTime::now_utc();
		let mut tx = self.db.pool.begin().await?;

		// A Put can detach the note, so it serializes with deletes even without a parent.
		queries::lock_owner_tree(&mut tx, user_id).await?;

		if let Some(parent) = req.parent {
			crate::validate_parent(&mut tx, user_id, note_id, parent).await?;
		}

		let persisted = queries::upsert_note(
			&mut tx,
			&NoteUpsert {
				id: note_id,
				user_id,
				title: &req.title,
				body: &req.body,
				parent: req.parent,
				tags: &tags_json,
				embedding: embedding.as_deref(),
				now,
			},
		)
		.await?
		.ok_or_else(Error::note_not_found)?;

		queries::insert_revision(
			&mut tx,
			&NewRevision {
				note_id,
				op: RevisionOp::Upsert.as_str(),
				title: &req.title,
				body: &req.body,
				user_id,
				created_at: now,
			},
		)
		.await?;

		let has_children = match req.write {
			NoteWrite::Create => false,
			NoteWrite::Put { .. } => queries::has_children(&mut *tx, note_id, user_id).await?,
		};

		tx.commit().await?;

		tracing::info!(note_id = %note_id, has_embedding = embedding.is_some(), "Note upserted.");

		Ok(UpsertResponse {
			note: Note {
				id: note_id,
				user_id: user_id.to_string(),
				title: req.title,
				body: req.body,
				parent: req.parent,
				tags: req.tags,
				is_shared: persisted.is_shared,
				created_at: persisted.created_at,
				updated_at: persisted.updated_at,
				has_children,
				has_embedding: embedding.is_some(),
				distance: 0.0,
			},
		})
	}
}
