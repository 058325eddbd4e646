use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// A note as read back for callers. The raw embedding never leaves storage; only its presence
/// is reported.
#[derive(Debug, sqlx::FromRow)]
pub struct NoteRow {
	pub id: Uuid,
	pub user_id: String,
	pub title: String,
	pub body: String,
	pub parent: Option<Uuid>,
	pub tags: Value,
	pub is_shared: bool,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub has_children: bool,
	pub has_embedding: bool,
	pub distance: f64,
}

/// Column values written by an upsert.
#[derive(Debug)]
pub struct NoteUpsert<'a> {
	pub id: Uuid,
	pub user_id: &'a str,
	pub title: &'a str,
	pub body: &'a str,
	pub parent: Option<Uuid>,
	pub tags: &'a Value,
	/// pgvector text literal, or `None` to store `NULL`.
	pub embedding: Option<&'a str>,
	pub now: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct UpsertedNote {
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub is_shared: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub struct NoteContent {
	pub title: String,
	pub body: String,
	pub parent: Option<Uuid>,
	pub is_shared: bool,
}

#[derive(Debug)]
pub struct NewRevision<'a> {
	pub note_id: Uuid,
	pub op: &'a str,
	pub title: &'a str,
	pub body: &'a str,
	pub user_id: &'a str,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct RevisionRow {
	pub revision_id: Uuid,
	pub note_id: Uuid,
	pub op: String,
	pub title: String,
	pub body: String,
	pub user_id: String,
	pub created_at: OffsetDateTime,
}
