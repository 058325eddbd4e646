use sqlx::{PgConnection, PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use mpad_domain::query::ParentFilter;

use crate::{
	Result,
	models::{NewRevision, NoteContent, NoteRow, NoteUpsert, RevisionRow, UpsertedNote},
};

const TREE_LOCK_NAMESPACE: i32 = 6_120_417;

const NOTE_COLUMNS: &str = "\
n.id,
	n.user_id,
	n.title,
	n.body,
	n.parent,
	n.tags,
	n.is_shared,
	n.created_at,
	n.updated_at,
	EXISTS (SELECT 1 FROM notes c WHERE c.user_id = n.user_id AND c.parent = n.id) AS has_children,
	(n.embedding IS NOT NULL) AS has_embedding";

/// Owner-scoped filter shared by the count and page queries of a listing.
#[derive(Debug)]
pub struct NoteFilter<'a> {
	pub user_id: &'a str,
	pub parent: ParentFilter,
	pub near: Option<NearVector<'a>>,
}

/// Restricts a listing to notes whose embedding lies strictly within `max_distance` (L2) of
/// `vector`, a pgvector text literal.
#[derive(Debug)]
pub struct NearVector<'a> {
	pub vector: &'a str,
	pub max_distance: f64,
}

/// Serializes tree mutations of one owner until the enclosing transaction ends.
pub async fn lock_owner_tree(conn: &mut PgConnection, user_id: &str) -> Result<()> {
	sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
		.bind(TREE_LOCK_NAMESPACE)
		.bind(user_id)
		.execute(conn)
		.await?;

	Ok(())
}

pub async fn owner_edges<'e, E>(executor: E, user_id: &str) -> Result<Vec<(Uuid, Option<Uuid>)>>
where
	E: PgExecutor<'e>,
{
	let edges = sqlx::query_as("SELECT id, parent FROM notes WHERE user_id = $1")
		.bind(user_id)
		.fetch_all(executor)
		.await?;

	Ok(edges)
}

pub async fn note_exists<'e, E>(executor: E, id: Uuid, user_id: &str) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let exists =
		sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM notes WHERE id = $1 AND user_id = $2)")
			.bind(id)
			.bind(user_id)
			.fetch_one(executor)
			.await?;

	Ok(exists)
}

pub async fn has_children<'e, E>(executor: E, id: Uuid, user_id: &str) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let exists = sqlx::query_scalar(
		"SELECT EXISTS (SELECT 1 FROM notes WHERE parent = $1 AND user_id = $2)",
	)
	.bind(id)
	.bind(user_id)
	.fetch_one(executor)
	.await?;

	Ok(exists)
}

/// Makes the current transaction read from one snapshot, so a count and the page that follows
/// it agree.
pub async fn use_snapshot_reads(conn: &mut PgConnection) -> Result<()> {
	sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY").execute(conn).await?;

	Ok(())
}

/// Inserts a note or overwrites the caller's existing note with the same id.
///
/// Returns `None` when the id belongs to another owner; that row is left untouched.
pub async fn upsert_note(
	conn: &mut PgConnection,
	note: &NoteUpsert<'_>,
) -> Result<Option<UpsertedNote>> {
	let row = sqlx::query_as::<_, UpsertedNote>(
		"\
INSERT INTO notes (id, user_id, title, body, parent, tags, embedding, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7::text::vector, $8, $8)
ON CONFLICT (id) DO UPDATE
SET
	title = EXCLUDED.title,
	body = EXCLUDED.body,
	parent = EXCLUDED.parent,
	tags = EXCLUDED.tags,
	embedding = EXCLUDED.embedding,
	updated_at = EXCLUDED.updated_at
WHERE notes.user_id = EXCLUDED.user_id
RETURNING created_at, updated_at, is_shared",
	)
	.bind(note.id)
	.bind(note.user_id)
	.bind(note.title)
	.bind(note.body)
	.bind(note.parent)
	.bind(note.tags)
	.bind(note.embedding)
	.bind(note.now)
	.fetch_optional(conn)
	.await?;

	Ok(row)
}

pub async fn insert_revision(conn: &mut PgConnection, revision: &NewRevision<'_>) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO note_revisions (revision_id, note_id, op, title, body, user_id, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7)",
	)
	.bind(Uuid::new_v4())
	.bind(revision.note_id)
	.bind(revision.op)
	.bind(revision.title)
	.bind(revision.body)
	.bind(revision.user_id)
	.bind(revision.created_at)
	.execute(conn)
	.await?;

	Ok(())
}

pub async fn set_shared(
	conn: &mut PgConnection,
	id: Uuid,
	user_id: &str,
	is_shared: bool,
	now: time::OffsetDateTime,
) -> Result<Option<NoteContent>> {
	let row = sqlx::query_as::<_, NoteContent>(
		"\
UPDATE notes
SET is_shared = $3, updated_at = $4
WHERE id = $1 AND user_id = $2
RETURNING title, body, parent, is_shared",
	)
	.bind(id)
	.bind(user_id)
	.bind(is_shared)
	.bind(now)
	.fetch_optional(conn)
	.await?;

	Ok(row)
}

pub async fn set_parent(
	conn: &mut PgConnection,
	id: Uuid,
	user_id: &str,
	parent: Option<Uuid>,
	now: time::OffsetDateTime,
) -> Result<Option<NoteContent>> {
	let row = sqlx::query_as::<_, NoteContent>(
		"\
UPDATE notes
SET parent = $3, updated_at = $4
WHERE id = $1 AND user_id = $2
RETURNING title, body, parent, is_shared",
	)
	.bind(id)
	.bind(user_id)
	.bind(parent)
	.bind(now)
	.fetch_optional(conn)
	.await?;

	Ok(row)
}

pub async fn delete_revisions(conn: &mut PgConnection, note_ids: &[Uuid]) -> Result<u64> {
	let result = sqlx::query("DELETE FROM note_revisions WHERE note_id = ANY($1)")
		.bind(note_ids)
		.execute(conn)
		.await?;

	Ok(result.rows_affected())
}

/// Deletes notes one by one in the given order. Callers pass children before parents so every
/// statement satisfies the parent reference.
pub async fn delete_notes_in_order(
	conn: &mut PgConnection,
	note_ids: &[Uuid],
	user_id: &str,
) -> Result<u64> {
	let mut deleted = 0;

	for id in note_ids {
		let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
			.bind(id)
			.bind(user_id)
			.execute(&mut *conn)
			.await?;

		deleted += result.rows_affected();
	}

	Ok(deleted)
}

pub async fn fetch_note<'e, E>(executor: E, id: Uuid, user_id: &str) -> Result<Option<NoteRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"SELECT {NOTE_COLUMNS}, 0::float8 AS distance FROM notes n WHERE n.id = $1 AND n.user_id = $2"
	);
	let row = sqlx::query_as::<_, NoteRow>(&sql)
		.bind(id)
		.bind(user_id)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}

pub async fn fetch_shared_note<'e, E>(executor: E, id: Uuid) -> Result<Option<NoteRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"SELECT {NOTE_COLUMNS}, 0::float8 AS distance FROM notes n WHERE n.id = $1 AND n.is_shared"
	);
	let row = sqlx::query_as::<_, NoteRow>(&sql).bind(id).fetch_optional(executor).await?;

	Ok(row)
}

pub async fn fetch_children<'e, E>(executor: E, parent: Uuid, user_id: &str) -> Result<Vec<NoteRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT {NOTE_COLUMNS}, 0::float8 AS distance
FROM notes n
WHERE n.parent = $1 AND n.user_id = $2
ORDER BY n.updated_at DESC, n.id ASC"
	);
	let rows =
		sqlx::query_as::<_, NoteRow>(&sql).bind(parent).bind(user_id).fetch_all(executor).await?;

	Ok(rows)
}

pub async fn count_notes<'e, E>(executor: E, filter: &NoteFilter<'_>) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let mut builder = QueryBuilder::<Postgres>::new("SELECT count(*) FROM notes n");

	push_filters(&mut builder, filter);

	let total = builder.build_query_scalar::<i64>().fetch_one(executor).await?;

	Ok(total)
}

/// One page of the owner's notes. Searches order by distance, listings by recency; `id` breaks
/// ties in both.
pub async fn fetch_notes_page<'e, E>(
	executor: E,
	filter: &NoteFilter<'_>,
	offset: i64,
	limit: i64,
) -> Result<Vec<NoteRow>>
where
	E: PgExecutor<'e>,
{
	let mut builder = QueryBuilder::<Postgres>::new("SELECT ");

	builder.push(NOTE_COLUMNS);

	match filter.near.as_ref() {
		Some(near) => {
			builder.push(", (n.embedding <-> ");
			builder.push_bind(near.vector);
			builder.push("::text::vector)::float8 AS distance FROM notes n");
		},
		None => {
			builder.push(", 0::float8 AS distance FROM notes n");
		},
	}

	push_filters(&mut builder, filter);

	if filter.near.is_some() {
		builder.push(" ORDER BY distance ASC, n.id ASC");
	} else {
		builder.push(" ORDER BY n.updated_at DESC, n.id ASC");
	}

	builder.push(" LIMIT ");
	builder.push_bind(limit);
	builder.push(" OFFSET ");
	builder.push_bind(offset);

	let rows = builder.build_query_as::<NoteRow>().fetch_all(executor).await?;

	Ok(rows)
}

pub async fn list_revisions<'e, E>(executor: E, note_id: Uuid) -> Result<Vec<RevisionRow>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, RevisionRow>(
		"\
SELECT revision_id, note_id, op, title, body, user_id, created_at
FROM note_revisions
WHERE note_id = $1
ORDER BY created_at DESC, revision_id ASC",
	)
	.bind(note_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &NoteFilter<'a>) {
	builder.push(" WHERE n.user_id = ");
	builder.push_bind(filter.user_id);

	match filter.parent {
		ParentFilter::Any => {},
		ParentFilter::Roots => {
			builder.push(" AND n.parent IS NULL");
		},
		ParentFilter::Children(parent) => {
			builder.push(" AND n.parent = ");
			builder.push_bind(parent);
		},
	}

	if let Some(near) = filter.near.as_ref() {
		builder.push(" AND (n.embedding <-> ");
		builder.push_bind(near.vector);
		builder.push("::text::vector) < ");
		builder.push_bind(near.max_distance);
	}
}
