use std::sync::atomic::Ordering;

use uuid::Uuid;

use mpad_domain::tags::NoteTag;
use mpad_service::{Error, NoteGetRequest};

const SKIP: &str = "Skipping upsert test; set MPAD_PG_DSN to run this test.";

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn repeated_puts_keep_state_and_append_revisions() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let note_id = Uuid::new_v4();
	let mut req = super::put("alice", note_id, "Apple pie", "Butter and apples.", None);

	req.tags = vec![NoteTag { id: "food".to_string(), path: vec!["kitchen".to_string()] }];

	let first = h.service.upsert_note(req.clone()).await.expect("Failed to upsert note.");
	let second = h.service.upsert_note(req).await.expect("Failed to repeat upsert.");

	assert_eq!(first.note.id, note_id);
	assert_eq!(second.note.created_at, first.note.created_at);
	assert!(second.note.updated_at >= first.note.updated_at);
	assert_eq!(super::revision_count(&h.service, note_id).await, 2);

	let stored = h
		.service
		.get_note(NoteGetRequest { user_id: "alice".to_string(), note_id })
		.await
		.expect("Failed to read note.")
		.note;

	assert_eq!(stored.title, "Apple pie");
	assert_eq!(stored.tags.len(), 1);
	assert_eq!(stored.tags[0].path, vec!["kitchen".to_string()]);
	assert!(stored.has_embedding);
	assert_eq!(h.embedding.calls.load(Ordering::SeqCst), 2);

	assert_eq!(
		super::stored_embedding(&h.service, note_id).await,
		Some(super::keyword_vector("apple"))
	);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn put_on_a_foreign_id_is_not_found() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let bobs = super::create(&h.service, "bob", "Bob's plan", None).await;
	let err = h
		.service
		.upsert_note(super::put("alice", bobs.id, "Hijack", "text", None))
		.await
		.expect_err("Expected a foreign id to be rejected.");

	assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err:?}");

	let untouched = h
		.service
		.get_note(NoteGetRequest { user_id: "bob".to_string(), note_id: bobs.id })
		.await
		.expect("Failed to read note.")
		.note;

	assert_eq!(untouched.title, "Bob's plan");
	assert_eq!(untouched.user_id, "bob");
	assert_eq!(super::revision_count(&h.service, bobs.id).await, 1);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn embedding_failure_still_persists_the_note() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};

	h.embedding.failing.store(true, Ordering::SeqCst);

	let note = super::create(&h.service, "alice", "River walk", None).await;

	assert!(!note.has_embedding);
	assert_eq!(super::revision_count(&h.service, note.id).await, 1);

	assert_eq!(super::stored_embedding(&h.service, note.id).await, None);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn put_reports_existing_children() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let parent = super::create(&h.service, "alice", "Parent", None).await;

	super::create(&h.service, "alice", "Child", Some(parent.id)).await;

	let updated = h
		.service
		.upsert_note(super::put("alice", parent.id, "Parent v2", "text", None))
		.await
		.expect("Failed to update note.");

	assert!(updated.note.has_children);
	assert_eq!(updated.note.created_at, parent.created_at);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}
