use mpad_service::{ChildrenRequest, DeleteRequest, Error, SetSharedRequest};

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn deleting_a_parent_removes_its_subtree_and_revisions() {
	let Some(h) = super::harness().await else {
		eprintln!("Skipping cascade delete test; set MPAD_PG_DSN to run this test.");

		return;
	};
	let a = super::create(&h.service, "alice", "A", None).await;
	let b = super::create(&h.service, "alice", "B", Some(a.id)).await;
	let c = super::create(&h.service, "alice", "C", Some(b.id)).await;
	let sibling = super::create(&h.service, "alice", "Sibling", None).await;

	super::create(&h.service, "bob", "Bob's note", None).await;

	h.service
		.set_shared(SetSharedRequest { user_id: "alice".to_string(), note_id: c.id, is_shared: true })
		.await
		.expect("Failed to share note.");

	let deleted = h
		.service
		.delete_note(DeleteRequest { user_id: "alice".to_string(), note_id: a.id })
		.await
		.expect("Failed to delete note.");

	assert_eq!(deleted.deleted_count, 3);
	assert_eq!(deleted.message, "Note and child notes deleted.");

	for id in [a.id, b.id, c.id] {
		assert_eq!(super::revision_count(&h.service, id).await, 0);
	}

	assert_eq!(super::count_rows(&h.service, "notes").await, 2);
	assert_eq!(super::revision_count(&h.service, sibling.id).await, 1);

	let err = h
		.service
		.get_children(ChildrenRequest { user_id: "alice".to_string(), note_id: a.id })
		.await
		.expect_err("Expected the deleted parent to be gone.");

	assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err:?}");

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn delete_is_scoped_to_the_owner() {
	let Some(h) = super::harness().await else {
		eprintln!("Skipping cascade delete test; set MPAD_PG_DSN to run this test.");

		return;
	};
	let leaf = super::create(&h.service, "alice", "Leaf", None).await;
	let err = h
		.service
		.delete_note(DeleteRequest { user_id: "bob".to_string(), note_id: leaf.id })
		.await
		.expect_err("Expected another owner's note to be invisible.");

	assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err:?}");

	let deleted = h
		.service
		.delete_note(DeleteRequest { user_id: "alice".to_string(), note_id: leaf.id })
		.await
		.expect("Failed to delete note.");

	assert_eq!(deleted.deleted_count, 1);
	assert_eq!(deleted.message, "Note deleted.");
	assert_eq!(super::count_rows(&h.service, "notes").await, 0);
	assert_eq!(super::count_rows(&h.service, "note_revisions").await, 0);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}
