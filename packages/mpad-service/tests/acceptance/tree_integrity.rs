use std::time::Duration;

use uuid::Uuid;

use mpad_service::{ChildrenRequest, DeleteRequest, Error, NoteGetRequest, SetParentRequest};
use mpad_storage::queries;

const SKIP: &str = "Skipping tree integrity test; set MPAD_PG_DSN to run this test.";

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn reparenting_under_a_descendant_is_rejected() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let a = super::create(&h.service, "alice", "A", None).await;
	let b = super::create(&h.service, "alice", "B", Some(a.id)).await;
	let c = super::create(&h.service, "alice", "C", Some(b.id)).await;
	let children = h
		.service
		.get_children(ChildrenRequest { user_id: "alice".to_string(), note_id: a.id })
		.await
		.expect("Failed to list children.");

	assert_eq!(children.notes.iter().map(|note| note.id).collect::<Vec<_>>(), vec![b.id]);
	assert!(children.notes[0].has_children);

	let err = h
		.service
		.set_parent(SetParentRequest {
			user_id: "alice".to_string(),
			note_id: a.id,
			parent: Some(c.id),
		})
		.await
		.expect_err("Expected a cycle to be rejected.");

	assert!(matches!(err, Error::Integrity { .. }), "Unexpected error: {err:?}");
	assert_eq!(super::parent_of(&h.service, a.id).await, None);
	assert_eq!(super::revision_count(&h.service, a.id).await, 1);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn a_note_cannot_parent_itself() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let a = super::create(&h.service, "alice", "A", None).await;
	let err = h
		.service
		.set_parent(SetParentRequest {
			user_id: "alice".to_string(),
			note_id: a.id,
			parent: Some(a.id),
		})
		.await
		.expect_err("Expected self-parenting to be rejected.");

	assert!(matches!(err, Error::Integrity { .. }), "Unexpected error: {err:?}");

	// The same rule holds when the parent arrives through an upsert.
	let err = h
		.service
		.upsert_note(super::put("alice", a.id, "A", "A", Some(a.id)))
		.await
		.expect_err("Expected self-parenting upsert to be rejected.");

	assert!(matches!(err, Error::Integrity { .. }), "Unexpected error: {err:?}");
	assert_eq!(super::parent_of(&h.service, a.id).await, None);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn parents_must_belong_to_the_caller() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let foreign = super::create(&h.service, "bob", "Bob's root", None).await;
	let err = h
		.service
		.upsert_note(super::put("alice", Uuid::new_v4(), "Child", "text", Some(foreign.id)))
		.await
		.expect_err("Expected a foreign parent to be rejected.");

	assert!(matches!(err, Error::Integrity { .. }), "Unexpected error: {err:?}");

	let err = h
		.service
		.upsert_note(super::put("alice", Uuid::new_v4(), "Child", "text", Some(Uuid::new_v4())))
		.await
		.expect_err("Expected a missing parent to be rejected.");

	assert!(matches!(err, Error::Integrity { .. }), "Unexpected error: {err:?}");
	assert_eq!(super::count_rows(&h.service, "notes").await, 1);
	assert_eq!(super::count_rows(&h.service, "note_revisions").await, 1);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn reparent_moves_and_detaches() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let a = super::create(&h.service, "alice", "A", None).await;
	let b = super::create(&h.service, "alice", "B", None).await;
	let moved = h
		.service
		.set_parent(SetParentRequest {
			user_id: "alice".to_string(),
			note_id: b.id,
			parent: Some(a.id),
		})
		.await
		.expect("Failed to reparent note.");

	assert_eq!(moved.parent, Some(a.id));
	assert_eq!(super::parent_of(&h.service, b.id).await, Some(a.id));

	let detached = h
		.service
		.set_parent(SetParentRequest { user_id: "alice".to_string(), note_id: b.id, parent: None })
		.await
		.expect("Failed to detach note.");

	assert_eq!(detached.parent, None);
	assert_eq!(super::revision_count(&h.service, b.id).await, 3);

	let err = h
		.service
		.set_parent(SetParentRequest { user_id: "bob".to_string(), note_id: b.id, parent: None })
		.await
		.expect_err("Expected another owner's note to be invisible.");

	assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err:?}");

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

/// Follows parent links from `start` and fails if a note repeats.
async fn assert_reaches_a_root(h: &super::Harness, start: Uuid) {
	let mut seen = vec![start];
	let mut current = start;

	while let Some(parent) = super::parent_of(&h.service, current).await {
		assert!(!seen.contains(&parent), "Parent chain from {start} loops through {parent}.");

		seen.push(parent);

		current = parent;
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn detaching_put_waits_for_the_owner_tree_lock() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let a = super::create(&h.service, "alice", "A", None).await;
	let b = super::create(&h.service, "alice", "B", Some(a.id)).await;
	let mut tx = h.service.db.pool.begin().await.expect("Failed to begin transaction.");

	queries::lock_owner_tree(&mut tx, "alice").await.expect("Failed to lock owner tree.");

	let blocked = tokio::time::timeout(
		Duration::from_millis(300),
		h.service.upsert_note(super::put("alice", b.id, "B", "B", None)),
	)
	.await;

	assert!(blocked.is_err(), "Detaching put committed while the tree was locked.");
	assert_eq!(super::parent_of(&h.service, b.id).await, Some(a.id));

	tx.rollback().await.expect("Failed to release owner tree lock.");

	let detached = h
		.service
		.upsert_note(super::put("alice", b.id, "B", "B", None))
		.await
		.expect("Failed to detach note.");

	assert_eq!(detached.note.parent, None);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn crossing_reparents_cannot_form_a_cycle() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let a = super::create(&h.service, "alice", "A", None).await;
	let b = super::create(&h.service, "alice", "B", None).await;
	let (a_under_b, b_under_a) = tokio::join!(
		h.service.set_parent(SetParentRequest {
			user_id: "alice".to_string(),
			note_id: a.id,
			parent: Some(b.id),
		}),
		h.service.set_parent(SetParentRequest {
			user_id: "alice".to_string(),
			note_id: b.id,
			parent: Some(a.id),
		}),
	);
	let rejected = [&a_under_b, &b_under_a]
		.into_iter()
		.filter(|res| matches!(res, Err(Error::Integrity { .. })))
		.count();

	assert_eq!(rejected, 1, "Unexpected outcomes: {a_under_b:?} and {b_under_a:?}");
	assert!(a_under_b.is_ok() || b_under_a.is_ok());

	assert_reaches_a_root(&h, a.id).await;
	assert_reaches_a_root(&h, b.id).await;

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn detaching_put_racing_a_parent_delete_matches_a_serial_order() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let a = super::create(&h.service, "alice", "A", None).await;
	let b = super::create(&h.service, "alice", "B", Some(a.id)).await;
	let (put, deleted) = tokio::join!(
		h.service.upsert_note(super::put("alice", b.id, "B", "B", None)),
		h.service.delete_note(DeleteRequest { user_id: "alice".to_string(), note_id: a.id }),
	);
	let put = put.expect("Failed to detach note.");
	let deleted = deleted.expect("Failed to delete parent.");

	// Put first detaches B and spares it; delete first takes B and the Put recreates it.
	assert!(
		matches!(deleted.deleted_count, 1 | 2),
		"Unexpected deleted_count {}.",
		deleted.deleted_count
	);
	assert_eq!(put.note.parent, None);
	assert_eq!(super::parent_of(&h.service, b.id).await, None);
	assert_eq!(super::count_rows(&h.service, "notes").await, 1);

	let err = h
		.service
		.get_note(NoteGetRequest { user_id: "alice".to_string(), note_id: a.id })
		.await
		.expect_err("Expected the deleted parent to be gone.");

	assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err:?}");

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}
