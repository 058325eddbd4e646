use std::sync::atomic::Ordering;

use mpad_domain::query::ParentFilter;
use mpad_service::{Error, ListRequest};

const SKIP: &str = "Skipping search test; set MPAD_PG_DSN to run this test.";

fn list(user_id: &str, page: u32, limit: u32) -> ListRequest {
	ListRequest {
		user_id: user_id.to_string(),
		page: Some(page),
		limit: Some(limit),
		..ListRequest::default()
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn pages_report_totals_and_has_more() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};

	for title in ["One", "Two", "Three"] {
		super::create(&h.service, "alice", title, None).await;
	}

	super::create(&h.service, "bob", "Not mine", None).await;

	let first = h.service.list_notes(list("alice", 1, 2)).await.expect("Failed to list notes.");

	assert_eq!(first.notes.len(), 2);
	assert_eq!(first.pagination.total, 3);
	assert!(first.pagination.has_more);
	// Newest first.
	assert_eq!(first.notes[0].title, "Three");

	let second = h.service.list_notes(list("alice", 2, 2)).await.expect("Failed to list notes.");

	assert_eq!(second.notes.len(), 1);
	assert!(!second.pagination.has_more);

	let beyond = h.service.list_notes(list("alice", 5, 2)).await.expect("Failed to list notes.");

	assert!(beyond.notes.is_empty());
	assert_eq!(beyond.pagination.total, 3);
	assert!(!beyond.pagination.has_more);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn parent_filter_selects_roots_or_children() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let root = super::create(&h.service, "alice", "Root", None).await;
	let child = super::create(&h.service, "alice", "Child", Some(root.id)).await;

	super::create(&h.service, "alice", "Grandchild", Some(child.id)).await;

	let roots = h
		.service
		.list_notes(ListRequest { parent: ParentFilter::Roots, ..list("alice", 1, 10) })
		.await
		.expect("Failed to list roots.");

	assert_eq!(roots.notes.len(), 1);
	assert_eq!(roots.notes[0].id, root.id);
	assert!(roots.notes[0].has_children);

	let children = h
		.service
		.list_notes(ListRequest { parent: ParentFilter::Children(root.id), ..list("alice", 1, 10) })
		.await
		.expect("Failed to list children.");

	assert_eq!(children.notes.len(), 1);
	assert_eq!(children.notes[0].id, child.id);

	let all = h.service.list_notes(list("alice", 1, 10)).await.expect("Failed to list notes.");

	assert_eq!(all.pagination.total, 3);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn search_returns_only_close_notes_with_embeddings() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};
	let apple = super::create(&h.service, "alice", "Apple tart", None).await;

	super::create(&h.service, "alice", "River trip", None).await;

	h.embedding.failing.store(true, Ordering::SeqCst);

	let unembedded = super::create(&h.service, "alice", "Apple crumble", None).await;

	assert!(!unembedded.has_embedding);

	h.embedding.failing.store(false, Ordering::SeqCst);

	let found = h
		.service
		.list_notes(ListRequest { query: Some("apples".to_string()), ..list("alice", 1, 10) })
		.await
		.expect("Failed to search notes.");

	assert_eq!(found.pagination.total, 1);
	assert_eq!(found.notes.len(), 1);
	assert_eq!(found.notes[0].id, apple.id);
	assert!(found.notes[0].distance < 1e-6);

	// A blank query is a plain listing.
	let listed = h
		.service
		.list_notes(ListRequest { query: Some("   ".to_string()), ..list("alice", 1, 10) })
		.await
		.expect("Failed to list notes.");

	assert_eq!(listed.pagination.total, 3);

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn search_fails_when_the_provider_fails() {
	let Some(h) = super::harness().await else {
		eprintln!("{SKIP}");

		return;
	};

	super::create(&h.service, "alice", "Apple tart", None).await;

	h.embedding.failing.store(true, Ordering::SeqCst);

	let err = h
		.service
		.list_notes(ListRequest { query: Some("apple".to_string()), ..list("alice", 1, 10) })
		.await
		.expect_err("Expected the search to fail.");

	assert!(matches!(err, Error::Provider { .. }), "Unexpected error: {err:?}");

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}
