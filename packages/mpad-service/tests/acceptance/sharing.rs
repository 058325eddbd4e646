use mpad_service::{
	Error, RevisionOp, RevisionsRequest, SetParentRequest, SetSharedRequest, SharedNoteRequest,
};

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn shared_notes_are_publicly_readable_until_unshared() {
	let Some(h) = super::harness().await else {
		eprintln!("Skipping sharing test; set MPAD_PG_DSN to run this test.");

		return;
	};
	let note = super::create(&h.service, "alice", "Recipe", None).await;
	let err = h
		.service
		.get_shared_note(SharedNoteRequest { note_id: note.id })
		.await
		.expect_err("Expected an unshared note to be hidden.");

	assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err:?}");

	let shared = h
		.service
		.set_shared(SetSharedRequest { user_id: "alice".to_string(), note_id: note.id, is_shared: true })
		.await
		.expect("Failed to share note.");

	assert!(shared.is_shared);
	assert_eq!(shared.message, "Note is now shared.");

	let public = h
		.service
		.get_shared_note(SharedNoteRequest { note_id: note.id })
		.await
		.expect("Failed to read shared note.");

	assert_eq!(public.title, "Recipe");
	assert_eq!(public.body, note.body);

	let unshared = h
		.service
		.set_shared(SetSharedRequest {
			user_id: "alice".to_string(),
			note_id: note.id,
			is_shared: false,
		})
		.await
		.expect("Failed to unshare note.");

	assert_eq!(unshared.message, "Note is no longer shared.");
	assert!(h.service.get_shared_note(SharedNoteRequest { note_id: note.id }).await.is_err());

	let err = h
		.service
		.set_shared(SetSharedRequest { user_id: "bob".to_string(), note_id: note.id, is_shared: true })
		.await
		.expect_err("Expected another owner's note to be invisible.");

	assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err:?}");

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPAD_PG_DSN to run."]
async fn revisions_list_every_write_newest_first() {
	let Some(h) = super::harness().await else {
		eprintln!("Skipping sharing test; set MPAD_PG_DSN to run this test.");

		return;
	};
	let parent = super::create(&h.service, "alice", "Parent", None).await;
	let note = super::create(&h.service, "alice", "Draft", None).await;

	h.service
		.upsert_note(super::put("alice", note.id, "Final", "Final text", None))
		.await
		.expect("Failed to update note.");
	h.service
		.set_shared(SetSharedRequest { user_id: "alice".to_string(), note_id: note.id, is_shared: true })
		.await
		.expect("Failed to share note.");
	h.service
		.set_parent(SetParentRequest {
			user_id: "alice".to_string(),
			note_id: note.id,
			parent: Some(parent.id),
		})
		.await
		.expect("Failed to reparent note.");

	let listed = h
		.service
		.list_revisions(RevisionsRequest { user_id: "alice".to_string(), note_id: note.id })
		.await
		.expect("Failed to list revisions.");
	let ops = listed.revisions.iter().map(|revision| revision.op).collect::<Vec<_>>();

	assert_eq!(listed.note_id, note.id);
	assert_eq!(
		ops,
		vec![RevisionOp::Reparent, RevisionOp::Share, RevisionOp::Upsert, RevisionOp::Upsert]
	);
	assert_eq!(listed.revisions[0].title, "Final");
	assert_eq!(listed.revisions[3].title, "Draft");

	let err = h
		.service
		.list_revisions(RevisionsRequest { user_id: "bob".to_string(), note_id: note.id })
		.await
		.expect_err("Expected another owner's note to be invisible.");

	assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err:?}");

	h.test_db.cleanup().await.expect("Failed to cleanup test database.");
}
