#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectEmptyTitle,
	RejectTitleTooLong,
	RejectBodyTooLarge,
	RejectEmptyTagId,
}
impl RejectCode {
	pub fn message(self) -> &'static str {
		match self {
			Self::RejectEmptyTitle => "title must be non-empty.",
			Self::RejectTitleTooLong => "title exceeds notes.max_title_chars.",
			Self::RejectBodyTooLarge => "body exceeds notes.max_body_bytes.",
			Self::RejectEmptyTagId => "tags must have non-empty ids.",
		}
	}
}

pub struct NoteInput<'a> {
	pub title: &'a str,
	pub body: &'a str,
	pub tags: &'a [crate::tags::NoteTag],
}

pub fn notegate(note: &NoteInput<'_>, cfg: &mpad_config::Notes) -> Result<(), RejectCode> {
	if note.title.trim().is_empty() {
		return Err(RejectCode::RejectEmptyTitle);
	}
	if note.title.chars().count() > cfg.max_title_chars as usize {
		return Err(RejectCode::RejectTitleTooLong);
	}
	if note.body.len() > cfg.max_body_bytes as usize {
		return Err(RejectCode::RejectBodyTooLarge);
	}
	if note.tags.iter().any(|tag| tag.id.trim().is_empty()) {
		return Err(RejectCode::RejectEmptyTagId);
	}

	Ok(())
}
