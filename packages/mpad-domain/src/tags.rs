use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A tag attached to a note. `path` lists the ancestor tag ids, outermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTag {
	pub id: String,
	#[serde(default)]
	pub path: Vec<String>,
}

pub fn encode_tags(tags: &[NoteTag]) -> Result<serde_json::Value> {
	serde_json::to_value(tags).map_err(|err| Error::InvalidTags { message: err.to_string() })
}

/// Decodes the stored tag column. A JSON `null` decodes to no tags.
pub fn decode_tags(value: &serde_json::Value) -> Result<Vec<NoteTag>> {
	if value.is_null() {
		return Ok(Vec::new());
	}

	serde_json::from_value(value.clone())
		.map_err(|err| Error::InvalidTags { message: err.to_string() })
}
