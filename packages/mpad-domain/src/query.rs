use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Parent constraint applied when listing or searching notes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParentFilter {
	/// All notes regardless of depth.
	#[default]
	Any,
	/// Only notes without a parent.
	Roots,
	/// Only direct children of the given note.
	Children(Uuid),
}
impl ParentFilter {
	/// Maps a raw query parameter: absent means [`ParentFilter::Any`], an empty value means
	/// [`ParentFilter::Roots`], and anything else must be a note id.
	pub fn parse(raw: Option<&str>) -> Result<Self> {
		let Some(raw) = raw else {
			return Ok(Self::Any);
		};
		let raw = raw.trim();

		if raw.is_empty() {
			return Ok(Self::Roots);
		}

		Uuid::parse_str(raw).map(Self::Children).map_err(|_| Error::InvalidParentFilter {
			message: "parent must be empty or a valid note id.".to_string(),
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
	pub page: u32,
	pub limit: u32,
}
impl Page {
	pub fn resolve(page: Option<u32>, limit: Option<u32>, cfg: &mpad_config::Search) -> Result<Self> {
		let page = page.unwrap_or(1);
		let limit = limit.unwrap_or(cfg.default_limit);

		if page == 0 {
			return Err(Error::InvalidPage { message: "page must be 1 or greater.".to_string() });
		}
		if limit == 0 || limit > cfg.max_limit {
			return Err(Error::InvalidPage {
				message: format!("limit must be between 1 and {}.", cfg.max_limit),
			});
		}

		Ok(Self { page, limit })
	}

	pub fn offset(&self) -> i64 {
		(i64::from(self.page) - 1) * i64::from(self.limit)
	}

	pub fn pagination(&self, total: i64) -> Pagination {
		Pagination {
			page: self.page,
			limit: self.limit,
			total,
			has_more: i64::from(self.page) * i64::from(self.limit) < total,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
	pub page: u32,
	pub limit: u32,
	pub total: i64,
	pub has_more: bool,
}
