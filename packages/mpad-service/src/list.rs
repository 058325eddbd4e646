use serde::{Deserialize, Serialize};

use mpad_domain::{
	query::{Page, Pagination, ParentFilter},
	vector,
};
use mpad_storage::queries::{self, NearVector, NoteFilter};

use crate::{MpadService, Note, Result};

#[derive(Clone, Debug, Default)]
pub struct ListRequest {
	pub user_id: String,
	/// Free text. When non-empty, results are ranked by semantic distance to it.
	pub query: Option<String>,
	pub parent: ParentFilter,
	pub page: Option<u32>,
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListResponse {
	pub notes: Vec<Note>,
	pub pagination: Pagination,
}

impl MpadService {
	/// Lists or searches the caller's notes.
	///
	/// Without a query, notes come back newest-updated first. With a query, only notes whose
	/// embedding lies within `search.distance_threshold` are returned, nearest first, and a
	/// provider failure fails the whole call.
	pub async fn list_notes(&self, req: ListRequest) -> Result<ListResponse> {
		let user_id = crate::require_user_id(&req.user_id)?;
		let page = Page::resolve(req.page, req.limit, &self.cfg.search)?;
		let query = req.query.as_deref().map(str::trim).filter(|query| !query.is_empty());
		let query_vector = match query {
			Some(query) => Some(vector::vector_to_pg(&self.embed_text(query).await?)),
			None => None,
		};
		let filter = NoteFilter {
			user_id,
			parent: req.parent,
			near: query_vector.as_deref().map(|literal| NearVector {
				vector: literal,
				max_distance: self.cfg.search.distance_threshold,
			}),
		};
		let mut tx = self.db.pool.begin().await?;

		queries::use_snapshot_reads(&mut tx).await?;

		let total = queries::count_notes(&mut *tx, &filter).await?;
		let rows = if page.offset() < total {
			queries::fetch_notes_page(&mut *tx, &filter, page.offset(), i64::from(page.limit))
				.await?
		} else {
			Vec::new()
		};

		tx.commit().await?;

		let notes = rows.into_iter().map(Note::try_from).collect::<Result<Vec<_>>>()?;

		Ok(ListResponse { notes, pagination: page.pagination(total) })
	}
}
