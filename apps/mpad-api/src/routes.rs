use axum::{
	Json, Router,
	extract::{
		Path, Query, State,
		rejection::{JsonRejection, PathRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, put},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mpad_domain::{query::ParentFilter, tags::NoteTag};
use mpad_service::{
	ChildrenRequest, ChildrenResponse, DeleteRequest, DeleteResponse, ListRequest, ListResponse,
	NoteGetRequest, NoteResponse, NoteWrite, RevisionsRequest, RevisionsResponse, SetParentRequest,
	SetParentResponse, SetSharedRequest, SetSharedResponse, SharedNote, SharedNoteRequest,
	UpsertRequest, UpsertResponse,
};

use crate::{auth::Caller, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ListParams {
	pub search: Option<String>,
	/// Absent lists every note, empty lists roots, an id lists that note's children.
	pub parent: Option<String>,
	pub page: Option<u32>,
	pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertBody {
	pub id: Option<Uuid>,
	pub title: String,
	pub body: String,
	#[serde(default)]
	pub parent: Option<Uuid>,
	#[serde(default)]
	pub tags: Vec<NoteTag>,
}

#[derive(Debug, Deserialize)]
pub struct SetSharedBody {
	pub is_shared: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetParentBody {
	#[serde(default)]
	pub parent: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}

	pub fn unauthorized(message: impl Into<String>) -> Self {
		Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message, None)
	}

	pub fn invalid_request(message: impl Into<String>, fields: Option<Vec<String>>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, fields)
	}
}
impl From<mpad_service::Error> for ApiError {
	fn from(err: mpad_service::Error) -> Self {
		use mpad_service::Error;

		match err {
			Error::InvalidRequest { message } => Self::invalid_request(message, None),
			Error::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			Error::Integrity { message } =>
				Self::new(StatusCode::CONFLICT, "INTEGRITY_VIOLATION", message, None),
			Error::Provider { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message, None),
			Error::Storage { message } => {
				tracing::error!(error = %message, "Storage failure.");

				Self::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"INTERNAL_ERROR",
					"Internal error.",
					None,
				)
			},
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		Self::invalid_request(err.body_text(), None)
	}
}
impl From<PathRejection> for ApiError {
	fn from(err: PathRejection) -> Self {
		Self::invalid_request(err.body_text(), Some(vec!["id".to_string()]))
	}
}
impl From<QueryRejection> for ApiError {
	fn from(err: QueryRejection) -> Self {
		Self::invalid_request(err.body_text(), None)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/notes", get(list_notes).post(upsert_note))
		.route("/v1/notes/{id}", get(get_note).delete(delete_note))
		.route("/v1/notes/{id}/children", get(get_children))
		.route("/v1/notes/{id}/revisions", get(list_revisions))
		.route("/v1/notes/{id}/shared", put(set_shared))
		.route("/v1/notes/{id}/parent", put(set_parent))
		.route("/v1/shared/notes/{id}", get(get_shared_note))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_notes(
	caller: Caller,
	State(state): State<AppState>,
	params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
	let Query(params) = params?;
	let parent = ParentFilter::parse(params.parent.as_deref()).map_err(|err| {
		ApiError::invalid_request(err.to_string(), Some(vec!["parent".to_string()]))
	})?;
	let req = ListRequest {
		user_id: caller.user_id,
		query: params.search,
		parent,
		page: params.page,
		limit: params.limit,
	};

	Ok(Json(state.service.list_notes(req).await?))
}

async fn upsert_note(
	caller: Caller,
	State(state): State<AppState>,
	payload: Result<Json<UpsertBody>, JsonRejection>,
) -> Result<Json<UpsertResponse>, ApiError> {
	let Json(payload) = payload?;
	let write = match payload.id {
		Some(note_id) => NoteWrite::Put { note_id },
		None => NoteWrite::Create,
	};
	let req = UpsertRequest {
		user_id: caller.user_id,
		write,
		title: payload.title,
		body: payload.body,
		parent: payload.parent,
		tags: payload.tags,
	};

	Ok(Json(state.service.upsert_note(req).await?))
}

async fn get_note(
	caller: Caller,
	State(state): State<AppState>,
	id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<NoteResponse>, ApiError> {
	let Path(note_id) = id?;

	Ok(Json(state.service.get_note(NoteGetRequest { user_id: caller.user_id, note_id }).await?))
}

async fn delete_note(
	caller: Caller,
	State(state): State<AppState>,
	id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
	let Path(note_id) = id?;

	Ok(Json(state.service.delete_note(DeleteRequest { user_id: caller.user_id, note_id }).await?))
}

async fn get_children(
	caller: Caller,
	State(state): State<AppState>,
	id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ChildrenResponse>, ApiError> {
	let Path(note_id) = id?;
	let req = ChildrenRequest { user_id: caller.user_id, note_id };

	Ok(Json(state.service.get_children(req).await?))
}

async fn list_revisions(
	caller: Caller,
	State(state): State<AppState>,
	id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<RevisionsResponse>, ApiError> {
	let Path(note_id) = id?;
	let req = RevisionsRequest { user_id: caller.user_id, note_id };

	Ok(Json(state.service.list_revisions(req).await?))
}

async fn set_shared(
	caller: Caller,
	State(state): State<AppState>,
	id: Result<Path<Uuid>, PathRejection>,
	payload: Result<Json<SetSharedBody>, JsonRejection>,
) -> Result<Json<SetSharedResponse>, ApiError> {
	let Path(note_id) = id?;
	let Json(payload) = payload?;
	let req = SetSharedRequest { user_id: caller.user_id, note_id, is_shared: payload.is_shared };

	Ok(Json(state.service.set_shared(req).await?))
}

async fn set_parent(
	caller: Caller,
	State(state): State<AppState>,
	id: Result<Path<Uuid>, PathRejection>,
	payload: Result<Json<SetParentBody>, JsonRejection>,
) -> Result<Json<SetParentResponse>, ApiError> {
	let Path(note_id) = id?;
	let Json(payload) = payload?;
	let req = SetParentRequest { user_id: caller.user_id, note_id, parent: payload.parent };

	Ok(Json(state.service.set_parent(req).await?))
}

async fn get_shared_note(
	State(state): State<AppState>,
	id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SharedNote>, ApiError> {
	let Path(note_id) = id?;

	Ok(Json(state.service.get_shared_note(SharedNoteRequest { note_id }).await?))
}
