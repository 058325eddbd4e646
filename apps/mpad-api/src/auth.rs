//! Caller identity for HTTP handlers.
//!
//! With `security.auth_mode = "off"` the caller names itself through the `X-Mpad-User-Id`
//! header; config validation only allows that on loopback binds. With `"static_keys"` the
//! bearer token selects the configured user.

use std::collections::HashMap;

use axum::{
	extract::FromRequestParts,
	http::{HeaderMap, HeaderName, header, request::Parts},
};

use mpad_config::{AUTH_MODE_OFF, Security};

use crate::{routes::ApiError, state::AppState};

pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-mpad-user-id");

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
	Off,
	StaticKeys { users_by_token: HashMap<String, String> },
}
impl AuthState {
	/// Anything other than `off` authenticates with keys, so an unexpected mode denies access.
	pub fn from_config(security: &Security) -> Self {
		if security.auth_mode == AUTH_MODE_OFF {
			return Self::Off;
		}

		let users_by_token = security
			.auth_keys
			.iter()
			.map(|key| (key.token.clone(), key.user_id.clone()))
			.collect();

		Self::StaticKeys { users_by_token }
	}

	pub fn resolve(&self, headers: &HeaderMap) -> Option<String> {
		match self {
			Self::Off => read_header(headers, &USER_ID_HEADER).map(str::to_string),
			Self::StaticKeys { users_by_token } =>
				read_bearer_token(headers).and_then(|token| users_by_token.get(token)).cloned(),
		}
	}
}

/// The authenticated owner of a request.
#[derive(Clone, Debug)]
pub struct Caller {
	pub user_id: String,
}
impl FromRequestParts<AppState> for Caller {
	type Rejection = ApiError;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		state.auth.resolve(&parts.headers).map(|user_id| Self { user_id }).ok_or_else(|| {
			ApiError::unauthorized("Missing or invalid credentials.")
		})
	}
}

fn read_header<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
	let value = headers.get(name)?.to_str().ok()?.trim();

	if value.is_empty() { None } else { Some(value) }
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let token = read_header(headers, &header::AUTHORIZATION)?.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}
