pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	/// Missing notes and notes owned by someone else are indistinguishable to the caller.
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Integrity violation: {message}")]
	Integrity { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub(crate) fn note_not_found() -> Self {
		Self::NotFound { message: "Note not found.".to_string() }
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<mpad_storage::Error> for Error {
	fn from(err: mpad_storage::Error) -> Self {
		match err {
			mpad_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
		}
	}
}

impl From<mpad_domain::Error> for Error {
	fn from(err: mpad_domain::Error) -> Self {
		use mpad_domain::Error as DomainError;

		match err {
			DomainError::InvalidDocument { .. }
			| DomainError::InvalidPage { .. }
			| DomainError::InvalidParentFilter { .. } =>
				Self::InvalidRequest { message: err.to_string() },
			DomainError::InvalidTags { .. } =>
				Self::Storage { message: err.to_string() },
		}
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
