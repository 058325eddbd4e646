pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Note body is not a valid document: {message}")]
	InvalidDocument { message: String },
	#[error("{message}")]
	InvalidPage { message: String },
	#[error("{message}")]
	InvalidParentFilter { message: String },
	#[error("Tags are malformed: {message}")]
	InvalidTags { message: String },
}
