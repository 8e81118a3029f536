#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Not found: {0}")]
	NotFound(String),
	/// The index could not be reached or the exchange broke mid-flight. Retryable.
	#[error("Index unavailable: {message}")]
	IndexUnavailable { message: String },
	/// The index answered but refused the query or returned an unusable body.
	#[error("Index rejected the request with status {status}: {message}")]
	IndexRejected { status: u16, message: String },
}
