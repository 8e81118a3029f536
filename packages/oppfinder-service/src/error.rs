pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	/// Retryable. The index could not be reached.
	#[error("Index unavailable: {message}")]
	IndexUnavailable { message: String },
	#[error("Index rejected the query: {message}")]
	IndexQueryRejected { message: String },
	/// The index references data the relational store does not have.
	#[error("Integrity error: {message}")]
	Integrity { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<oppfinder_storage::Error> for Error {
	fn from(err: oppfinder_storage::Error) -> Self {
		match err {
			oppfinder_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			oppfinder_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			oppfinder_storage::Error::NotFound(message) => Self::NotFound { message },
			oppfinder_storage::Error::IndexUnavailable { message } => {
				tracing::error!(error = %message, "Search index is unavailable.");

				Self::IndexUnavailable { message }
			},
			oppfinder_storage::Error::IndexRejected { status, message } =>
				Self::IndexQueryRejected { message: format!("status {status}: {message}") },
		}
	}
}

impl From<oppfinder_domain::Error> for Error {
	fn from(err: oppfinder_domain::Error) -> Self {
		match err {
			oppfinder_domain::Error::StopWords { .. } => Self::Storage { message: err.to_string() },
			oppfinder_domain::Error::InvalidArgument { message } => Self::InvalidRequest { message },
			oppfinder_domain::Error::UnknownStrategy { .. } =>
				Self::InvalidRequest { message: err.to_string() },
		}
	}
}
