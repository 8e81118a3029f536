use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid argument: {message}")]
	InvalidArgument { message: String },
	#[error("Unknown aggregate strategy {value:?}. Expected SUM, MAX, AVG or COUNT.")]
	UnknownStrategy { value: String },
	#[error("Failed to read stop words at {path:?}.")]
	StopWords { path: PathBuf, source: std::io::Error },
}
impl Error {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidArgument { message: message.into() }
	}
}
