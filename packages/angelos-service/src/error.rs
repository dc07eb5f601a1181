pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Text callers show end users when a request fails; raw error detail stays in the logs.
pub const USER_FACING_FAILURE: &str =
	"Sorry, I cannot answer right now. Please try again in a few minutes.";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Embedding error: {message}")]
	Embedding { message: String },
	#[error("Retrieval error: {message}")]
	Retrieval { message: String },
	#[error("Rerank error: {message}")]
	Rerank { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Request timed out: {message}")]
	Timeout { message: String },
}
impl Error {
	/// Retrieval and rerank failures degrade inside the pipeline and never reach the caller.
	pub fn is_fatal(&self) -> bool {
		!matches!(self, Self::Retrieval { .. } | Self::Rerank { .. })
	}

	pub fn user_message(&self) -> &'static str {
		USER_FACING_FAILURE
	}
}
