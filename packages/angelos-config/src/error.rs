use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read config file at {}.", path.display())]
	ReadConfig {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("Failed to parse config file at {}: {source}", path.display())]
	ParseConfig {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
	#[error("{message}")]
	Validation { message: String },
}
impl Error {
	pub(crate) fn validation(message: impl Into<String>) -> Self {
		Self::Validation { message: message.into() }
	}
}
