use thiserror::Error;

/// A request to the backend that did not produce a usable body.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("could not reach backend: {0}")]
	Transport(#[source] reqwest::Error),
	#[error("{message}")]
	Status {
		status: reqwest::StatusCode,
		message: String,
	},
	#[error("unexpected response from backend: {0}")]
	Decode(#[source] serde_json::Error),
}

impl FetchError {
	pub fn status(&self) -> Option<reqwest::StatusCode> {
		match self {
			FetchError::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}

impl From<reqwest::Error> for FetchError {
	fn from(error: reqwest::Error) -> FetchError {
		FetchError::Transport(error)
	}
}

impl From<serde_json::Error> for FetchError {
	fn from(error: serde_json::Error) -> FetchError {
		FetchError::Decode(error)
	}
}
