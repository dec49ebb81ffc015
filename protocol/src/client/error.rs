use thiserror::Error;

/// Why a call to the core node produced no usable reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid core endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("core responded with http status {0}")]
    UnexpectedStatus(u16),

    #[error("could not decode core response: {0}")]
    Decode(String),

    #[error("request deadline exceeded")]
    Timeout,

    #[error("request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::UnexpectedStatus(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
