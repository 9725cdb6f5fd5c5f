use http::StatusCode;
use thiserror::Error;

/// Errors surfaced by the transport, repositories and services.
///
/// Repositories normalize every failure into one of these variants and
/// return it; nothing below the pagination controller swallows an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No response reached us (connect failure, timeout, TLS, ...).
    #[error("could not reach the tracker service: {message}")]
    Transport { message: String },

    /// The service answered 401. The session has already been cleared.
    #[error("Unauthorized - please log in again")]
    Unauthorized,

    /// A 4xx other than 401/404, carrying the server's `detail`.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// A 5xx response.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// An identity lookup missed.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// A successful response whose body did not match the expected shape.
    #[error("unexpected response body: {message}")]
    Decode { message: String },

    /// The durable session store could not be read or written.
    #[error("session storage error: {message}")]
    Storage { message: String },
}

impl ClientError {
    /// Map a non-2xx status and optional server `detail` into the taxonomy.
    ///
    /// `fallback` is used when the body carried no message. `lookup` names the
    /// entity and id being addressed, if any, so a 404 becomes `NotFound`.
    pub fn from_status(
        status: StatusCode,
        detail: Option<String>,
        fallback: &str,
        lookup: Option<(&'static str, u64)>,
    ) -> Self {
        let message = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| fallback.to_owned());
        match (status, lookup) {
            (StatusCode::UNAUTHORIZED, _) => Self::Unauthorized,
            (StatusCode::NOT_FOUND, Some((entity, id))) => Self::NotFound { entity, id },
            (s, _) if s.is_server_error() => Self::Server {
                status: s.as_u16(),
                message,
            },
            (s, _) => Self::Validation {
                status: s.as_u16(),
                message,
            },
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// A reqwest failure means no usable response arrived (connect, timeout,
/// body read), except for a body that failed to decode.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
