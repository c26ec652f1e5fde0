use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Email or password cannot be empty")]
    InvalidCredentials,

    #[error("You are not logged in. Please login first")]
    NotLoggedIn,

    #[error("Login failed: {0}")]
    RemoteLogin(String),

    #[error("Request failed with status {status}: {message}")]
    RemoteRequest { status: u16, message: String },

    #[error("Malformed credentials: {0}")]
    MalformedCredentials(String),

    #[error("Malformed stream frame {line:?}: {source}")]
    MalformedFrame {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::RemoteRequest {
            status: status.as_u16(),
            message: Self::truncate_body(body),
        }
    }

    pub fn login_failed(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::RemoteLogin(format!("status {}: {}", status, Self::truncate_body(body)))
    }

    /// Whether the server rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::RemoteRequest { status: 401, .. })
    }
}
