use thiserror::Error;

/// Failure of a request to the remote API.
///
/// `Clone` so that a single in-flight result can be handed to every caller
/// waiting on the same request key.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("server responded with status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("request was cancelled")]
    Cancelled,
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidUrl(e.to_string())
    }
}

#[cfg(feature = "api")]
impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Status {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl ApiError {
    /// Message shown inline in the affected panel.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Timeout => "The wind data service took too long to respond.".to_string(),
            ApiError::Status { status, .. } if *status >= 500 => {
                format!("The wind data service is unavailable (HTTP {}).", status)
            }
            ApiError::Status { status, .. } => {
                format!("The wind data service rejected the request (HTTP {}).", status)
            }
            other => format!("Unable to load data: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;

    #[test]
    fn user_messages_distinguish_server_and_client_errors() {
        let server = ApiError::Status {
            status: 503,
            url: "https://example.org".to_string(),
        };
        assert!(server.user_message().contains("unavailable (HTTP 503)"));
        let client = ApiError::Status {
            status: 422,
            url: "https://example.org".to_string(),
        };
        assert!(client.user_message().contains("rejected the request (HTTP 422)"));
        assert!(ApiError::Timeout.user_message().contains("too long"));
    }

    #[test]
    fn url_errors_convert() {
        let err: ApiError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
