use thiserror::Error;

/// Main client error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status} for {url} - {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Request timeout: {url} after {timeout_seconds} seconds")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Response parsing error: {details}")]
    Parse { details: String },

    /// The remote envelope reported `stat != "ok"`.
    #[error("API error {code}: {message}")]
    Protocol { code: String, message: String },

    /// A success response did not fit the mapper's structural rules. Usually
    /// means the multiples table lacks an entry for this container.
    #[error("Attribute conflict: <{tag}> has more than one value for '{field}'")]
    AttributeConflict { tag: String, field: String },

    #[error("Missing field: <{tag}> has no '{field}'")]
    MissingField { tag: String, field: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn parse(details: impl std::fmt::Display) -> Self {
        Error::Parse {
            details: details.to_string(),
        }
    }

    /// True when the remote API itself reported the failure
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::Protocol { .. })
    }

    /// Remote error code, for protocol errors only
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Protocol { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let error = Error::Protocol {
            code: "1".to_string(),
            message: "not found".to_string(),
        };
        assert_eq!(error.to_string(), "API error 1: not found");
        assert!(error.is_protocol());
        assert_eq!(error.code(), Some("1"));
    }

    #[test]
    fn test_attribute_conflict_is_distinct_from_protocol() {
        let error = Error::AttributeConflict {
            tag: "photo".to_string(),
            field: "title".to_string(),
        };
        assert!(!error.is_protocol());
        assert_eq!(error.code(), None);
        assert!(error.to_string().contains("<photo>"));
        assert!(error.to_string().contains("'title'"));
    }

    #[test]
    fn test_http_status_display() {
        let error = Error::HttpStatus {
            url: "https://api.flickr.com/services/rest".to_string(),
            status: 503,
            message: "HTTP 503: Service Unavailable".to_string(),
        };
        assert!(error.to_string().contains("503"));
        assert!(error.to_string().contains("api.flickr.com"));
    }

    #[test]
    fn test_url_error_conversion() {
        let parse_error = url::Url::parse("not a url").unwrap_err();
        let error: Error = parse_error.into();

        match error {
            Error::InvalidUrl(_) => (),
            _ => panic!("Expected Error::InvalidUrl"),
        }
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error as _;

        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error = Error::Io(io_error);

        assert!(error.source().is_some());
        assert_eq!(error.source().unwrap().to_string(), "File not found");
    }

    #[test]
    fn test_result_type_alias() {
        let success: Result<String> = Ok("success".to_string());
        assert!(success.is_ok());

        let failure: Result<String> = Err(Error::Config("test error".to_string()));
        assert!(failure.is_err());
    }
}
