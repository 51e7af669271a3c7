//! Error handling

use reqwest::StatusCode;

/// Errors raised anywhere in the trendart pipeline.
#[derive(Debug)]
pub enum TrendartError {
    /// A credential the selected path needs was not configured
    MissingCredential(&'static str),
    /// A remote service answered with a non-success status
    Http {
        /// The status code returned
        status: StatusCode,
        /// Response body, kept verbatim for diagnostics
        body: String,
    },
    /// Transport-level HTTP failure
    Request(reqwest::Error),
    /// Fetching or parsing a scraped page failed
    Scrape(String),
    /// The image bytes could not be decoded or encoded
    Image(image::ImageError),
    /// A base64 artifact could not be decoded
    Decode(base64::DecodeError),
    /// A JSON payload did not match the expected shape
    Json(serde_json::Error),
    /// Filesystem or process spawn failure
    Io(std::io::Error),
    /// An external runner process exited unsuccessfully
    Runner(String),
    /// A generation response contained no image artifact
    MissingArtifact,
    /// A configured base URL could not be joined with an endpoint path
    InvalidUrl(url::ParseError),
}

impl std::fmt::Display for TrendartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential(name) => write!(f, "{name} is not configured"),
            Self::Http { body, .. } => write!(f, "Non-200 response: {body}"),
            Self::Request(err) => write!(f, "HTTP request failed: {err}"),
            Self::Scrape(message) => write!(f, "Scrape failed: {message}"),
            Self::Image(err) => write!(f, "Image processing failed: {err}"),
            Self::Decode(err) => write!(f, "Failed to base64-decode image: {err}"),
            Self::Json(err) => write!(f, "Unexpected JSON payload: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Runner(message) => write!(f, "External runner failed: {message}"),
            Self::MissingArtifact => write!(f, "No image artifact returned"),
            Self::InvalidUrl(err) => write!(f, "Invalid URL: {err}"),
        }
    }
}

impl std::error::Error for TrendartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(err) => Some(err),
            Self::Image(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::InvalidUrl(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TrendartError {
    fn from(err: reqwest::Error) -> Self {
        TrendartError::Request(err)
    }
}

impl From<ureq::Error> for TrendartError {
    fn from(err: ureq::Error) -> Self {
        TrendartError::Scrape(err.to_string())
    }
}

impl From<regex::Error> for TrendartError {
    fn from(err: regex::Error) -> Self {
        TrendartError::Scrape(err.to_string())
    }
}

impl From<image::ImageError> for TrendartError {
    fn from(err: image::ImageError) -> Self {
        TrendartError::Image(err)
    }
}

impl From<base64::DecodeError> for TrendartError {
    fn from(err: base64::DecodeError) -> Self {
        TrendartError::Decode(err)
    }
}

impl From<serde_json::Error> for TrendartError {
    fn from(err: serde_json::Error) -> Self {
        TrendartError::Json(err)
    }
}

impl From<std::io::Error> for TrendartError {
    fn from(err: std::io::Error) -> Self {
        TrendartError::Io(err)
    }
}

impl From<url::ParseError> for TrendartError {
    fn from(err: url::ParseError) -> Self {
        TrendartError::InvalidUrl(err)
    }
}

impl TrendartError {
    /// Returns true if this is a non-success HTTP status error.
    pub fn is_http_status(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_carries_body() {
        let err = TrendartError::Http {
            status: StatusCode::FORBIDDEN,
            body: "{\"message\":\"bad key\"}".to_string(),
        };
        assert!(err.is_http_status());
        assert_eq!(err.to_string(), "Non-200 response: {\"message\":\"bad key\"}");
    }

    #[test]
    fn missing_credential_names_the_variable() {
        let err = TrendartError::MissingCredential("STABILITY_API_KEY");
        assert_eq!(err.to_string(), "STABILITY_API_KEY is not configured");
    }
}
