//! Error types for mockup proofing operations

use thiserror::Error;

/// Result type alias for mockup proofing operations
pub type Result<T> = std::result::Result<T, MockproofError>;

/// Error taxonomy covering the background-removal pipeline and compositing
#[derive(Error, Debug)]
pub enum MockproofError {
    /// Input/output errors (stream read failures, encode buffer errors)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode or encode errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// No API credential could be resolved for the removal service
    #[error("No API credential configured for the background-removal service: {0}")]
    MissingCredential(String),

    /// Pre-flight connectivity check against the service root failed
    #[error("Background-removal service unreachable: {0}")]
    Connectivity(String),

    /// The image submission was rejected by the service
    #[error("Image upload rejected (HTTP {status}): {body}")]
    Upload {
        /// HTTP status returned by the submit endpoint
        status: u16,
        /// Response body text, as returned by the service
        body: String,
    },

    /// A task-status poll request failed
    #[error("Task status check failed: {0}")]
    StatusCheck(String),

    /// The removal job reached a terminal state other than "completed"
    #[error("Background removal failed with status \"{status}\"")]
    ProcessingFailed {
        /// Literal terminal status reported by the service
        status: String,
    },

    /// Fetching the finished cutout failed
    #[error("Result retrieval failed: {0}")]
    Retrieval(String),

    /// The polling loop exhausted its attempt budget
    #[error("Background removal still processing after {attempts} polls at {interval_ms} ms")]
    Timeout {
        /// Number of "processing" responses observed before giving up
        attempts: u32,
        /// Configured poll interval in milliseconds
        interval_ms: u64,
    },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A layer id that is not present in the composition
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    /// A media type with no registered mockup template
    #[error("No mockup template registered for media type: {0}")]
    UnknownTemplate(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MockproofError {
    /// Create a new missing-credential error
    pub fn missing_credential<S: Into<String>>(msg: S) -> Self {
        Self::MissingCredential(msg.into())
    }

    /// Create a new connectivity error
    pub fn connectivity<S: Into<String>>(msg: S) -> Self {
        Self::Connectivity(msg.into())
    }

    /// Create a new upload-rejected error from a response status and body
    pub fn upload<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Upload {
            status,
            body: body.into(),
        }
    }

    /// Create a new status-check error
    pub fn status_check<S: Into<String>>(msg: S) -> Self {
        Self::StatusCheck(msg.into())
    }

    /// Create a new processing-failed error carrying the literal terminal status
    pub fn processing_failed<S: Into<String>>(status: S) -> Self {
        Self::ProcessingFailed {
            status: status.into(),
        }
    }

    /// Create a new retrieval error
    pub fn retrieval<S: Into<String>>(msg: S) -> Self {
        Self::Retrieval(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new unknown-layer error
    pub fn unknown_layer<S: Into<String>>(layer_id: S) -> Self {
        Self::UnknownLayer(layer_id.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }

    /// Whether this error came from one image's removal attempt, as opposed to
    /// a configuration or compositing problem. Per-attempt errors never
    /// invalidate layers accumulated from earlier successful uploads.
    #[must_use]
    pub fn is_removal_attempt_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential(_)
                | Self::Connectivity(_)
                | Self::Upload { .. }
                | Self::StatusCheck(_)
                | Self::ProcessingFailed { .. }
                | Self::Retrieval(_)
                | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MockproofError::invalid_config("test config error");
        assert!(matches!(err, MockproofError::InvalidConfig(_)));

        let err = MockproofError::processing_failed("failed");
        assert!(matches!(err, MockproofError::ProcessingFailed { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = MockproofError::connectivity("connection refused");
        assert_eq!(
            err.to_string(),
            "Background-removal service unreachable: connection refused"
        );

        let err = MockproofError::upload(422, "unsupported payload");
        let text = err.to_string();
        assert!(text.contains("422"));
        assert!(text.contains("unsupported payload"));

        let err = MockproofError::processing_failed("failed");
        assert!(err.to_string().contains("\"failed\""));
    }

    #[test]
    fn test_timeout_display_names_budget() {
        let err = MockproofError::Timeout {
            attempts: 120,
            interval_ms: 1000,
        };
        let text = err.to_string();
        assert!(text.contains("120"));
        assert!(text.contains("1000"));
    }

    #[test]
    fn test_removal_attempt_classification() {
        assert!(MockproofError::connectivity("x").is_removal_attempt_error());
        assert!(MockproofError::retrieval("x").is_removal_attempt_error());
        assert!(!MockproofError::invalid_config("x").is_removal_attempt_error());
        assert!(!MockproofError::unknown_layer("x").is_removal_attempt_error());
    }
}
