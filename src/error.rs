//! Error types for the trace-processing pipeline.
//!
//! Only [`PipelineError`] ever reaches the caller of a processing run.
//! [`ServiceError`] is produced by the external road-snap and routing clients
//! and absorbed per batch/segment inside the pipeline; [`StoreError`] is
//! local to the keyed result store.

use thiserror::Error;

/// Terminal errors surfaced to the caller of a processing run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Every input row was rejected by the accuracy/time filter.
    #[error("no valid GPS data after filtering")]
    NoValidData,
}

/// Errors returned by the external road-snap and routing services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Network failure, timeout, or client construction failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("HTTP status {0}")]
    Http(u16),

    /// The service answered but reported a non-OK application status.
    #[error("service status {status}: {message}")]
    Rejected { status: String, message: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Errors from the keyed result store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServiceError::Rejected {
            status: "OVER_QUERY_LIMIT".to_string(),
            message: "quota exceeded".to_string(),
        };
        assert!(err.to_string().contains("OVER_QUERY_LIMIT"));
        assert!(err.to_string().contains("quota exceeded"));

        assert_eq!(ServiceError::Http(503).to_string(), "HTTP status 503");
        assert_eq!(
            PipelineError::NoValidData.to_string(),
            "no valid GPS data after filtering"
        );
    }
}
