//! Error types for the measure evaluation client

use std::time::Duration;

use thiserror::Error;

use crate::resource::DecodeError;

/// Result type for measure client operations
pub type MeasureClientResult<T> = Result<T, MeasureClientError>;

/// Fatal failures raised by the measure client.
///
/// Client-range responses (4xx) from the evaluation endpoint are not errors;
/// they come back as [`crate::DomainError`] inside an
/// [`crate::EvaluationOutcome`].
#[derive(Debug, Error)]
pub enum MeasureClientError {
    /// The remote service answered 504.
    #[error("Gateway timeout while evaluating measure with URL '{location}'")]
    GatewayTimeout { location: String },

    /// Any status the protocol step does not expect.
    #[error("Unexpected response code '{status}' while {operation} with URL '{location}'")]
    UnexpectedStatus {
        status: u16,
        operation: Operation,
        location: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Timeout ({} ms) while {operation} with URL '{location}'", .timeout.as_millis())]
    TransportTimeout {
        timeout: Duration,
        operation: Operation,
        location: String,
        #[source]
        source: reqwest::Error,
    },

    /// I/O failure or a payload that could not be decoded.
    #[error("Transport failure while {operation} with URL '{location}'")]
    TransportFailure {
        operation: Operation,
        location: String,
        #[source]
        source: TransportCause,
    },

    /// The creation step returned something other than 201.
    #[error("Measure report not created at '{location}'. Received status code {status}")]
    ReportCreationFailed { status: u16, location: String },

    /// The creation step returned 201 without a `Location` header.
    #[error("Location header is missing in response to '{location}'")]
    MissingLocationHeader { location: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// Underlying cause of a [`MeasureClientError::TransportFailure`].
#[derive(Debug, Error)]
pub enum TransportCause {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::ToStrError),
}

/// Protocol step an error happened in, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    EvaluateMeasure,
    CreateMeasureReport,
    ResolveSubjectList,
    FetchMetadata,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::EvaluateMeasure => "evaluating measure",
            Self::CreateMeasureReport => "creating measure report",
            Self::ResolveSubjectList => "getting subject list from measure",
            Self::FetchMetadata => "fetching server metadata",
        };
        f.write_str(text)
    }
}

impl MeasureClientError {
    /// Create a new GatewayTimeout error
    pub fn gateway_timeout(location: impl Into<String>) -> Self {
        Self::GatewayTimeout {
            location: location.into(),
        }
    }

    /// Create a new UnexpectedStatus error
    pub fn unexpected_status(status: u16, operation: Operation, location: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            operation,
            location: location.into(),
        }
    }

    /// Create a new TransportFailure error
    pub fn transport_failure(
        operation: Operation,
        location: impl Into<String>,
        source: impl Into<TransportCause>,
    ) -> Self {
        Self::TransportFailure {
            operation,
            location: location.into(),
            source: source.into(),
        }
    }

    /// Create a new ReportCreationFailed error
    pub fn report_creation_failed(status: u16, location: impl Into<String>) -> Self {
        Self::ReportCreationFailed {
            status,
            location: location.into(),
        }
    }

    /// Create a new MissingLocationHeader error
    pub fn missing_location_header(location: impl Into<String>) -> Self {
        Self::MissingLocationHeader {
            location: location.into(),
        }
    }

    /// Location the failed request targeted.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::GatewayTimeout { location }
            | Self::UnexpectedStatus { location, .. }
            | Self::TransportTimeout { location, .. }
            | Self::TransportFailure { location, .. }
            | Self::ReportCreationFailed { location, .. }
            | Self::MissingLocationHeader { location } => Some(location.as_str()),
            Self::ClientBuild(_) => None,
        }
    }

    /// Check if this error is a timeout, either at the gateway or in transport
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::GatewayTimeout { .. } | Self::TransportTimeout { .. })
    }

    /// Check if the remote service broke the create/resolve protocol
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingLocationHeader { .. } | Self::ReportCreationFailed { .. }
        )
    }
}
