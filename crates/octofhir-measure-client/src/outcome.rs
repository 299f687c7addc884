//! Classification of evaluation responses and transport failures.

use std::time::Duration;

use reqwest::StatusCode;

use crate::error::{MeasureClientError, MeasureClientResult, Operation};
use crate::statistic::DomainError;

/// How an HTTP status from the evaluation endpoint is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 200, the body carries a measure report.
    Success,
    /// 4xx, returned to the caller as data.
    ClientError(DomainError),
    /// 504 from a gateway in front of the service.
    GatewayTimeout,
    /// Anything else.
    Unexpected(u16),
}

impl ResponseClass {
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::OK {
            Self::Success
        } else if status.is_client_error() {
            Self::ClientError(DomainError {
                code: status.as_u16(),
            })
        } else if status == StatusCode::GATEWAY_TIMEOUT {
            Self::GatewayTimeout
        } else {
            Self::Unexpected(status.as_u16())
        }
    }

    /// Turns the fatal classes into errors, passing the others through.
    pub fn fatal(self, location: &str) -> MeasureClientResult<Self> {
        match self {
            Self::GatewayTimeout => Err(MeasureClientError::gateway_timeout(location)),
            Self::Unexpected(status) => Err(MeasureClientError::unexpected_status(
                status,
                Operation::EvaluateMeasure,
                location,
            )),
            other => Ok(other),
        }
    }
}

/// Maps a failed `send`/body read into a timeout or a transport failure.
pub fn classify_transport_error(
    err: reqwest::Error,
    timeout: Duration,
    operation: Operation,
    location: &str,
) -> MeasureClientError {
    if err.is_timeout() {
        tracing::warn!(location, timeout_ms = timeout.as_millis() as u64, %operation, "Request timed out");
        MeasureClientError::TransportTimeout {
            timeout,
            operation,
            location: location.to_string(),
            source: err,
        }
    } else {
        tracing::warn!(location, %operation, error = %err, "Request failed");
        MeasureClientError::transport_failure(operation, location, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> StatusCode {
        StatusCode::from_u16(code).unwrap()
    }

    #[test]
    fn test_ok_is_success() {
        assert_eq!(ResponseClass::from_status(StatusCode::OK), ResponseClass::Success);
    }

    #[test]
    fn test_every_4xx_is_a_domain_error() {
        for code in 400..500 {
            assert_eq!(
                ResponseClass::from_status(status(code)),
                ResponseClass::ClientError(DomainError { code }),
                "status {code}"
            );
        }
    }

    #[test]
    fn test_gateway_timeout() {
        let class = ResponseClass::from_status(StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(class, ResponseClass::GatewayTimeout);
        let err = class.fatal("http://blaze/fhir/Measure/1").unwrap_err();
        assert!(matches!(
            err,
            MeasureClientError::GatewayTimeout { ref location } if location == "http://blaze/fhir/Measure/1"
        ));
    }

    #[test]
    fn test_other_statuses_are_unexpected() {
        for code in [201, 204, 301, 500, 502, 503] {
            let class = ResponseClass::from_status(status(code));
            assert_eq!(class, ResponseClass::Unexpected(code));
            match class.fatal("loc") {
                Err(MeasureClientError::UnexpectedStatus { status, operation, .. }) => {
                    assert_eq!(status, code);
                    assert_eq!(operation, Operation::EvaluateMeasure);
                }
                other => panic!("unexpected: {other:?}"),
            }
        }
    }

    #[test]
    fn test_success_and_client_error_are_not_fatal() {
        assert_eq!(
            ResponseClass::Success.fatal("loc").unwrap(),
            ResponseClass::Success
        );
        let client_error = ResponseClass::ClientError(DomainError { code: 422 });
        assert_eq!(client_error.fatal("loc").unwrap(), client_error);
    }
}
