//! Subject list creation: create a MeasureReport, then follow its location.
//!
//! The protocol is modelled as a typestate machine. Each transition consumes
//! the request and performs exactly one HTTP round trip:
//!
//! ```text
//! Idle --create()--> Created(MeasureReportRef) --resolve()--> Resolved(uri)
//!   \                    \
//!    `-- Err(..)          `-- Err(..)
//! ```
//!
//! An `Err` is the terminal failed state; nothing is retried.

use std::fmt;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};

use crate::client::{EvaluationClient, FHIR_JSON, add_trailing_slash};
use crate::error::{MeasureClientError, MeasureClientResult, Operation};
use crate::outcome::classify_transport_error;
use crate::resource::{DecodeError, MeasureReport, decode};

const EVALUATE_MEASURE: &str = "$evaluate-measure";
const HISTORY_SEGMENT: &str = "/_history";
/// Longest part of a rejected creation response that is logged.
const BODY_EXCERPT_CHARS: usize = 512;

/// Location of a created MeasureReport, without any `_history` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureReportRef(String);

impl MeasureReportRef {
    /// Builds a reference from a `Location` header value, dropping the
    /// version part so the current version is always read.
    pub fn from_location(location: &str) -> Self {
        let base = location
            .split_once(HISTORY_SEGMENT)
            .map_or(location, |(base, _)| base);
        Self(base.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MeasureReportRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Absolute subject list URI for a relative reference such as `List/ABC`.
pub fn subject_list_uri(base_url: &str, reference: &str) -> String {
    format!("{}{}", add_trailing_slash(base_url), reference)
}

/// Nothing sent yet.
#[derive(Debug)]
pub struct Idle {
    measure_location: String,
}

/// The MeasureReport exists on the server.
#[derive(Debug)]
pub struct Created {
    report: MeasureReportRef,
}

/// The subject list URI is known.
#[derive(Debug)]
pub struct Resolved {
    subject_list: String,
}

/// One subject list request moving through the create/resolve protocol.
#[derive(Debug)]
pub struct SubjectListRequest<S> {
    state: S,
}

impl SubjectListRequest<Idle> {
    /// Starts a request for the Measure at `measure_location`.
    pub fn new(measure_location: impl Into<String>) -> Self {
        Self {
            state: Idle {
                measure_location: measure_location.into(),
            },
        }
    }

    pub fn measure_location(&self) -> &str {
        &self.state.measure_location
    }

    /// POSTs the parameter payload to `{measure}/$evaluate-measure`.
    ///
    /// Expects `201 Created` with a `Location` header.
    pub async fn create(
        self,
        client: &EvaluationClient,
    ) -> MeasureClientResult<SubjectListRequest<Created>> {
        let url = format!(
            "{}/{}",
            self.state.measure_location.trim_end_matches('/'),
            EVALUATE_MEASURE
        );
        let operation = Operation::CreateMeasureReport;
        tracing::debug!(url = %url, "Creating measure report");

        let response = client
            .http()
            .post(&url)
            .header(CONTENT_TYPE, FHIR_JSON)
            .body(client.parameters().to_string())
            .send()
            .await
            .map_err(|e| classify_transport_error(e, client.request_timeout(), operation, &url))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                response = %body_excerpt(&body),
                "Measure report not created"
            );
            return Err(MeasureClientError::report_creation_failed(status.as_u16(), url));
        }

        let location = match response.headers().get(LOCATION) {
            Some(value) => value
                .to_str()
                .map_err(|e| MeasureClientError::transport_failure(operation, &url, e))?,
            None => return Err(MeasureClientError::missing_location_header(url)),
        };

        let report = MeasureReportRef::from_location(&absolute_location(&url, location));
        tracing::debug!(location, report = %report, "Measure report created");
        Ok(SubjectListRequest {
            state: Created { report },
        })
    }
}

impl SubjectListRequest<Created> {
    /// Enters the protocol at the resolve step for an already created report.
    pub fn from_report(report: MeasureReportRef) -> Self {
        Self {
            state: Created { report },
        }
    }

    pub fn report(&self) -> &MeasureReportRef {
        &self.state.report
    }

    /// GETs the MeasureReport and reads the subject list reference of its
    /// first population.
    pub async fn resolve(
        self,
        client: &EvaluationClient,
    ) -> MeasureClientResult<SubjectListRequest<Resolved>> {
        let url = self.state.report.as_str();
        let operation = Operation::ResolveSubjectList;
        tracing::debug!(url, "Resolving subject list");

        let response = client
            .http()
            .get(url)
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, client.request_timeout(), operation, url))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(MeasureClientError::unexpected_status(
                status.as_u16(),
                operation,
                url,
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(e, client.request_timeout(), operation, url))?;
        let reference = first_subject_list_reference(&body)
            .map_err(|e| MeasureClientError::transport_failure(operation, url, e))?;

        let subject_list = subject_list_uri(client.base_url(), &reference);
        tracing::debug!(subject_list = %subject_list, "Subject list resolved");
        Ok(SubjectListRequest {
            state: Resolved { subject_list },
        })
    }
}

impl SubjectListRequest<Resolved> {
    pub fn subject_list_uri(&self) -> &str {
        &self.state.subject_list
    }

    pub fn into_uri(self) -> String {
        self.state.subject_list
    }
}

/// Resolves an absolute-path `Location` (`/fhir/MeasureReport/X`) against
/// the request URL. Anything else is returned unchanged.
fn absolute_location(request_url: &str, location: &str) -> String {
    if !location.starts_with('/') {
        return location.to_string();
    }
    reqwest::Url::parse(request_url)
        .and_then(|base| base.join(location))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| location.to_string())
}

fn body_excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

fn first_subject_list_reference(payload: &[u8]) -> Result<String, DecodeError> {
    let report: MeasureReport = decode(payload)?;
    let reference = report
        .first_group()?
        .first_population()?
        .subject_results_reference()?;
    Ok(reference.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_suffix_is_stripped() {
        let report = MeasureReportRef::from_location(
            "localhost/fhir/MeasureReport/DAOSEDN3UFW4FXHB/_history/333",
        );
        assert_eq!(report.as_str(), "localhost/fhir/MeasureReport/DAOSEDN3UFW4FXHB");
    }

    #[test]
    fn test_location_without_history_is_kept() {
        let report = MeasureReportRef::from_location("http://blaze/fhir/MeasureReport/A");
        assert_eq!(report.as_str(), "http://blaze/fhir/MeasureReport/A");
        assert_eq!(report.to_string(), "http://blaze/fhir/MeasureReport/A");
    }

    #[test]
    fn test_absolute_path_location_is_joined_to_request_url() {
        assert_eq!(
            absolute_location(
                "http://blaze:8080/fhir/Measure/M/$evaluate-measure",
                "/fhir/MeasureReport/X/_history/1"
            ),
            "http://blaze:8080/fhir/MeasureReport/X/_history/1"
        );
        assert_eq!(
            absolute_location(
                "http://blaze:8080/fhir/Measure/M/$evaluate-measure",
                "http://other/fhir/MeasureReport/X"
            ),
            "http://other/fhir/MeasureReport/X"
        );
        assert_eq!(
            absolute_location(
                "localhost/fhir/Measure/M/$evaluate-measure",
                "localhost/fhir/MeasureReport/X/_history/333"
            ),
            "localhost/fhir/MeasureReport/X/_history/333"
        );
    }

    #[test]
    fn test_body_excerpt_is_capped() {
        let long = "é".repeat(BODY_EXCERPT_CHARS + 10);
        assert_eq!(body_excerpt(&long).chars().count(), BODY_EXCERPT_CHARS);
        assert_eq!(body_excerpt("short"), "short");
    }

    #[test]
    fn test_subject_list_uri_adds_single_slash() {
        assert_eq!(
            subject_list_uri("localhost", "List/DAOSEDNXBYQKUMRU"),
            "localhost/List/DAOSEDNXBYQKUMRU"
        );
        assert_eq!(
            subject_list_uri("http://blaze/fhir/", "List/A"),
            "http://blaze/fhir/List/A"
        );
    }

    #[test]
    fn test_first_subject_list_reference() {
        let payload = serde_json::to_vec(&json!({
            "resourceType": "MeasureReport",
            "group": [{
                "population": [
                    { "count": 2, "subjectResults": { "reference": "List/FIRST" } },
                    { "count": 1, "subjectResults": { "reference": "List/SECOND" } }
                ]
            }]
        }))
        .unwrap();
        assert_eq!(first_subject_list_reference(&payload).unwrap(), "List/FIRST");
    }

    #[test]
    fn test_missing_subject_results_is_a_decode_error() {
        let payload = serde_json::to_vec(&json!({
            "resourceType": "MeasureReport",
            "group": [{ "population": [{ "count": 2 }] }]
        }))
        .unwrap();
        assert!(matches!(
            first_subject_list_reference(&payload),
            Err(DecodeError::MissingElement { .. })
        ));
    }

    #[test]
    fn test_request_states_expose_payloads() {
        let idle = SubjectListRequest::new("http://blaze/fhir/Measure/M");
        assert_eq!(idle.measure_location(), "http://blaze/fhir/Measure/M");

        let created = SubjectListRequest::from_report(MeasureReportRef::from_location(
            "http://blaze/fhir/MeasureReport/R/_history/1",
        ));
        assert_eq!(created.report().as_str(), "http://blaze/fhir/MeasureReport/R");
    }
}
