//! Measure evaluation client

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::config::MeasureClientConfig;
use crate::error::{MeasureClientError, MeasureClientResult, Operation};
use crate::outcome::{ResponseClass, classify_transport_error};
use crate::resource::{CapabilityStatement, MeasureReport, decode};
use crate::statistic::EvaluationOutcome;
use crate::subject_list::SubjectListRequest;
use crate::translator::translate_report;

pub(crate) const FHIR_JSON: &str = "application/fhir+json";

/// Query appended to a Measure location; the evaluation period is fixed.
const EVALUATE: &str = "$evaluate-measure?periodStart=2000&periodEnd=2019";

/// `Parameters` resource posted when creating a subject-list MeasureReport.
const PARAMETERS_STUB: &str = include_str!("../resources/parameters-stub.json");

/// Reported when the server version cannot be determined.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Appends `/` unless `url` already ends with one.
pub fn add_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

/// Server self-description derived from its CapabilityStatement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityInfo {
    pub software_version: String,
}

impl CapabilityInfo {
    pub fn unknown() -> Self {
        Self {
            software_version: UNKNOWN_VERSION.to_string(),
        }
    }

    /// Label identifying the backend, e.g. `Blaze/0.11.0`.
    pub fn user_agent(&self) -> String {
        format!("Blaze/{}", self.software_version)
    }
}

/// Client for a FHIR service exposing `$evaluate-measure`.
///
/// Holds only immutable configuration and a pooled `reqwest::Client`, so one
/// instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct EvaluationClient {
    http: reqwest::Client,
    config: MeasureClientConfig,
    parameters: String,
}

impl EvaluationClient {
    /// Creates a client with its own HTTP connection pool.
    pub fn new(config: MeasureClientConfig) -> MeasureClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(MeasureClientError::ClientBuild)?;
        Ok(Self::with_http_client(http, config))
    }

    /// Creates a client on top of an existing HTTP client.
    ///
    /// The caller is responsible for configuring its timeouts; the value in
    /// `config` is only used for diagnostics.
    pub fn with_http_client(http: reqwest::Client, config: MeasureClientConfig) -> Self {
        Self {
            http,
            config,
            parameters: PARAMETERS_STUB.trim().to_string(),
        }
    }

    /// Replaces the `Parameters` payload posted by the creation step.
    #[must_use]
    pub fn with_parameters(mut self, parameters: &Value) -> Self {
        self.parameters = parameters.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &MeasureClientConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn parameters(&self) -> &str {
        &self.parameters
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        self.config.request_timeout()
    }

    /// Fetches the server's CapabilityStatement.
    pub async fn capability_info(&self) -> MeasureClientResult<CapabilityInfo> {
        let url = format!("{}metadata", add_trailing_slash(self.base_url()));
        let operation = Operation::FetchMetadata;

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, self.request_timeout(), operation, &url))?;

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
            .map_err(|e| classify_transport_error(e, self.request_timeout(), operation, &url))?;
        let software_version = decode::<CapabilityStatement>(&body)
            .and_then(|cs| cs.software_version().map(str::to_string))
            .map_err(|e| MeasureClientError::transport_failure(operation, &url, e))?;

        Ok(CapabilityInfo { software_version })
    }

    /// Server software version, or `"unknown"` if it cannot be determined.
    ///
    /// Never fails: any error is logged and replaced by the sentinel.
    pub async fn get_version(&self) -> String {
        match self.capability_info().await {
            Ok(info) => info.software_version,
            Err(e) => {
                tracing::warn!(error = %e, "Could not determine server version");
                UNKNOWN_VERSION.to_string()
            }
        }
    }

    /// User agent label for the backend, `Blaze/<version>`.
    pub async fn user_agent_info(&self) -> String {
        CapabilityInfo {
            software_version: self.get_version().await,
        }
        .user_agent()
    }

    /// Evaluates the Measure at `location` and returns its statistic.
    ///
    /// A 4xx answer is returned as [`EvaluationOutcome::Error`]; timeouts,
    /// other statuses and undecodable payloads are errors.
    pub async fn evaluate(&self, location: &str) -> MeasureClientResult<EvaluationOutcome> {
        let url = format!("{}{}", add_trailing_slash(location), EVALUATE);
        let operation = Operation::EvaluateMeasure;
        tracing::info!(location, "Evaluating measure");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, self.request_timeout(), operation, location))?;

        let class = ResponseClass::from_status(response.status()).fatal(location)?;
        if let ResponseClass::ClientError(err) = class {
            tracing::info!(location, code = err.code, "Measure evaluation returned a client error");
            return Ok(EvaluationOutcome::Error(err));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(e, self.request_timeout(), operation, location))?;
        let statistic = decode::<MeasureReport>(&body)
            .and_then(|report| translate_report(&report))
            .map_err(|e| MeasureClientError::transport_failure(operation, location, e))?;

        tracing::debug!(
            location,
            total_size = statistic.total_size,
            stratifiers = statistic.stratification.len(),
            "Measure evaluated"
        );
        Ok(EvaluationOutcome::Statistic(statistic))
    }

    /// Creates a subject list for the Measure at `location` and returns its
    /// absolute URI.
    pub async fn create_subject_list(&self, location: &str) -> MeasureClientResult<String> {
        tracing::info!(location, "Creating subject list");
        let created = SubjectListRequest::new(location).create(self).await?;
        let resolved = created.resolve(self).await?;
        Ok(resolved.into_uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trailing_slash() {
        assert_eq!(add_trailing_slash("localhost"), "localhost/");
        assert_eq!(add_trailing_slash("localhost/"), "localhost/");
        assert_eq!(add_trailing_slash(""), "/");
    }

    #[test]
    fn test_user_agent() {
        let info = CapabilityInfo {
            software_version: "0.11.0".to_string(),
        };
        assert_eq!(info.user_agent(), "Blaze/0.11.0");
        assert_eq!(CapabilityInfo::unknown().user_agent(), "Blaze/unknown");
    }

    #[test]
    fn test_parameters_stub_is_a_parameters_resource() {
        let value: Value = serde_json::from_str(PARAMETERS_STUB).unwrap();
        assert_eq!(value["resourceType"], "Parameters");
        let names: Vec<_> = value["parameter"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p["name"].as_str())
            .collect();
        assert!(names.contains(&"reportType"));
    }

    #[test]
    fn test_with_parameters_replaces_payload() {
        let client = EvaluationClient::new(MeasureClientConfig::new("http://blaze/fhir"))
            .unwrap()
            .with_parameters(&serde_json::json!({ "resourceType": "Parameters" }));
        assert_eq!(client.parameters(), r#"{"resourceType":"Parameters"}"#);
        assert_eq!(client.base_url(), "http://blaze/fhir");
    }
}
