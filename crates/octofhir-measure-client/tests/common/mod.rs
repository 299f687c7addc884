#![allow(dead_code)]

use std::time::Duration;

use octofhir_measure_client::{EvaluationClient, MeasureClientConfig};
use wiremock::ResponseTemplate;

pub const FHIR_JSON: &str = "application/fhir+json";

pub const EVALUATE_REPORT: &str = include_str!("../fixtures/evaluate_report.json");
pub const SUBJECT_LIST_REPORT: &str = include_str!("../fixtures/subject_list_report.json");
pub const CAPABILITY_STATEMENT: &str = include_str!("../fixtures/capability_statement.json");

pub fn client(base_url: &str) -> EvaluationClient {
    client_with_timeout(base_url, Duration::from_secs(5))
}

pub fn client_with_timeout(base_url: &str, timeout: Duration) -> EvaluationClient {
    let config = MeasureClientConfig::new(base_url).with_request_timeout(timeout);
    EvaluationClient::new(config).expect("build client")
}

pub fn fhir_json(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body, FHIR_JSON)
}
