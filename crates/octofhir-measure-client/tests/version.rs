mod common;

use octofhir_measure_client::{MeasureClientError, Operation, UNKNOWN_VERSION};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{CAPABILITY_STATEMENT, client, fhir_json};

#[tokio::test]
async fn version_is_read_from_capability_statement() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata"))
        .respond_with(fhir_json(200, CAPABILITY_STATEMENT))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server.uri());
    assert_eq!(client.get_version().await, "0.9.0");
    assert_eq!(client.user_agent_info().await, "Blaze/0.9.0");
}

#[tokio::test]
async fn version_works_with_base_url_trailing_slash() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fhir/metadata"))
        .respond_with(fhir_json(200, CAPABILITY_STATEMENT))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&format!("{}/fhir/", server.uri()));
    assert_eq!(client.get_version().await, "0.9.0");
}

#[tokio::test]
async fn version_is_unknown_when_server_is_unreachable() {
    let client = client("http://127.0.0.1:1");
    assert_eq!(client.get_version().await, UNKNOWN_VERSION);
    assert_eq!(client.user_agent_info().await, "Blaze/unknown");
}

#[tokio::test]
async fn version_is_unknown_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client(&server.uri());
    assert_eq!(client.get_version().await, UNKNOWN_VERSION);

    let err = client.capability_info().await.unwrap_err();
    assert!(matches!(
        err,
        MeasureClientError::UnexpectedStatus {
            status: 503,
            operation: Operation::FetchMetadata,
            ..
        }
    ));
}

#[tokio::test]
async fn version_is_unknown_on_undecodable_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata"))
        .respond_with(fhir_json(200, r#"{"resourceType":"CapabilityStatement"}"#))
        .mount(&server)
        .await;

    let client = client(&server.uri());
    assert_eq!(client.get_version().await, UNKNOWN_VERSION);
}
