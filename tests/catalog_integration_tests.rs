//! Integration Tests for the Model Catalog Scan
//!
//! UNIT UNDER TEST: ArmClient, run_catalog
//!
//! BUSINESS RESPONSIBILITY:
//!   - List models per location from the Resource Manager control plane
//!   - Follow paging links until the listing is exhausted
//!   - Skip locations that fail and keep scanning
//!   - Print the aggregated catalog
//!
//! TEST COVERAGE:
//!   - Bearer token and api-version on listing calls
//!   - nextLink paging, including links that repeat an earlier page
//!   - Failing location skipped
//!   - Empty result message
//!   - Authorization failures

mod common;

use common::FixedTokenCredential;
use foundry_responses::catalog::ARM_API_VERSION;
use foundry_responses::{
    run_catalog, ArmClient, AzureCliCredential, CatalogFilter, CatalogOptions, FoundryError,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";

fn models_path(location: &str) -> String {
    format!(
        "/subscriptions/{SUBSCRIPTION}/providers/Microsoft.CognitiveServices/locations/{location}/models"
    )
}

fn model(format: &str, name: &str, version: &str, caps: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "kind": "AIServices",
        "skuName": "S0",
        "model": {
            "format": format,
            "name": name,
            "version": version,
            "capabilities": caps,
            "skus": [{ "name": "GlobalStandard", "usageName": "OpenAI.GlobalStandard" }]
        }
    })
}

fn options(server: &MockServer, locations: &[&str]) -> CatalogOptions {
    CatalogOptions {
        subscription: Some(SUBSCRIPTION.to_string()),
        arm_endpoint: server.uri(),
        locations: locations.iter().map(|l| l.to_string()).collect(),
        ..CatalogOptions::default()
    }
}

fn no_cli() -> AzureCliCredential {
    AzureCliCredential::new().with_program("foundry-responses-no-such-az-executable")
}

#[tokio::test]
async fn test_list_models_follows_next_link() {
    // Arrange
    let mock_server = MockServer::start().await;
    let next_link = format!("{}/page-2", mock_server.uri());
    Mock::given(method("GET"))
        .and(path(models_path("eastus")))
        .and(query_param("api-version", ARM_API_VERSION))
        .and(header("authorization", "Bearer arm-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [model("OpenAI", "gpt-4.1-mini", "2025-04-14", serde_json::json!({ "responses": "true" }))],
            "nextLink": next_link
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page-2"))
        .and(header("authorization", "Bearer arm-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [model("OpenAI", "o3", "2025-04-16", serde_json::json!({ "responses": "true" }))]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ArmClient::new(mock_server.uri(), "arm-token").unwrap();

    // Act
    let entries = client.list_models(SUBSCRIPTION, "eastus").await.unwrap();

    // Assert
    let names: Vec<_> = entries
        .iter()
        .filter_map(|e| e.model.as_ref()?.name.clone())
        .collect();
    assert_eq!(names, vec!["gpt-4.1-mini", "o3"]);
}

#[tokio::test]
async fn test_list_models_stops_when_next_link_repeats() {
    // Arrange
    let mock_server = MockServer::start().await;
    let first_page = format!(
        "{}{}?api-version={}",
        mock_server.uri(),
        models_path("eastus"),
        ARM_API_VERSION
    );
    Mock::given(method("GET"))
        .and(path(models_path("eastus")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [model("OpenAI", "gpt-4.1-mini", "2025-04-14", serde_json::json!({ "responses": "true" }))],
            "nextLink": format!("{}/page-2", mock_server.uri())
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [model("OpenAI", "o3", "2025-04-16", serde_json::json!({ "responses": "true" }))],
            "nextLink": first_page
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ArmClient::new(mock_server.uri(), "arm-token").unwrap();

    // Act
    let entries = client.list_models(SUBSCRIPTION, "eastus").await.unwrap();

    // Assert
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn test_list_models_stops_on_self_referencing_next_link() {
    let mock_server = MockServer::start().await;
    let first_page = format!(
        "{}{}?api-version={}",
        mock_server.uri(),
        models_path("westus"),
        ARM_API_VERSION
    );
    Mock::given(method("GET"))
        .and(path(models_path("westus")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [model("OpenAI", "o3", "2025-04-16", serde_json::json!({ "responses": "true" }))],
            "nextLink": first_page
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ArmClient::new(mock_server.uri(), "arm-token").unwrap();
    let entries = client.list_models(SUBSCRIPTION, "westus").await.unwrap();

    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_list_models_forbidden() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(models_path("eastus")))
        .respond_with(ResponseTemplate::new(403).set_body_string("AuthorizationFailed"))
        .mount(&mock_server)
        .await;

    let client = ArmClient::new(mock_server.uri(), "arm-token").unwrap();
    let err = client.list_models(SUBSCRIPTION, "eastus").await.unwrap_err();

    assert!(matches!(err, FoundryError::AuthenticationFailed { status: 403, .. }));
}

#[tokio::test]
async fn test_run_catalog_skips_failing_location() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(models_path("eastus")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                model("OpenAI", "gpt-4.1-mini", "2025-04-14", serde_json::json!({ "responses": "true", "chatCompletion": "true" })),
                model("OpenAI", "text-embedding-3-small", "1", serde_json::json!({ "embeddings": "true" }))
            ]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(models_path("westus")))
        .respond_with(ResponseTemplate::new(500).set_body_string("InternalServerError"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let credential = FixedTokenCredential::new("arm-token");
    let mut out = Vec::new();

    // Act
    let catalog = run_catalog(
        &options(&mock_server, &["eastus", "westus"]),
        &credential,
        &no_cli(),
        &mut out,
    )
    .await
    .unwrap();

    // Assert
    assert_eq!(catalog.len(), 1);
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with(&format!("Subscription: {SUBSCRIPTION}\n\n")));
    assert!(printed.contains("Scanning 2 locations for OpenAI models with Responses API support...\n"));
    let row = printed
        .lines()
        .find(|l| l.contains("gpt-4.1-mini"))
        .expect("model row printed");
    assert!(row.ends_with("1/2 regions"));
    assert!(!printed.contains("text-embedding-3-small"));
    assert!(printed.ends_with("Total: 1 model(s) across 2 locations\n"));
}

#[tokio::test]
async fn test_run_catalog_non_openai_filter() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(models_path("eastus")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                model("OpenAI", "gpt-4.1-mini", "2025-04-14", serde_json::json!({ "responses": "true", "chatCompletion": "true" })),
                model("DeepSeek", "DeepSeek-R1-0528", "1", serde_json::json!({ "chatCompletion": "true" }))
            ]
        })))
        .mount(&mock_server)
        .await;

    let mut opts = options(&mock_server, &["eastus"]);
    opts.filter = CatalogFilter::NonOpenAiChat;
    let mut out = Vec::new();

    let catalog = run_catalog(&opts, &FixedTokenCredential::new("t"), &no_cli(), &mut out)
        .await
        .unwrap();

    assert!(catalog.get("DeepSeek", "DeepSeek-R1-0528").is_some());
    assert!(catalog.get("OpenAI", "gpt-4.1-mini").is_none());
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("All regions"));
}

#[tokio::test]
async fn test_run_catalog_reports_empty_result() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": [] })))
        .mount(&mock_server)
        .await;

    let mut out = Vec::new();
    let catalog = run_catalog(
        &options(&mock_server, &["eastus"]),
        &FixedTokenCredential::new("t"),
        &no_cli(),
        &mut out,
    )
    .await
    .unwrap();

    assert!(catalog.is_empty());
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.ends_with("No OpenAI models with Responses API support found.\n"));
}

#[tokio::test]
async fn test_run_catalog_without_subscription_or_cli() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": [] })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut opts = options(&mock_server, &["eastus"]);
    opts.subscription = None;
    let mut out = Vec::new();

    let err = run_catalog(&opts, &FixedTokenCredential::new("t"), &no_cli(), &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, FoundryError::ConfigurationError { .. }));
    assert!(err.to_string().contains("could not resolve a subscription"));
    assert!(out.is_empty());
}
