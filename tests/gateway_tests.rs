//! End-to-end tests of the generated resource routes
//!
//! These tests verify that:
//! - Only the routes of present capabilities are mounted
//! - Pagination is validated before any operation is invoked
//! - Payloads are serialized as JSON:API documents
//! - Operation failures become JSON:API error documents

#![cfg(feature = "in-memory")]

use axum::http::StatusCode;
use axum_test::TestServer;
use jsonapi_gateway::prelude::*;
use std::sync::Mutex;

/// Answers `page` with `size` generated items and records every call
#[derive(Default)]
struct Fleet {
    calls: Mutex<Vec<(u64, u64)>>,
}

impl Fleet {
    fn calls(&self) -> Vec<(u64, u64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageOperation for Fleet {
    async fn page(&self, page: u64, size: u64) -> Result<Value, ResourceError> {
        self.calls.lock().unwrap().push((page, size));
        let first = (page - 1) * size;
        Ok(Value::Array(
            (first..first + size)
                .map(|n| json!({"uid": format!("STMA{:04}", n), "name": format!("Ship {}", n)}))
                .collect(),
        ))
    }
}

/// Fails every call with the same error
struct Failing(ResourceError);

#[async_trait]
impl GetOperation for Failing {
    async fn get(&self, _id: &str) -> Result<Value, ResourceError> {
        Err(self.0.clone())
    }
}

/// Returns a fixed payload
struct Fixed(Value);

#[async_trait]
impl GetOperation for Fixed {
    async fn get(&self, _id: &str) -> Result<Value, ResourceError> {
        Ok(self.0.clone())
    }
}

fn serve(builder: GatewayBuilder) -> TestServer {
    TestServer::new(builder.build().unwrap())
}

fn single(name: &str, operation: Arc<dyn GetOperation>) -> TestServer {
    serve(
        GatewayBuilder::new()
            .register(ResourceDescriptor::new(name).with_get(operation))
            .unwrap(),
    )
}

fn starfleet() -> InMemoryResource {
    InMemoryResource::new(vec![
        json!({"uid": "STMA01", "name": "Enterprise", "registry": "NCC-1701"}),
        json!({"uid": "STMA02", "name": "Defiant", "registry": "NX-74205"}),
        json!({"uid": "STMA03", "name": "Enterprise", "registry": "NCC-1701-D"}),
    ])
}

// =============================================================================
// Listing
// =============================================================================

mod list_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_returns_requested_page() {
        let fleet = Arc::new(Fleet::default());
        let server = serve(
            GatewayBuilder::new()
                .register(ResourceDescriptor::new("Starship").with_page(fleet.clone()))
                .unwrap(),
        );

        let response = server.get("/api/starship?page=2&size=5").await;
        response.assert_status_ok();
        assert_eq!(
            response.header("content-type"),
            "application/vnd.api+json"
        );

        let body: Value = response.json();
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 5);
        assert!(data.iter().all(|item| item["type"] == "starship"));
        assert_eq!(data[0]["id"], "STMA0005");
        assert_eq!(data[0]["attributes"]["name"], "Ship 5");
        assert!(body.get("errors").is_none());
        assert_eq!(fleet.calls(), vec![(2, 5)]);
    }

    #[tokio::test]
    async fn test_list_defaults() {
        let fleet = Arc::new(Fleet::default());
        let server = serve(
            GatewayBuilder::new()
                .register(ResourceDescriptor::new("Starship").with_page(fleet.clone()))
                .unwrap(),
        );

        server.get("/api/starship").await.assert_status_ok();
        server.get("/api/starship?page=&size=").await.assert_status_ok();
        assert_eq!(fleet.calls(), vec![(1, 10), (1, 10)]);
    }

    #[tokio::test]
    async fn test_size_bounds_are_inclusive() {
        let fleet = Arc::new(Fleet::default());
        let server = serve(
            GatewayBuilder::new()
                .register(ResourceDescriptor::new("Starship").with_page(fleet.clone()))
                .unwrap(),
        );

        server.get("/api/starship?size=1").await.assert_status_ok();
        server.get("/api/starship?size=100").await.assert_status_ok();
        server
            .get("/api/starship?size=101")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(fleet.calls(), vec![(1, 1), (1, 100)]);
    }

    #[tokio::test]
    async fn test_invalid_size_never_reaches_the_resource() {
        let fleet = Arc::new(Fleet::default());
        let server = serve(
            GatewayBuilder::new()
                .register(ResourceDescriptor::new("Starship").with_page(fleet.clone()))
                .unwrap(),
        );

        let response = server.get("/api/starship?page=1&size=500").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "errors": [{
                "code": "400",
                "title": "Invalid size parameter",
                "detail": "The size parameter must be an integer between 1 and 100."
            }]
        }));
        assert!(fleet.calls().is_empty());
    }

    #[tokio::test]
    async fn test_page_is_checked_before_size() {
        let fleet = Arc::new(Fleet::default());
        let server = serve(
            GatewayBuilder::new()
                .register(ResourceDescriptor::new("Starship").with_page(fleet.clone()))
                .unwrap(),
        );

        for query in ["page=0&size=abc", "page=-1", "page=2abc", "page=1.5"] {
            let response = server.get(&format!("/api/starship?{}", query)).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["errors"][0]["title"], "Invalid page parameter", "{}", query);
        }
        assert!(fleet.calls().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_status_codes() {
        let config = GatewayConfig {
            legacy_status_codes: true,
            ..GatewayConfig::default()
        };
        let server = serve(
            GatewayBuilder::new()
                .with_config(config)
                .register(ResourceDescriptor::new("Starship").with_page(Arc::new(Fleet::default())))
                .unwrap(),
        );

        let response = server.get("/api/starship?size=500").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["title"], "Invalid size parameter");

        let response = server.get("/api/starship?page=1&page=2").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["title"], "Invalid query parameters");
    }

    #[tokio::test]
    async fn test_repeated_query_key_is_rejected() {
        let fleet = Arc::new(Fleet::default());
        let server = serve(
            GatewayBuilder::new()
                .register(ResourceDescriptor::new("Starship").with_page(fleet.clone()))
                .unwrap(),
        );

        let response = server.get("/api/starship?page=1&page=2").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.header("content-type"),
            "application/vnd.api+json"
        );
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["code"], "400");
        assert_eq!(body["errors"][0]["title"], "Invalid query parameters");
        assert!(fleet.calls().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_requests_are_identical() {
        let server = serve(
            GatewayBuilder::new()
                .register(ResourceDescriptor::new("Starship").with_all(Arc::new(starfleet())))
                .unwrap(),
        );

        let first = server.get("/api/starship?page=1&size=2").await;
        let second = server.get("/api/starship?page=1&size=2").await;
        assert_eq!(first.as_bytes(), second.as_bytes());
    }
}

// =============================================================================
// Capabilities
// =============================================================================

mod capability_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_only_resource_has_no_collection_route() {
        let server = single("AstronomicalObject", Arc::new(Fixed(json!({"uid": "ASMA01"}))));

        server
            .get("/api/astronomical-object")
            .await
            .assert_status_not_found();
        server
            .post("/api/astronomical-object")
            .await
            .assert_status_not_found();

        let response = server.get("/api/astronomical-object/ASMA01").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["type"], "astronomical-object");
        assert_eq!(body["data"]["id"], "ASMA01");
    }

    #[tokio::test]
    async fn test_page_only_resource_rejects_search_and_get() {
        let server = serve(
            GatewayBuilder::new()
                .register(ResourceDescriptor::new("Character").with_page(Arc::new(Fleet::default())))
                .unwrap(),
        );

        server.get("/api/character").await.assert_status_ok();
        server
            .post("/api/character")
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);
        server
            .get("/api/character/CHMA01")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_inert_resource_mounts_nothing() {
        let server = serve(
            GatewayBuilder::new()
                .register(ResourceDescriptor::new("Starship"))
                .unwrap(),
        );

        server.get("/api/starship").await.assert_status_not_found();
        server.get("/api/starship/1").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_segment_collision_is_rejected() {
        let result = GatewayBuilder::new()
            .register(ResourceDescriptor::new("StarshipApi"))
            .unwrap()
            .register(ResourceDescriptor::new("Starship.Api"));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_routes_follow_configured_namespace() {
        let config = GatewayConfig {
            namespace: "v1".to_string(),
            ..GatewayConfig::default()
        };
        let server = serve(
            GatewayBuilder::new()
                .with_config(config)
                .register(ResourceDescriptor::new("StarshipClass").with_all(Arc::new(starfleet())))
                .unwrap(),
        );

        server.get("/v1/starship-class").await.assert_status_ok();
        server.get("/api/starship-class").await.assert_status_not_found();
    }
}

// =============================================================================
// Search
// =============================================================================

mod search_tests {
    use super::*;

    fn server() -> TestServer {
        serve(
            GatewayBuilder::new()
                .register(ResourceDescriptor::new("Starship").with_all(Arc::new(starfleet())))
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_search_with_form_body() {
        let response = server()
            .post("/api/starship?sort=-registry")
            .form(&[("name", "Enterprise")])
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["STMA03", "STMA01"]);
    }

    #[tokio::test]
    async fn test_search_with_json_body() {
        let response = server()
            .post("/api/starship?size=1")
            .json(&json!({"registry": "NX-74205"}))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["data"][0]["id"], "STMA02");
        assert_eq!(body["data"][0]["attributes"]["name"], "Defiant");
    }

    #[tokio::test]
    async fn test_search_without_body_matches_everything() {
        let response = server().post("/api/starship").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_search_validates_pagination() {
        server()
            .post("/api/starship?page=0")
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_with_malformed_json() {
        let response = server()
            .post("/api/starship")
            .content_type("application/json")
            .bytes("{not json".into())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["title"], "Invalid request body");
    }
}

// =============================================================================
// Serialization and failures
// =============================================================================

mod response_tests {
    use super::*;

    #[tokio::test]
    async fn test_attributes_exclude_reserved_members() {
        let server = single(
            "Starship",
            Arc::new(Fixed(json!({"id": "x", "type": "spoofed", "a": 1, "b": 2}))),
        );

        let response = server.get("/api/starship/x").await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "data": {"type": "starship", "id": "x", "attributes": {"a": 1, "b": 2}}
        }));
    }

    #[tokio::test]
    async fn test_upstream_status_is_forwarded() {
        let server = single(
            "Starship",
            Arc::new(Failing(ResourceError::response(503, Some(json!({"msg": "down"}))))),
        );

        let response = server.get("/api/starship/1").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        response.assert_json(&json!({
            "errors": [{"code": "503", "title": "Error in response", "detail": {"msg": "down"}}]
        }));
    }

    #[tokio::test]
    async fn test_upstream_not_found_is_forwarded() {
        let server = serve(
            GatewayBuilder::new()
                .register(ResourceDescriptor::new("Starship").with_all(Arc::new(starfleet())))
                .unwrap(),
        );

        let response = server.get("/api/starship/NOPE").await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["code"], "404");
        assert_eq!(body["errors"][0]["title"], "Error in response");
    }

    #[tokio::test]
    async fn test_no_response_without_status_is_bad_gateway() {
        let server = single(
            "Starship",
            Arc::new(Failing(ResourceError::no_response(Some("timeout".to_string())))),
        );

        let response = server.get("/api/starship/1").await;
        response.assert_status(StatusCode::BAD_GATEWAY);
        response.assert_json(&json!({
            "errors": [{"code": "502", "title": "Response not received", "detail": "timeout"}]
        }));
    }

    #[tokio::test]
    async fn test_other_failure_is_internal_error() {
        let server = single("Starship", Arc::new(Failing(ResourceError::other("boom"))));

        let response = server.get("/api/starship/1").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({
            "errors": [{"code": "500", "title": "Internal server error", "detail": "boom"}]
        }));
    }

    #[tokio::test]
    async fn test_unserializable_payload() {
        let server = single("Starship", Arc::new(Fixed(json!(42))));

        let response = server.get("/api/starship/1").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["title"], "Error serializing response");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_unserializable_payload_with_legacy_status_codes() {
        let config = GatewayConfig {
            legacy_status_codes: true,
            ..GatewayConfig::default()
        };
        let server = serve(
            GatewayBuilder::new()
                .with_config(config)
                .register(ResourceDescriptor::new("Starship").with_get(Arc::new(Fixed(json!(42)))))
                .unwrap(),
        );

        let response = server.get("/api/starship/1").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["code"], "500");
        assert_eq!(body["errors"][0]["title"], "Error serializing response");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_undecodable_id_is_an_error_document() {
        let server = single("Starship", Arc::new(Fixed(json!({"uid": "STMA01"}))));

        let response = server.get("/api/starship/%FF").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.header("content-type"),
            "application/vnd.api+json"
        );
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["title"], "Invalid path parameter");
        assert!(body.get("data").is_none());
    }
}
