//! Tests for the HTTP resource client against a throwaway upstream
//!
//! The upstream echoes the parameters it receives so the tests can check the
//! exact requests the client sends.

#![cfg(feature = "http-client")]

use axum::extract::{Form, Query};
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum_test::TestServer;
use jsonapi_gateway::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;

async fn list_starships(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if let Some(uid) = params.get("uid") {
        if uid == "missing" {
            return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response();
        }
        return Json(json!({"uid": uid, "name": "Enterprise"})).into_response();
    }

    let page = params.get("pageNumber").cloned().unwrap_or_default();
    let size = params.get("pageSize").cloned().unwrap_or_default();
    Json(json!([{"uid": format!("page-{}-size-{}", page, size)}])).into_response()
}

async fn search_starships(
    Query(params): Query<HashMap<String, String>>,
    Form(criteria): Form<HashMap<String, String>>,
) -> Json<Value> {
    Json(json!([{
        "uid": "found",
        "pageNumber": params.get("pageNumber"),
        "pageSize": params.get("pageSize"),
        "sort": params.get("sort"),
        "criteria": criteria
    }]))
}

async fn unavailable() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"msg": "down"})))
}

async fn empty_failure() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn text_failure() -> impl IntoResponse {
    (StatusCode::BAD_GATEWAY, "upstream of upstream is gone")
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!([]))
}

/// Start the upstream and return its base URL
async fn start_upstream() -> String {
    let app = Router::new()
        .route("/starship", get(list_starships))
        .route("/starship/search", post(search_starships))
        .route("/unavailable", get(unavailable))
        .route("/empty", get(empty_failure))
        .route("/text", get(text_failure))
        .route("/slow", get(slow));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

// =============================================================================
// Request mapping
// =============================================================================

mod request_tests {
    use super::*;

    #[tokio::test]
    async fn test_page_sends_zero_based_page_number() {
        let base = start_upstream().await;
        let resource = HttpResource::new(format!("{}/starship", base));

        let result = resource.page(3, 25).await.unwrap();
        assert_eq!(result, json!([{"uid": "page-2-size-25"}]));
    }

    #[tokio::test]
    async fn test_search_posts_form_criteria() {
        let base = start_upstream().await;
        let resource = HttpResource::new(format!("{}/starship", base));

        let result = resource
            .search(1, 10, "name", json!({"name": "Enterprise", "crew": 430}))
            .await
            .unwrap();
        assert_eq!(result[0]["pageNumber"], "0");
        assert_eq!(result[0]["pageSize"], "10");
        assert_eq!(result[0]["sort"], "name");
        assert_eq!(result[0]["criteria"], json!({"name": "Enterprise", "crew": "430"}));
    }

    #[tokio::test]
    async fn test_get_sends_uid() {
        let base = start_upstream().await;
        let resource = HttpResource::new(format!("{}/starship", base));

        let result = resource.get("STMA01").await.unwrap();
        assert_eq!(result, json!({"uid": "STMA01", "name": "Enterprise"}));
    }
}

// =============================================================================
// Failure mapping
// =============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_error_status_keeps_json_body() {
        let base = start_upstream().await;
        let resource = HttpResource::new(format!("{}/unavailable", base));

        let err = resource.page(1, 10).await.unwrap_err();
        assert_eq!(err, ResourceError::response(503, Some(json!({"msg": "down"}))));
    }

    #[tokio::test]
    async fn test_error_status_with_empty_body() {
        let base = start_upstream().await;
        let resource = HttpResource::new(format!("{}/empty", base));

        let err = resource.get("1").await.unwrap_err();
        assert_eq!(err, ResourceError::response(500, None));
    }

    #[tokio::test]
    async fn test_error_status_with_text_body() {
        let base = start_upstream().await;
        let resource = HttpResource::new(format!("{}/text", base));

        let err = resource.get("1").await.unwrap_err();
        assert_eq!(
            err,
            ResourceError::response(502, Some(json!("upstream of upstream is gone")))
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_no_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let resource = HttpResource::new(format!("http://{}/starship", addr));
        let err = resource.page(1, 10).await.unwrap_err();
        assert!(
            matches!(err, ResourceError::NoResponse { status: None, .. }),
            "unexpected error: {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_timeout_is_no_response() {
        let base = start_upstream().await;
        let config = ResourceConfig {
            name: "Slow".to_string(),
            base_url: format!("{}/slow", base),
            capabilities: vec![Capability::Page],
            timeout_secs: Some(1),
        };

        let resource = HttpResource::from_config(&config).unwrap();
        let err = resource.page(1, 10).await.unwrap_err();
        assert!(
            matches!(err, ResourceError::NoResponse { .. }),
            "unexpected error: {:?}",
            err
        );
    }
}

// =============================================================================
// Through the gateway
// =============================================================================

mod gateway_tests {
    use super::*;

    #[tokio::test]
    async fn test_configured_resource_is_mounted() {
        let base = start_upstream().await;
        let config = GatewayConfig::from_yaml_str(&format!(
            r#"
resources:
  - name: Starship
    base_url: {base}/starship
    capabilities: [page, get]
"#
        ))
        .unwrap();

        let app = GatewayBuilder::new().with_config(config).build().unwrap();
        let server = TestServer::new(app);

        let response = server.get("/api/starship?page=2&size=5").await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "data": [{"type": "starship", "id": "page-1-size-5", "attributes": {"uid": "page-1-size-5"}}]
        }));

        server
            .post("/api/starship")
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_forwarded() {
        let base = start_upstream().await;
        let config = ResourceConfig {
            name: "Starship".to_string(),
            base_url: format!("{}/starship", base),
            capabilities: Capability::ALL.to_vec(),
            timeout_secs: None,
        };

        let app = GatewayBuilder::new()
            .register(HttpResource::descriptor(&config).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let server = TestServer::new(app);

        let response = server.get("/api/starship/missing").await;
        response.assert_status_not_found();
        response.assert_json(&json!({
            "errors": [{"code": "404", "title": "Error in response", "detail": {"error": "not found"}}]
        }));
    }
}
