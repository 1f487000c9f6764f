//! REST API exposure for the gateway
//!
//! Consumes the configuration and the resource registry and produces an Axum
//! `Router` with the banner, health checks, every resource route and any
//! custom routes, wrapped in request tracing and panic recovery.

use crate::config::GatewayConfig;
use crate::core::error::GatewayError;
use crate::server::resource_registry::ResourceRegistry;
use anyhow::{Result, anyhow};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router
    ///
    /// # Returns
    ///
    /// A fully configured Axum router with:
    /// - Banner route (`/`)
    /// - Health check routes
    /// - Resource routes under the configured namespace
    /// - Custom routes
    ///
    /// Custom routes overlapping an already mounted method and path are an error.
    pub fn build_router(
        config: &GatewayConfig,
        registry: &ResourceRegistry,
        custom_routes: Vec<Router>,
    ) -> Result<Router> {
        config.validate()?;

        let mut app = Self::banner_routes(config.banner.clone())
            .merge(Self::health_routes())
            .merge(registry.build_routes(config));

        for custom_router in custom_routes {
            app = catch_unwind(AssertUnwindSafe(move || app.merge(custom_router))).map_err(
                |panic| anyhow!("Custom routes overlap: {}", panic_message(panic.as_ref())),
            )?;
        }

        Ok(app
            .layer(CatchPanicLayer::custom(Self::handle_panic))
            .layer(TraceLayer::new_for_http()))
    }

    /// Build the plain-text banner route
    fn banner_routes(banner: String) -> Router {
        Router::new().route(
            "/",
            get(move || {
                let banner = banner.clone();
                async move { banner }
            }),
        )
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "jsonapi-gateway"
        }))
    }

    /// Render a handler panic as an internal error document
    fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
        GatewayError::internal(panic_message(panic.as_ref())).into_response()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    }
}
