//! # jsonapi-gateway
//!
//! A JSON:API facade over upstream resource clients.
//!
//! ## Features
//!
//! - **Capability-Based Routing**: a resource mounts only the routes for the operations it offers
//! - **Validated Pagination**: `page`/`size` are checked before any upstream call
//! - **JSON:API Documents**: payloads become `{"data": ...}` with derived `type` and `id`
//! - **Uniform Errors**: upstream and internal failures become `{"errors": [...]}`
//! - **Configuration-Based**: mount upstream HTTP collections from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jsonapi_gateway::prelude::*;
//!
//! let starships = Arc::new(InMemoryResource::new(vec![
//!     json!({"uid": "STMA01", "name": "Enterprise"}),
//! ]));
//!
//! // GET /api/starship, POST /api/starship, GET /api/starship/{id}
//! GatewayBuilder::new()
//!     .register(ResourceDescriptor::new("Starship").with_all(starships))?
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        document::{ApiError, Document, PrimaryData, ResourceObject},
        error::{GatewayError, RegistryError, ValidationError},
        resource::{
            Capability, GetOperation, PageOperation, ResourceDescriptor, ResourceError,
            SearchOperation,
        },
    };

    // === Storage ===
    #[cfg(feature = "http-client")]
    pub use crate::storage::HttpResource;
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryResource;

    // === Config ===
    pub use crate::config::{GatewayConfig, PaginationConfig, ResourceConfig};

    // === Server ===
    pub use crate::server::{GatewayBuilder, ResourceRegistry};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
    pub use std::sync::Arc;

    // === Axum ===
    pub use axum::{
        Router,
        routing::{get, post},
    };
}
