//! Server module for building the gateway with auto-registered routes
//!
//! This module provides a `GatewayBuilder` that mounts, for every registered resource:
//! - `GET /{namespace}/{segment}` when the resource can page
//! - `POST /{namespace}/{segment}` when it can search
//! - `GET /{namespace}/{segment}/{id}` when it can retrieve

pub mod builder;
pub mod exposure;
pub mod resource_registry;
pub mod resource_router;

pub use builder::GatewayBuilder;
pub use resource_registry::ResourceRegistry;
