//! Resource registry for collecting descriptors and auto-generating routes

use crate::config::GatewayConfig;
use crate::core::error::RegistryError;
use crate::core::naming::is_routable;
use crate::core::resource::ResourceDescriptor;
use crate::server::resource_router::build_resource_routes;
use axum::Router;
use indexmap::IndexMap;

/// Registry for all resources in the application
///
/// Descriptors are keyed by their derived URL segment, in registration order.
/// A segment can only be claimed once.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    descriptors: IndexMap<String, ResourceDescriptor>,
}

impl ResourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            descriptors: IndexMap::new(),
        }
    }

    /// Register a resource descriptor under its derived segment
    pub fn register(&mut self, descriptor: ResourceDescriptor) -> Result<(), RegistryError> {
        let segment = descriptor.segment();

        if !is_routable(&segment) {
            return Err(RegistryError::InvalidName {
                name: descriptor.name().to_string(),
            });
        }

        if let Some(existing) = self.descriptors.get(&segment) {
            return Err(RegistryError::DuplicateSegment {
                segment,
                existing: existing.name().to_string(),
                incoming: descriptor.name().to_string(),
            });
        }

        if descriptor.is_inert() {
            tracing::warn!(
                resource = descriptor.name(),
                "Resource exposes no operation, no route will be mounted"
            );
        }

        self.descriptors.insert(segment, descriptor);
        Ok(())
    }

    /// Build a router with the routes of every registered resource
    pub fn build_routes(&self, config: &GatewayConfig) -> Router {
        let mut router = Router::new();

        for (segment, descriptor) in &self.descriptors {
            tracing::info!(
                "Registering {} resource routes at {}",
                descriptor.name(),
                config.collection_path(segment)
            );
            router = router.merge(build_resource_routes(descriptor, segment, config));
        }

        router
    }

    /// Get a descriptor by segment
    pub fn get(&self, segment: &str) -> Option<&ResourceDescriptor> {
        self.descriptors.get(segment)
    }

    /// All registered segments, in registration order
    pub fn segments(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
