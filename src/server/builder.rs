//! GatewayBuilder for fluent API to build the gateway server

use super::exposure::RestExposure;
use super::resource_registry::ResourceRegistry;
use crate::config::GatewayConfig;
use crate::core::resource::ResourceDescriptor;
use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

/// Builder for creating the gateway with auto-registered resource routes
///
/// # Example
///
/// ```ignore
/// let app = GatewayBuilder::new()
///     .with_config(GatewayConfig::from_yaml_file("gateway.yaml")?)
///     .register(ResourceDescriptor::new("Starship").with_all(starships))?
///     .build()?;
/// ```
pub struct GatewayBuilder {
    config: GatewayConfig,
    registry: ResourceRegistry,
    custom_routes: Vec<Router>,
}

impl GatewayBuilder {
    /// Create a new GatewayBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
            registry: ResourceRegistry::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints that are not backed by a resource, such as
    /// status pages or webhooks.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Register a resource descriptor
    ///
    /// Fails when the derived segment is already taken or is not routable.
    pub fn register(mut self, descriptor: ResourceDescriptor) -> Result<Self> {
        self.registry.register(descriptor)?;
        Ok(self)
    }

    /// Registered resources
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Build the final REST router
    ///
    /// Resources listed in the configuration are registered after the ones
    /// passed to [`register`](Self::register).
    pub fn build(mut self) -> Result<Router> {
        self.config.validate()?;
        self.register_configured_resources()?;

        RestExposure::build_router(&self.config, &self.registry, self.custom_routes)
    }

    #[cfg(feature = "http-client")]
    fn register_configured_resources(&mut self) -> Result<()> {
        use crate::storage::http::HttpResource;

        for resource in &self.config.resources {
            self.registry.register(HttpResource::descriptor(resource)?)?;
        }
        Ok(())
    }

    #[cfg(not(feature = "http-client"))]
    fn register_configured_resources(&mut self) -> Result<()> {
        for resource in &self.config.resources {
            tracing::warn!(
                resource = %resource.name,
                "Ignoring configured resource, the http-client feature is disabled"
            );
        }
        Ok(())
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// GatewayBuilder::new()
    ///     .register(descriptor)?
    ///     .serve("127.0.0.1:3000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
