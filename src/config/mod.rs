//! Configuration loading and management

use crate::core::resource::Capability;
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Pagination bounds and defaults applied to list and search requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page used when the request has none
    pub default_page: u64,

    /// Size used when the request has none
    pub default_size: u64,

    /// Largest accepted size (inclusive)
    pub max_size: u64,

    /// Sort key used by search when the request has none
    pub default_sort: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_size: 10,
            max_size: 100,
            default_sort: "uid".to_string(),
        }
    }
}

/// An upstream HTTP resource mounted from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource name (e.g. "StarshipClass"), from which the URL segment is derived
    pub name: String,

    /// Base URL of the upstream collection
    pub base_url: String,

    /// Operations the upstream offers
    #[serde(default = "all_capabilities")]
    pub capabilities: Vec<Capability>,

    /// Per-request timeout, in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn all_capabilities() -> Vec<Capability> {
    Capability::ALL.to_vec()
}

/// Complete gateway configuration
///
/// # Example
///
/// ```yaml
/// namespace: api
/// banner: STAPI JSON:API Service Example.
/// legacy_status_codes: false
/// pagination:
///   default_size: 10
///   max_size: 100
/// resources:
///   - name: Starship
///     base_url: http://localhost:8080/starship
///     capabilities: [page, get]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Path prefix every resource is mounted under
    pub namespace: String,

    /// Plain-text body served at `/`
    pub banner: String,

    /// Send validation and serialization failures with HTTP 200
    pub legacy_status_codes: bool,

    pub pagination: PaginationConfig,

    pub resources: Vec<ResourceConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            namespace: "api".to_string(),
            banner: "JSON:API gateway".to_string(),
            legacy_status_codes: false,
            pagination: PaginationConfig::default(),
            resources: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that routing and validation rely on
    pub fn validate(&self) -> Result<()> {
        let namespace = self.namespace.trim_matches('/');
        ensure!(!namespace.is_empty(), "namespace must not be empty");
        ensure!(
            !namespace.contains(&['{', '}', '*'][..]),
            "namespace '{}' must not contain route parameters",
            self.namespace
        );

        let pagination = &self.pagination;
        ensure!(pagination.default_page >= 1, "default_page must be at least 1");
        ensure!(pagination.max_size >= 1, "max_size must be at least 1");
        ensure!(
            (1..=pagination.max_size).contains(&pagination.default_size),
            "default_size {} must be between 1 and max_size {}",
            pagination.default_size,
            pagination.max_size
        );

        for resource in &self.resources {
            ensure!(
                !resource.base_url.is_empty(),
                "resource '{}' has no base_url",
                resource.name
            );
        }

        Ok(())
    }

    /// Collection path for a resource segment (e.g. `/api/starship`)
    pub fn collection_path(&self, segment: &str) -> String {
        format!("/{}/{}", self.namespace.trim_matches('/'), segment)
    }
}
