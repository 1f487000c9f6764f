//! Resource client for an upstream HTTP collection
//!
//! The upstream follows the STAPI conventions: a 0-based `pageNumber`, a
//! `pageSize`, a form-encoded search endpoint at `{base}/search` and item
//! lookup through the `uid` query parameter.

use crate::config::ResourceConfig;
use crate::core::resource::{
    Capability, GetOperation, PageOperation, ResourceDescriptor, ResourceError, SearchOperation,
};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

impl From<reqwest::Error> for ResourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            ResourceError::NoResponse {
                status: err.status().map(|s| s.as_u16()),
                message: Some(err.to_string()),
            }
        } else {
            ResourceError::other(err.to_string())
        }
    }
}

/// Resource backed by an upstream HTTP API
#[derive(Debug, Clone)]
pub struct HttpResource {
    client: Client,
    base_url: String,
}

impl HttpResource {
    /// Create a client for the collection at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create with a preconfigured reqwest client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create from a configured resource, applying its timeout
    pub fn from_config(config: &ResourceConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::with_client(builder.build()?, config.base_url.clone()))
    }

    /// Build a descriptor exposing only the configured capabilities
    pub fn descriptor(config: &ResourceConfig) -> Result<ResourceDescriptor> {
        let resource = Arc::new(Self::from_config(config)?);
        let mut descriptor = ResourceDescriptor::new(config.name.clone());

        for capability in &config.capabilities {
            descriptor = match capability {
                Capability::Page => descriptor.with_page(resource.clone()),
                Capability::Search => descriptor.with_search(resource.clone()),
                Capability::Get => descriptor.with_get(resource.clone()),
            };
        }

        Ok(descriptor)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ResourceError> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), url = %self.base_url, "Upstream error");
            return Err(ResourceError::response(status.as_u16(), error_body(&bytes)));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            ResourceError::other(format!("Invalid JSON from {}: {}", self.base_url, e))
        })
    }
}

#[async_trait]
impl PageOperation for HttpResource {
    async fn page(&self, page: u64, size: u64) -> Result<Value, ResourceError> {
        let request = self
            .client
            .get(&self.base_url)
            .query(&[("pageNumber", page.saturating_sub(1)), ("pageSize", size)]);
        self.send(request).await
    }
}

#[async_trait]
impl SearchOperation for HttpResource {
    async fn search(
        &self,
        page: u64,
        size: u64,
        sort: &str,
        criteria: Value,
    ) -> Result<Value, ResourceError> {
        let form = form_pairs(criteria)?;
        let request = self
            .client
            .post(format!("{}/search", self.base_url))
            .query(&[
                ("pageNumber", page.saturating_sub(1).to_string()),
                ("pageSize", size.to_string()),
                ("sort", sort.to_string()),
            ])
            .form(&form);
        self.send(request).await
    }
}

#[async_trait]
impl GetOperation for HttpResource {
    async fn get(&self, id: &str) -> Result<Value, ResourceError> {
        let request = self.client.get(&self.base_url).query(&[("uid", id)]);
        self.send(request).await
    }
}

/// Error bodies are kept as JSON when possible, else as text
fn error_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(bytes)
        .ok()
        .or_else(|| Some(Value::String(String::from_utf8_lossy(bytes).into_owned())))
}

/// Flatten search criteria into form pairs; arrays repeat their key
fn form_pairs(criteria: Value) -> Result<Vec<(String, String)>, ResourceError> {
    let criteria = match criteria {
        Value::Object(criteria) => criteria,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(ResourceError::response(
                400,
                Some(json!({"error": "search criteria must be an object"})),
            ));
        }
    };

    let mut pairs = Vec::new();
    for (key, value) in criteria {
        match value {
            Value::Array(values) => {
                pairs.extend(
                    values
                        .into_iter()
                        .filter_map(form_value)
                        .map(|v| (key.clone(), v)),
                );
            }
            value => {
                if let Some(value) = form_value(value) {
                    pairs.push((key, value));
                }
            }
        }
    }
    Ok(pairs)
}

fn form_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
