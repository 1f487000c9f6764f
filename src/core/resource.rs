//! Resource capabilities and descriptors
//!
//! A resource client offers up to three operations. Each one is its own trait so
//! a descriptor can hold exactly the capabilities a client has, and the router
//! can check for their presence instead of probing the client at request time.

use crate::core::naming::resource_segment;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Failure reported by a resource operation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResourceError {
    /// The upstream answered, with a failure status
    #[error("upstream responded with status {status}")]
    Response { status: u16, body: Option<Value> },

    /// A request was sent but no response arrived (timeout, dropped connection)
    #[error("no response received: {}", .message.as_deref().unwrap_or("unknown error"))]
    NoResponse {
        status: Option<u16>,
        message: Option<String>,
    },

    /// Anything unrelated to the transport
    #[error("{}", .message.as_deref().unwrap_or("unknown error"))]
    Other { message: Option<String> },
}

impl ResourceError {
    pub fn response(status: u16, body: Option<Value>) -> Self {
        ResourceError::Response { status, body }
    }

    pub fn no_response(message: Option<String>) -> Self {
        ResourceError::NoResponse {
            status: None,
            message,
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        ResourceError::Other {
            message: Some(message.into()),
        }
    }
}

/// Paged listing
#[async_trait]
pub trait PageOperation: Send + Sync {
    /// Return page `page` (1-based) of at most `size` items
    async fn page(&self, page: u64, size: u64) -> Result<Value, ResourceError>;
}

/// Filtered search
#[async_trait]
pub trait SearchOperation: Send + Sync {
    /// Search with opaque `criteria`, sorted by `sort`
    async fn search(
        &self,
        page: u64,
        size: u64,
        sort: &str,
        criteria: Value,
    ) -> Result<Value, ResourceError>;
}

/// Single-item retrieval
#[async_trait]
pub trait GetOperation: Send + Sync {
    async fn get(&self, id: &str) -> Result<Value, ResourceError>;
}

/// One of the three operations a resource may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Page,
    Search,
    Get,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Page, Capability::Search, Capability::Get];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Page => write!(f, "page"),
            Capability::Search => write!(f, "search"),
            Capability::Get => write!(f, "get"),
        }
    }
}

/// Named bundle of optional resource operations
///
/// # Example
///
/// ```rust,ignore
/// let starships = Arc::new(InMemoryResource::new(items));
///
/// // Every operation
/// let full = ResourceDescriptor::new("Starship").with_all(starships.clone());
///
/// // Retrieval only: no collection route is mounted
/// let lookup = ResourceDescriptor::new("StarshipClass").with_get(starships);
/// ```
#[derive(Clone)]
pub struct ResourceDescriptor {
    name: String,
    page: Option<Arc<dyn PageOperation>>,
    search: Option<Arc<dyn SearchOperation>>,
    get: Option<Arc<dyn GetOperation>>,
}

impl ResourceDescriptor {
    /// Create a descriptor without any capability
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page: None,
            search: None,
            get: None,
        }
    }

    pub fn with_page(mut self, operation: Arc<dyn PageOperation>) -> Self {
        self.page = Some(operation);
        self
    }

    pub fn with_search(mut self, operation: Arc<dyn SearchOperation>) -> Self {
        self.search = Some(operation);
        self
    }

    pub fn with_get(mut self, operation: Arc<dyn GetOperation>) -> Self {
        self.get = Some(operation);
        self
    }

    /// Attach every operation of a client that implements all three
    pub fn with_all<R>(self, resource: Arc<R>) -> Self
    where
        R: PageOperation + SearchOperation + GetOperation + 'static,
    {
        self.with_page(resource.clone())
            .with_search(resource.clone())
            .with_get(resource)
    }

    /// Resource name as registered (e.g. `StarshipApi`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL segment derived from the name (e.g. `starship-api`)
    pub fn segment(&self) -> String {
        resource_segment(&self.name)
    }

    pub fn page(&self) -> Option<&Arc<dyn PageOperation>> {
        self.page.as_ref()
    }

    pub fn search(&self) -> Option<&Arc<dyn SearchOperation>> {
        self.search.as_ref()
    }

    pub fn get(&self) -> Option<&Arc<dyn GetOperation>> {
        self.get.as_ref()
    }

    /// Capabilities present on this descriptor, in route order
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.supports(*capability))
            .collect()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Page => self.page.is_some(),
            Capability::Search => self.search.is_some(),
            Capability::Get => self.get.is_some(),
        }
    }

    /// A descriptor with no capability mounts no route
    pub fn is_inert(&self) -> bool {
        self.capabilities().is_empty()
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}
