//! Resource client implementations

#[cfg(feature = "http-client")]
pub mod http;
#[cfg(feature = "in-memory")]
pub mod in_memory;

#[cfg(feature = "http-client")]
pub use http::HttpResource;
#[cfg(feature = "in-memory")]
pub use in_memory::InMemoryResource;
