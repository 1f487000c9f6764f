//! Core module containing the document model, error mapping and resource traits

pub mod document;
pub mod error;
pub mod extractors;
pub mod naming;
pub mod query;
pub mod resource;

pub use document::{ApiError, Document, JSONAPI_MEDIA_TYPE, PrimaryData, ResourceObject};
pub use error::{GatewayError, GatewayResult, RegistryError, SerializationError, ValidationError};
pub use extractors::SearchCriteria;
pub use naming::resource_segment;
pub use query::{PageQuery, Pagination, SearchParams};
pub use resource::{
    Capability, GetOperation, PageOperation, ResourceDescriptor, ResourceError, SearchOperation,
};
