//! API exposure
//!
//! The REST exposure consumes the configuration and the resource registry and
//! produces the Axum router.

pub mod rest;

pub use rest::RestExposure;
