//! Application layer
//!
//! Orchestrates the domain functions and the infrastructure collaborators
//! into the link conversion use case.

pub mod conversion_service;

pub use conversion_service::ConversionService;
