//! Inbound HTTP API
//!
//! - `convert_commands`: request/response types and the axum handlers
//! - `server`: router assembly, middleware layers and the serve loop

pub mod convert_commands;
pub mod server;

pub use convert_commands::{AppState, ConvertRequest, ErrorBody, HealthResponse};
pub use server::{create_router, serve};
