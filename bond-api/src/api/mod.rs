//! REST API Server Module
//!
//! This module provides the HTTP surface of the bond API: service endpoints
//! (health, status, contract address), bond endpoints, and API docs.

// Generic shared code (error envelope, service endpoints, routing)
mod generic;

// Bond issue/trade/query handlers
pub mod bond;

// OpenAPI document and Swagger UI
pub mod docs;

pub use generic::{ApiServer, ErrorResponse, StatusResponse, ENDPOINTS, NOT_CONFIGURED};
