//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `GET /exists/:key` - Probe a key
//! - `DELETE /del/:key` - Delete a key
//! - `GET /count` - Approximate live-entry count
//! - `GET /dump` - Snapshot of all entries
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
