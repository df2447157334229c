//! Core library for shiftboard.
//!
//! Mirrors the server-managed calendar data (events, resource types, shift
//! assignments, templates) in memory and keeps it in step with the REST API:
//!
//! - `api`: request/response types, the `Transport` seam and the reqwest client
//! - `models`: serde models for the API payloads
//! - `store`: the `EventStore` cache and its mutation methods
//! - `config`: API URL, token and timeout settings
//! - `utils`: date parsing and display helpers

pub mod api;
pub mod config;
pub mod models;
pub mod store;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiRequest, ApiResponse, Transport};
pub use config::Config;
pub use store::EventStore;
