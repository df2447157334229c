//! REST API access for the shiftboard server.
//!
//! Requests are described as plain `ApiRequest` values and sent through a
//! `Transport`. `ApiClient` is the reqwest-backed transport used in
//! production; tests substitute their own.

pub mod client;
pub mod error;
pub mod request;

pub use client::ApiClient;
pub use error::ApiError;
pub use request::{ApiRequest, ApiResponse, Transport};
