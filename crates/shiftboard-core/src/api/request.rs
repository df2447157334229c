//! Plain-data HTTP requests and responses.
//!
//! The cache builds `ApiRequest` values and hands them to a `Transport`;
//! the transport performs the round-trip and returns the raw `ApiResponse`.
//! Status interpretation and JSON decoding happen on the response so every
//! transport behaves the same way.

use std::future::Future;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::ApiError;

/// An HTTP request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter. Values are URL-encoded by the transport.
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .with_context(|| format!("Failed to serialize request body for {}", self.path))?;
        self.body = Some(value);
        Ok(self)
    }
}

/// A raw HTTP response as returned by a `Transport`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Turn a non-2xx status into the matching `ApiError`.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.body))
        }
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// Sends `ApiRequest`s to the server.
///
/// Implementations return every response that arrives, whatever its status;
/// only failures to complete the round-trip are errors.
pub trait Transport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_collects_query_and_body() {
        let req = ApiRequest::post("/api/events/7/template")
            .query("start", "2024-01-01")
            .json(&json!({ "name": "Weekly" }))
            .unwrap();

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/api/events/7/template");
        assert_eq!(req.query, vec![("start".to_string(), "2024-01-01".to_string())]);
        assert_eq!(req.body, Some(json!({ "name": "Weekly" })));
    }

    #[test]
    fn test_error_for_status_passes_success() {
        let resp = ApiResponse::new(StatusCode::NO_CONTENT, "");
        assert!(resp.error_for_status().is_ok());
    }

    #[test]
    fn test_error_for_status_maps_failure() {
        let resp = ApiResponse::new(StatusCode::NOT_FOUND, "no such event");
        let err = resp.error_for_status().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_json_reports_invalid_body() {
        let resp = ApiResponse::new(StatusCode::OK, "<html>");
        let err = resp.json::<Value>().unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }
}
