//! Request utilities for HTTP endpoints.

use std::fmt::Display;
use std::time::Duration;

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use tokio::time;

use crate::router::RouterError;
use customer_core::{CustomerFields, CustomerId};

/// Helper function to read request body with timeout
pub async fn read_request_body_with_timeout<B>(
    req: Request<B>,
    timeout: Duration,
) -> Result<Bytes, RouterError>
where
    B: Body,
    B::Error: Display,
{
    let body = time::timeout(timeout, req.into_body().collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::BadRequest(format!("failed to read request body: {}", e)))?;
    Ok(body.to_bytes())
}

/// Decodes a JSON body into customer fields.
///
/// A literal `null` body decodes to empty fields. Any decode failure,
/// including an empty body, is reported as `invalid json`.
pub fn decode_customer_fields(body: &[u8]) -> Result<CustomerFields, RouterError> {
    serde_json::from_slice::<Option<CustomerFields>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| {
            tracing::debug!(error = %e, "rejecting customer body");
            RouterError::BadRequest("invalid json".to_string())
        })
}

/// Parses the trailing `{id}` path segment.
///
/// The segment is percent-decoded first. An empty segment or one that decodes
/// to something containing `/` is treated as an unknown path. The integer parse
/// is literal: surrounding whitespace is not trimmed.
pub fn parse_customer_id(segment: &str) -> Result<CustomerId, RouterError> {
    let decoded = percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| RouterError::BadRequest("invalid id".to_string()))?;
    if decoded.is_empty() || decoded.contains('/') {
        return Err(RouterError::NotFound);
    }
    decoded
        .parse()
        .map_err(|_| RouterError::BadRequest("invalid id".to_string()))
}

/// Serializes `value` and wraps it in a JSON response.
pub fn build_json_response<T: Serialize + ?Sized>(
    status: u16,
    value: &T,
) -> Result<Response<Bytes>, RouterError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Bytes::from(json))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Helper to build a plain-text response
pub fn build_text_response(status: u16, text: &'static str) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Bytes::from_static(text.as_bytes()))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Helper to build empty HTTP response (for 204 No Content)
pub fn build_empty_response(status: u16) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .body(Bytes::new())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}
