//! HTTP response builders.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Response body type used throughout flyboard.
pub type Body = Full<Bytes>;

/// Full response type used throughout flyboard.
pub type HttpResponse = Response<Body>;

/// Build a JSON response from an already-encoded body.
pub fn raw_json(status: StatusCode, body: impl Into<Bytes>) -> HttpResponse {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Build a JSON response with the given status code and body.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> crate::Result<HttpResponse> {
    Ok(raw_json(status, serde_json::to_vec(body)?))
}

/// Build a 200 OK JSON response.
pub fn ok<T: Serialize>(body: &T) -> crate::Result<HttpResponse> {
    json(StatusCode::OK, body)
}

/// Build a `{"error": message}` response.
pub fn error(status: StatusCode, message: &str) -> HttpResponse {
    raw_json(status, serde_json::json!({ "error": message }).to_string())
}
