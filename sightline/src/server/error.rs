//! JSON error responses.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::fmt::Display;

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    error: &'a str,
}

/// A handler failure, rendered as `{"message": ..., "error": ...}`.
///
/// `message` names the stage that failed; `error` carries the
/// underlying error's text, or stays empty when the request itself was
/// the problem.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, error: impl Display) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            error: error.to_string(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            error: String::new(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "not found".to_string(),
            error: String::new(),
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let body = serde_json::to_string(&ErrorBody {
            message: &self.message,
            error: &self.error,
        })
        .unwrap_or_default();
        Response::builder()
            .status(self.status)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_carries_underlying_error() {
        let response =
            ApiError::bad_request("failed to fetch block", "node error -5: not found")
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["Content-Type"],
            "application/json"
        );
    }

    #[test]
    fn test_error_body_shape() {
        let error = ApiError::invalid_request("need a block or an address");
        let body = serde_json::to_value(ErrorBody {
            message: &error.message,
            error: &error.error,
        })
        .unwrap();
        assert_eq!(body["message"], "need a block or an address");
        assert_eq!(body["error"], "");
    }

    #[test]
    fn test_not_found_is_404() {
        let error = ApiError::not_found();
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.message, "not found");
    }
}
