//! Uniform response envelope.
//!
//! Every handler and middleware rejection answers with the same JSON shape
//! so clients can branch on `success` without sniffing status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Success envelope with a payload.
pub fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    let body = ApiResponse {
        success: true,
        message: message.to_string(),
        data: Some(data),
        error: None,
    };
    (status, Json(body)).into_response()
}

/// Success envelope without a payload.
pub fn message(status: StatusCode, message: &str) -> Response {
    let body = ApiResponse::<()> {
        success: true,
        message: message.to_string(),
        data: None,
        error: None,
    };
    (status, Json(body)).into_response()
}

/// Failure envelope. `detail` is a short machine-friendly reason; sensitive
/// causes belong in the logs, not here.
pub fn failure(status: StatusCode, message: &str, detail: &str) -> Response {
    let body = ApiResponse::<()> {
        success: false,
        message: message.to_string(),
        data: None,
        error: Some(detail.to_string()),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn success_skips_the_error_field() {
        let body = ApiResponse {
            success: true,
            message: "ok".to_string(),
            data: Some(json!({"id": 1})),
            error: None,
        };
        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(
            value,
            json!({"success": true, "message": "ok", "data": {"id": 1}})
        );
    }

    #[test]
    fn failure_skips_the_data_field() {
        let body = ApiResponse::<Value> {
            success: false,
            message: "nope".to_string(),
            data: None,
            error: Some("bad_input".to_string()),
        };
        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(
            value,
            json!({"success": false, "message": "nope", "error": "bad_input"})
        );
    }
}
