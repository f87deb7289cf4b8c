//! Response shapes and error mapping.
//!
//! REST: missing fields are 400, any delegate failure is 500, both with
//! `{"error": message}`. JSON-RPC always answers 200 with an envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::blockchain::GatewayError;

/// JSON-RPC code for failures inside a method.
pub const RPC_INTERNAL_ERROR: i64 = -32603;
/// JSON-RPC code for a body that is not JSON.
pub const RPC_PARSE_ERROR: i64 = -32700;
/// JSON-RPC code for JSON that is not a request object.
pub const RPC_INVALID_REQUEST: i64 = -32600;

/// Error returned by REST handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        tracing::warn!(kind = e.kind(), error = %e, "Request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// `{"jsonrpc":"2.0","result":…,"id":…}`
pub fn rpc_result(result: Value, id: Value) -> Value {
    json!({ "jsonrpc": "2.0", "result": result, "id": id })
}

/// `{"jsonrpc":"2.0","error":{"code":…,"message":…},"id":…}`
pub fn rpc_error(code: i64, message: impl Into<String>, id: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "error": { "code": code, "message": message.into() },
        "id": id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_maps_to_500() {
        let err = ApiError::from(GatewayError::KeystoreNotFound("0xabc".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("0xabc"));
    }

    #[test]
    fn test_rpc_envelopes() {
        let ok = rpc_result(json!(true), json!(7));
        assert_eq!(ok, json!({"jsonrpc": "2.0", "result": true, "id": 7}));

        let err = rpc_error(RPC_INTERNAL_ERROR, "boom", Value::Null);
        assert_eq!(err["error"]["code"], -32603);
        assert_eq!(err["error"]["message"], "boom");
        assert!(err["id"].is_null());
    }
}
