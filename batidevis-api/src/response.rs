/// Uniform success envelope
///
/// Every JSON-returning endpoint wraps its payload as:
///
/// ```json
/// {
///   "success": true,
///   "data": { ... }
/// }
/// ```
///
/// Failures use the matching envelope from [`crate::error`]. The CSV export
/// endpoint is the one exception: it returns a raw attachment body.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success envelope wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always true
    pub success: bool,

    /// Response payload
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a payload in the success envelope
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Shorthand for `ApiResponse::new`
pub fn ok<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse::new(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let response = ApiResponse::new(json!({ "id": 7 }));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["data"]["id"], json!(7));
    }

    #[test]
    fn test_envelope_with_list() {
        let response = ok(vec![1, 2, 3]);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["data"], json!([1, 2, 3]));
    }
}
