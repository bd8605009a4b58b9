//! API response types
//!
//! Error bodies share one envelope:
//! `{"success": false, "error": {"code": "...", "message": "..."}}`.

use serde::Serialize;

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an error response with details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        let mut response = Self::new(code, message);
        response.error.details = Some(details);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_envelope() {
        let value = serde_json::to_value(ErrorResponse::new("NOT_FOUND", "Content not found")).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": { "code": "NOT_FOUND", "message": "Content not found" }
            })
        );
    }

    #[test]
    fn test_error_details_serialized() {
        let value = serde_json::to_value(ErrorResponse::with_details(
            "LOOKUP_FAILED",
            "Sequence lookup failed",
            json!({ "hashes": 3 }),
        ))
        .unwrap();
        assert_eq!(value["error"]["details"]["hashes"], 3);
    }
}
