use serde::{Deserialize, Serialize};

/// The one response shape every endpoint returns.
///
/// Success: `{ "success": true, "data": ..., "message"?: ... }`.
/// Failure: `{ "success": false, "message": ... }` with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Payload of a successful response; the message of a failed one
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .message
                .unwrap_or_else(|| "request failed".to_string()))
        }
    }
}

impl ApiResponse<()> {
    /// Successful response without a payload (deletes, acknowledgements)
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let body = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(body, json!({ "success": true, "data": [1, 2] }));
    }

    #[test]
    fn test_error_shape() {
        let body = serde_json::to_value(ApiResponse::error("Property not found: 9")).unwrap();
        assert_eq!(body, json!({ "success": false, "message": "Property not found: 9" }));
    }

    #[test]
    fn test_into_result() {
        let failed: ApiResponse<u32> =
            serde_json::from_value(json!({ "success": false, "message": "nope" })).unwrap();
        assert_eq!(failed.into_result(), Err("nope".to_string()));

        let ok: ApiResponse<u32> = serde_json::from_value(json!({ "success": true, "data": 3 })).unwrap();
        assert_eq!(ok.into_result(), Ok(Some(3)));
    }
}
