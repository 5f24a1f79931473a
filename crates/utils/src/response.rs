use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Envelope wrapping every backend response body
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Unwrap the envelope. A successful response without data is an error
    /// unless `T` can represent absence (see [`ApiResponse::into_optional`]).
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(self
                .message
                .unwrap_or_else(|| "response contained no data".to_string())),
            (false, _) => Err(self
                .message
                .unwrap_or_else(|| "request was rejected".to_string())),
        }
    }

    pub fn into_optional(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .message
                .unwrap_or_else(|| "request was rejected".to_string()))
        }
    }
}
