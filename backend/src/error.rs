//! Error handling for the shop ledger
//!
//! Provides consistent error details in English and Vietnamese

use serde::Serialize;
use shared::money::MoneyError;
use shared::FieldError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_vi: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(
        field: impl Into<String>,
        message: impl Into<String>,
        message_vi: impl Into<String>,
    ) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
            message_vi: message_vi.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Presentation-ready description of the error
    pub fn detail(&self) -> ErrorDetail {
        match self {
            AppError::Validation { field, message, message_vi } => ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message_en: message.clone(),
                message_vi: message_vi.clone(),
                field: Some(field.clone()),
            },
            AppError::NotFound(resource) => ErrorDetail {
                code: "NOT_FOUND".to_string(),
                message_en: format!("{} not found", resource),
                message_vi: format!("Không tìm thấy {}", resource),
                field: None,
            },
            AppError::Storage(msg) => ErrorDetail {
                code: "STORAGE_ERROR".to_string(),
                message_en: format!("Storage error: {}", msg),
                message_vi: format!("Lỗi lưu trữ dữ liệu: {}", msg),
                field: None,
            },
            AppError::Serialization(_) => ErrorDetail {
                code: "SERIALIZATION_ERROR".to_string(),
                message_en: "Stored data could not be read or written".to_string(),
                message_vi: "Không thể đọc hoặc ghi dữ liệu đã lưu".to_string(),
                field: None,
            },
            AppError::Csv(_) => ErrorDetail {
                code: "CSV_ERROR".to_string(),
                message_en: "Spreadsheet data could not be processed".to_string(),
                message_vi: "Không thể xử lý dữ liệu bảng tính".to_string(),
                field: None,
            },
            AppError::Configuration(msg) => ErrorDetail {
                code: "CONFIGURATION_ERROR".to_string(),
                message_en: format!("Configuration error: {}", msg),
                message_vi: format!("Lỗi cấu hình: {}", msg),
                field: None,
            },
            AppError::Internal(_) => ErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message_en: "An internal error occurred".to_string(),
                message_vi: "Đã xảy ra lỗi nội bộ".to_string(),
                field: None,
            },
        }
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Validation {
            field: err.field,
            message: err.message.to_string(),
            message_vi: err.message_vi.to_string(),
        }
    }
}

impl From<MoneyError> for AppError {
    fn from(err: MoneyError) -> Self {
        AppError::Validation {
            field: "total_amount".to_string(),
            message: err.to_string(),
            message_vi: "Số tiền vượt quá giới hạn cho phép".to_string(),
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_vi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse { error: err.detail() }
    }
}

/// Result type alias for ledger operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_maps_to_validation() {
        let err: AppError =
            FieldError::new("customer.phone", "Value is required", "Vui lòng nhập số điện thoại")
                .into();
        let detail = err.detail();

        assert!(err.is_validation());
        assert_eq!(detail.code, "VALIDATION_ERROR");
        assert_eq!(detail.field.as_deref(), Some("customer.phone"));
        assert_eq!(detail.message_vi, "Vui lòng nhập số điện thoại");
    }

    #[test]
    fn test_not_found_detail() {
        let err = AppError::NotFound("Order".to_string());
        let json = serde_json::to_value(ErrorResponse::from(&err)).unwrap();

        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message_en"], "Order not found");
        assert!(json["error"].get("field").is_none());
    }
}
