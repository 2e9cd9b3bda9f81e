//! Field-level errors raised by the custom-field engine.

use serde::Serialize;

use super::data_type::DataType;

/// A recoverable custom-field error.
///
/// Every variant names the attribute code it concerns so the API can surface
/// it as a field-level message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EavError {
    #[error("Attribute code '{code}' already exists in this category")]
    DuplicateCode { code: String },

    #[error("Attribute '{code}' has type {data_type}; only choice attributes have options")]
    InvalidAttributeType { code: String, data_type: DataType },

    #[error("'{input}' is not a valid {expected} value for '{code}'")]
    TypeMismatch {
        code: String,
        expected: DataType,
        input: String,
    },

    #[error("'{input}' is not a valid date for '{code}' (expected YYYY-MM-DD)")]
    InvalidDate { code: String, input: String },

    #[error("'{input}' is not one of the options for '{code}'")]
    InvalidChoice { code: String, input: String },

    #[error("'{code}' is required")]
    RequiredFieldMissing { code: String },

    #[error("Operator '{operator}' is not supported for {data_type} attribute '{code}'")]
    UnsupportedOperator {
        code: String,
        operator: String,
        data_type: DataType,
    },

    #[error("Operator '{operator}' on '{code}' expects {expected}")]
    MalformedOperand {
        code: String,
        operator: String,
        expected: &'static str,
    },
}

impl EavError {
    /// Stable machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateCode { .. } => "DUPLICATE_CODE",
            Self::InvalidAttributeType { .. } => "INVALID_ATTRIBUTE_TYPE",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::InvalidDate { .. } => "INVALID_DATE",
            Self::InvalidChoice { .. } => "INVALID_CHOICE",
            Self::RequiredFieldMissing { .. } => "REQUIRED_FIELD_MISSING",
            Self::UnsupportedOperator { .. } => "UNSUPPORTED_OPERATOR",
            Self::MalformedOperand { .. } => "MALFORMED_OPERAND",
        }
    }

    /// The attribute code the error is about.
    pub fn field(&self) -> &str {
        match self {
            Self::DuplicateCode { code }
            | Self::InvalidAttributeType { code, .. }
            | Self::TypeMismatch { code, .. }
            | Self::InvalidDate { code, .. }
            | Self::InvalidChoice { code, .. }
            | Self::RequiredFieldMissing { code }
            | Self::UnsupportedOperator { code, .. }
            | Self::MalformedOperand { code, .. } => code,
        }
    }
}

/// A single field-level violation, as returned for batch writes and imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub code: String,
    pub message: String,
    /// 1-based data row for CSV imports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
            row: None,
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

impl From<&EavError> for FieldViolation {
    fn from(err: &EavError) -> Self {
        Self::new(err.field(), err.code(), err.to_string())
    }
}
