//! Unified error types for the EIP-712 struct engine
//!
//! Every fallible operation returns [`Eip712Result`]. Each error also maps to
//! a coarse, serializable [`ErrorCode`] so callers can categorize failures
//! without matching on every variant.

use serde::{Deserialize, Serialize};

/// Errors that can occur while defining, resolving or encoding struct types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Eip712Error {
    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Duplicate field '{field}' in struct {struct_name}")]
    DuplicateField { struct_name: String, field: String },

    #[error("Field '{field}' is not declared on struct {struct_name}")]
    FieldNotDeclared { struct_name: String, field: String },

    #[error("Struct {0} was declared but never defined")]
    UndefinedStruct(String),

    #[error("Struct {0} is already defined")]
    AlreadyDefined(String),

    #[error("Cyclic struct reference: {path}")]
    CyclicSchema { path: String },

    #[error("Struct reference depth exceeds {limit} at {struct_name}")]
    SchemaTooDeep { struct_name: String, limit: usize },

    #[error("Invalid value for type {type_name}: {value}")]
    InvalidValue { type_name: String, value: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Eip712Error {
    pub(crate) fn invalid_value(type_name: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidValue {
            type_name: type_name.into(),
            value: value.to_string(),
        }
    }

    /// Category of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Eip712Error::InvalidType(_)
            | Eip712Error::DuplicateField { .. }
            | Eip712Error::UndefinedStruct(_)
            | Eip712Error::AlreadyDefined(_) => ErrorCode::SchemaError,
            Eip712Error::CyclicSchema { .. } | Eip712Error::SchemaTooDeep { .. } => {
                ErrorCode::ResolutionError
            }
            Eip712Error::FieldNotDeclared { .. } => ErrorCode::InvalidInput,
            Eip712Error::InvalidValue { .. } | Eip712Error::InvalidAddress(_) => {
                ErrorCode::InvalidValue
            }
            Eip712Error::EncodingError(_) => ErrorCode::EncodingError,
            Eip712Error::InvalidConfig(_) => ErrorCode::ConfigError,
        }
    }
}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Schema definition errors
    SchemaError,
    ResolutionError,

    // Input errors
    InvalidInput,
    InvalidValue,

    // Encoding
    EncodingError,

    // Configuration
    ConfigError,
}

/// Result type alias for EIP-712 operations
pub type Eip712Result<T> = Result<T, Eip712Error>;
