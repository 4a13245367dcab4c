use crate::resource::FieldUse;
use crate::store::StoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown {usage} field: {field}")]
    UnknownField { field: String, usage: FieldUse },

    #[error("invalid number for field {field}: {value}")]
    InvalidNumber { field: String, value: String },

    #[error("invalid date for field {field}: {value} (expected DD.MM.YYYY)")]
    InvalidDate { field: String, value: String },

    #[error("malformed filter value for field {field}: {value}")]
    MalformedFilterValue { field: String, value: String },

    #[error("invalid range bound for field {field}: {value}")]
    InvalidRangeBound { field: String, value: String },

    #[error("invalid pagination parameter {param}: {value}")]
    InvalidPagination { param: &'static str, value: String },

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("unknown api version: {0}")]
    UnknownVersion(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl ApiError {
    /// Stable machine-readable kind tag for the client error payload.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownField { .. } => "UnknownField",
            Self::InvalidNumber { .. } => "InvalidNumber",
            Self::InvalidDate { .. } => "InvalidDate",
            Self::MalformedFilterValue { .. } => "MalformedFilterValue",
            Self::InvalidRangeBound { .. } => "InvalidRangeBound",
            Self::InvalidPagination { .. } => "InvalidPagination",
            Self::UnknownResource(_) => "UnknownResource",
            Self::UnknownVersion(_) => "UnknownVersion",
            Self::Config(_) => "Config",
            Self::Storage(_) => "StorageFailure",
        }
    }

    /// The field the error is attached to, when there is one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownField { field, .. }
            | Self::InvalidNumber { field, .. }
            | Self::InvalidDate { field, .. }
            | Self::MalformedFilterValue { field, .. }
            | Self::InvalidRangeBound { field, .. } => Some(field.as_str()),
            Self::InvalidPagination { param, .. } => Some(param),
            _ => None,
        }
    }

    /// Validation failures are client errors; everything else is internal.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Storage(_) | Self::Config(_) => 500,
            _ => 400,
        }
    }

    /// Structured `{kind, field?, message}` payload for the transport layer.
    /// Internal failures get a generic message so backend detail never leaks.
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        let message = if self.status_code() >= 500 {
            "internal error".to_string()
        } else {
            self.to_string()
        };
        match self.field() {
            Some(f) => json!({ "kind": self.kind(), "field": f, "message": message }),
            None => json!({ "kind": self.kind(), "message": message }),
        }
    }
}
