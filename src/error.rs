// src/error.rs

use thiserror::Error;

/// One problem found while validating an input row.
///
/// `row` is the zero-based position of the record in the collection handed to
/// the engine (or the data row of a CSV file, header excluded).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}{}: field `{field}` {reason}", identity(.store_id, .product_id))]
pub struct FieldIssue {
    pub row: usize,
    pub store_id: Option<String>,
    pub product_id: Option<String>,
    pub field: &'static str,
    pub reason: String,
}

fn identity(store_id: &Option<String>, product_id: &Option<String>) -> String {
    match (store_id, product_id) {
        (Some(s), Some(p)) => format!(" (store {s}, product {p})"),
        (Some(s), None) => format!(" (store {s})"),
        (None, Some(p)) => format!(" (product {p})"),
        (None, None) => String::new(),
    }
}

impl FieldIssue {
    pub fn new(row: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            row,
            store_id: None,
            product_id: None,
            field,
            reason: reason.into(),
        }
    }

    pub fn with_identity(mut self, store_id: Option<&str>, product_id: Option<&str>) -> Self {
        self.store_id = store_id.map(str::to_owned);
        self.product_id = product_id.map(str::to_owned);
        self
    }
}

/// Every field problem found in a single validation pass.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} invalid field(s){}", .issues.len(), render(.issues))]
pub struct ConfigurationError {
    pub issues: Vec<FieldIssue>,
}

fn render(issues: &[FieldIssue]) -> String {
    issues.iter().map(|issue| format!("; {issue}")).collect()
}

impl ConfigurationError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }
}

#[derive(Debug, Error)]
pub enum ReplenishmentError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("invalid run parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReplenishmentError {
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReplenishmentError>;
