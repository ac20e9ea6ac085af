//! Error type shared by every model operation.
//!
//! Tokenizing and sanitizing never fail; everything else reports one of the
//! variants below and leaves its input untouched.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// The uploaded table had no parseable rows.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Publishing was refused because these variable ids have no column.
    #[error("Please map all variables: {}", format_unmapped(.0))]
    UnmappedVariables(Vec<String>),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Publish session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid config for {block_type}: {reason}")]
    InvalidConfig { block_type: String, reason: String },

    #[error("Invalid reorder: {0}")]
    InvalidReorder(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Variable is not used by the template: {0}")]
    UnknownVariable(String),

    #[error("Variable already exists: {0}")]
    DuplicateVariable(String),

    #[error("Cannot {action} while in the {step} step")]
    InvalidTransition { action: String, step: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn format_unmapped(ids: &[String]) -> String {
    ids.iter()
        .map(|id| crate::model::variable::format_variable(id))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ReportError>;
