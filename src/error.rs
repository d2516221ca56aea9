use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No champion data found. One of these is required:\n{}", .required.join("\n"))]
    MissingData { required: Vec<String> },

    #[error("Master table {file} is unusable: {reason}")]
    InvalidMaster { file: String, reason: String },

    #[error("CSV error in {file}: {message}")]
    Csv { file: String, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Champion not found: {0}")]
    UnknownChampion(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Table {0} is not loaded")]
    TableNotLoaded(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("JSON error: {0}")]
    JsonError(String),
}

/// An optional column was absent, so the section that needs it is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumnWarning {
    pub table: String,
    pub column: String,
}

impl MissingColumnWarning {
    pub fn new(table: &str, column: &str) -> Self {
        MissingColumnWarning {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    /// Emits the warning to the diagnostic log and returns it for display.
    pub fn log(self) -> Self {
        tracing::warn!(table = %self.table, column = %self.column, "optional column missing");
        self
    }
}

impl fmt::Display for MissingColumnWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: column '{}' not present, section skipped", self.table, self.column)
    }
}
