/*!
 * Error handling for provider table loading, filtering, and export
 *
 * Provides detailed error types with context and suggestions. Only two
 * classes of failure stop a render: the upload cannot be read, or no
 * specialty was selected. Everything else degrades to empty output.
 */

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use serde::{Serialize, Deserialize};

/// Library result type
pub type Result<T> = std::result::Result<T, FinderError>;

/// Error types with context and suggestions
#[derive(Error, Debug)]
pub enum FinderError {
    /// File I/O errors with context
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
        context: ErrorContext,
    },

    /// CSV parsing errors with location information
    #[error("CSV parsing error at line {line:?}: {message}")]
    CsvParse {
        message: String,
        line: Option<usize>,
        context: ErrorContext,
    },

    /// Workbook (xlsx/xls/ods) errors
    #[error("Spreadsheet error: {message}")]
    Spreadsheet {
        message: String,
        context: ErrorContext,
    },

    /// Required columns absent from the upload
    #[error("Schema mismatch: missing required column(s): {}", missing_columns.join(", "))]
    SchemaMismatch {
        missing_columns: Vec<String>,
        found_columns: Vec<String>,
    },

    /// A cell value that cannot be used
    #[error("Invalid value '{value}' in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        column: String,
        value: String,
        row: usize,
        reason: String,
    },

    /// File not found with suggestions
    #[error("File not found: {path}")]
    FileNotFound {
        path: PathBuf,
        suggestion: String,
    },

    /// Input extension we cannot read
    #[error("Unsupported input format: {extension}")]
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },

    /// No specialty chosen; processing halts before aggregation
    #[error("No {field} selected")]
    MissingSelection {
        field: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        suggestion: Option<String>,
    },

    /// Export errors
    #[error("Export error: {message}")]
    Export {
        message: String,
        format: ExportFormat,
        suggestion: Option<String>,
    },

    /// Generic errors with custom message
    #[error("{message}")]
    Custom {
        message: String,
        suggestion: Option<String>,
    },
}

/// Error context providing additional information
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
    pub line_number: Option<usize>,
    pub column_name: Option<String>,
}

/// Export format for error context and file naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
    Html,
    Json,
}

impl ExportFormat {
    /// All formats, in the order the CLI writes them for `--format all`
    pub fn all() -> [ExportFormat; 4] {
        [ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Html, ExportFormat::Json]
    }

    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    /// MIME type handed to whoever serves the file
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ExportFormat::Html => "text/html",
            ExportFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "CSV"),
            ExportFormat::Excel => write!(f, "Excel"),
            ExportFormat::Html => write!(f, "HTML"),
            ExportFormat::Json => write!(f, "JSON"),
        }
    }
}

impl FinderError {
    /// Create a file not found error with helpful suggestion
    pub fn file_not_found_with_suggestion(path: PathBuf) -> Self {
        let suggestion = format!(
            "Check if the file exists at '{}'. Expected an Excel workbook (.xlsx) or CSV file \
            with the columns {}.",
            path.display(),
            crate::schema::ProviderSchema::column_names().join(", ")
        );

        Self::FileNotFound { path, suggestion }
    }

    /// Create an unsupported format error listing readable extensions
    pub fn unsupported_format(extension: &str) -> Self {
        Self::UnsupportedFormat {
            extension: extension.to_string(),
            supported: crate::reader::SUPPORTED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Create a schema mismatch error from the header row that was found
    pub fn missing_columns(missing: Vec<String>, found: &[String]) -> Self {
        Self::SchemaMismatch {
            missing_columns: missing,
            found_columns: found.to_vec(),
        }
    }

    /// Create the "please select a specialty" error
    pub fn missing_specialty() -> Self {
        Self::MissingSelection {
            field: "specialty".to_string(),
        }
    }

    /// Whether this error came from reading the upload
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::Io { .. }
                | Self::CsvParse { .. }
                | Self::Spreadsheet { .. }
                | Self::SchemaMismatch { .. }
                | Self::InvalidValue { .. }
                | Self::FileNotFound { .. }
                | Self::UnsupportedFormat { .. }
        )
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::FileNotFound { suggestion, .. } => {
                format!("{}\n\nSuggestion: {}", self, suggestion)
            }
            Self::SchemaMismatch { found_columns, .. } => {
                format!(
                    "Error processing data: {}\n\nColumns found: {}",
                    self,
                    found_columns.join(", ")
                )
            }
            Self::UnsupportedFormat { supported, .. } => {
                format!("{}\n\nSupported formats: {}", self, supported.join(", "))
            }
            Self::MissingSelection { .. } => {
                "Please select a specialty to continue.".to_string()
            }
            Self::Configuration { suggestion: Some(sug), .. }
            | Self::Export { suggestion: Some(sug), .. }
            | Self::Custom { suggestion: Some(sug), .. } => {
                format!("{}\n\nSuggestion: {}", self, sug)
            }
            _ if self.is_load_failure() => format!("Error processing data: {}", self),
            _ => self.to_string(),
        }
    }
}

// Convenience conversions
impl From<std::io::Error> for FinderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
            context: ErrorContext::default(),
        }
    }
}

impl From<csv::Error> for FinderError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|pos| pos.line() as usize);

        Self::CsvParse {
            message: err.to_string(),
            line,
            context: ErrorContext::default(),
        }
    }
}

impl From<calamine::Error> for FinderError {
    fn from(err: calamine::Error) -> Self {
        Self::Spreadsheet {
            message: err.to_string(),
            context: ErrorContext::default(),
        }
    }
}

impl From<zip::result::ZipError> for FinderError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Export {
            message: err.to_string(),
            format: ExportFormat::Excel,
            suggestion: Some("Check that the output directory is writable.".to_string()),
        }
    }
}

impl From<serde_json::Error> for FinderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Export {
            message: err.to_string(),
            format: ExportFormat::Json,
            suggestion: Some("Check if the data is serializable to JSON.".to_string()),
        }
    }
}
