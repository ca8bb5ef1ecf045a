use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sqlmason
#[derive(Error, Debug)]
pub enum Error {
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error("column {column} not found in {table}")]
    MissingColumn { table: String, column: String },

    #[error("cannot convert {value:?} to {target}")]
    Conversion { value: String, target: &'static str },

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("sql execution error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn missing_parameter(msg: impl Into<String>) -> Self {
        Self::MissingParameter(msg.into())
    }

    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn conversion(value: impl Into<String>, target: &'static str) -> Self {
        Self::Conversion {
            value: value.into(),
            target,
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if the error came from a value conversion
    pub fn is_conversion(&self) -> bool {
        matches!(self, Error::Conversion { .. })
    }

    /// Check if the error signals an operation the dialect does not support
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported(_))
    }

    /// Get error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MissingParameter(_) => "E_MISSING_PARAMETER",
            Error::MissingColumn { .. } => "E_MISSING_COLUMN",
            Error::Conversion { .. } => "E_CONVERSION",
            Error::Unsupported(_) => "E_UNSUPPORTED",
            Error::Sql(_) => "E_SQL",
            Error::Io(_) => "E_IO",
            Error::Config(_) => "E_CONFIG",
        }
    }
}
