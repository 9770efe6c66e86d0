//! Error types for pgrel

use thiserror::Error;

/// Result type alias for pgrel operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Name resolution failed while reaching the database (e.g. `EAI_AGAIN`).
    ///
    /// The executor retries a statement exactly once when it sees this error.
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    /// Database-reported failure, with the statement that caused it when known.
    #[error("Execution error: {message}{}", statement_suffix(.sql, .args))]
    Execution {
        /// SQLSTATE code, if the server reported one.
        code: Option<String>,
        message: String,
        sql: Option<String>,
        args: Option<String>,
    },

    /// Generated SQL and its argument list disagree.
    #[error("Malformed query: {message} (sql: {sql})")]
    MalformedQuery { message: String, sql: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation on '{}': {message}", .column.as_deref().unwrap_or("unknown"))]
    UniqueViolation {
        column: Option<String>,
        message: String,
    },

    /// NOT NULL constraint violation
    #[error("Not null violation on '{}': {message}", .column.as_deref().unwrap_or("unknown"))]
    NotNullViolation {
        column: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// ORDER BY input that cannot be rendered safely
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

fn statement_suffix(sql: &Option<String>, args: &Option<String>) -> String {
    match (sql, args) {
        (Some(sql), Some(args)) => format!(" (sql: {sql}, args: {args})"),
        (Some(sql), None) => format!(" (sql: {sql})"),
        _ => String::new(),
    }
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a database error without statement context.
    pub fn query(code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Execution {
            code: code.map(str::to_string),
            message: message.into(),
            sql: None,
            args: None,
        }
    }

    /// Create a unique violation for `column`.
    pub fn unique_violation(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UniqueViolation {
            column: Some(column.into()),
            message: message.into(),
        }
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the statement may succeed when re-issued unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientNetwork(_))
    }

    /// SQLSTATE-like code of the error, when one applies.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Execution { code, .. } => code.as_deref(),
            Self::UniqueViolation { .. } => Some("23505"),
            Self::NotNullViolation { .. } => Some("23502"),
            Self::ForeignKeyViolation(_) => Some("23503"),
            Self::CheckViolation(_) => Some("23514"),
            _ => None,
        }
    }

    /// Attach the failing statement to a database error.
    ///
    /// Only `Execution` errors carry statement context; other variants are returned as-is.
    pub fn with_statement(self, sql: &str, args: String) -> Self {
        match self {
            Self::Execution { code, message, .. } => Self::Execution {
                code,
                message,
                sql: Some(sql.to_string()),
                args: Some(args),
            },
            other => other,
        }
    }

    /// Parse a tokio_postgres error into a more specific OrmError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let message = db_err
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| db_err.message().to_string());

            return match db_err.code().code() {
                "23505" => Self::UniqueViolation {
                    column: db_err
                        .column()
                        .map(str::to_string)
                        .or_else(|| db_err.detail().and_then(key_column_from_detail)),
                    message,
                },
                "23502" => Self::NotNullViolation {
                    column: db_err.column().map(str::to_string),
                    message,
                },
                "23503" => Self::ForeignKeyViolation(format!(
                    "{}: {}",
                    db_err.constraint().unwrap_or("unknown"),
                    message
                )),
                "23514" => Self::CheckViolation(format!(
                    "{}: {}",
                    db_err.constraint().unwrap_or("unknown"),
                    message
                )),
                code => Self::query(Some(code), message),
            };
        }

        if is_name_resolution_failure(&err) {
            return Self::TransientNetwork(err.to_string());
        }
        if err.is_closed() {
            return Self::Connection(err.to_string());
        }
        Self::query(None, err.to_string())
    }
}

/// Extract the first column name from a constraint detail like
/// `Key (email)=(a@b.c) already exists.`
pub(crate) fn key_column_from_detail(detail: &str) -> Option<String> {
    let start = detail.find("Key (")? + "Key (".len();
    let end = detail[start..].find(')')? + start;
    let first = detail[start..end].split(',').next()?.trim();
    (!first.is_empty()).then(|| first.trim_matches('"').to_string())
}

/// Whether an error chain bottoms out in a temporary DNS resolution failure.
pub(crate) fn is_name_resolution_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            let msg = io.to_string().to_ascii_lowercase();
            if msg.contains("temporary failure in name resolution")
                || msg.contains("failed to lookup address")
                || msg.contains("eai_again")
            {
                return true;
            }
        }
        current = e.source();
    }
    false
}

impl From<tokio_postgres::Error> for OrmError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::from_db_error(err)
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Backend(e) => Self::from_db_error(e),
            other => {
                if is_name_resolution_failure(&other) {
                    Self::TransientNetwork(other.to_string())
                } else {
                    Self::Pool(other.to_string())
                }
            }
        }
    }
}
