use thiserror::Error;

/// Convenience alias for `Result<T, KestrelError>`.
pub type KestrelResult<T> = Result<T, KestrelError>;

/// Error classification for the result-assembly pipeline.
///
/// - `Configuration`: rules and routing disagree (e.g. many shards, no merge rule)
/// - `Construction`: a strategy or decorator cannot be built for this statement
/// - `Streaming`: advancing or reading a cursor failed after assembly
/// - `InternalBug`: a caller broke a precondition; should never happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Construction,
    Streaming,
    InternalBug,
}

/// Top-level error type that all crate-specific errors convert into.
#[derive(Error, Debug)]
pub enum KestrelError {
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Always carries a unique `error_code` and `debug_context` for post-mortem.
    #[error("InternalBug [{error_code}]: {message} | context: {debug_context}")]
    InternalBug {
        error_code: &'static str,
        message: String,
        debug_context: String,
    },
}

/// Errors raised while assembling the result pipeline.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("{shard_count} shard results but no merge-capable rule is registered")]
    NoMergeRule { shard_count: usize },

    #[error("Multiple merge-capable rules registered: {}", rules.join(", "))]
    MultipleMergeRules { rules: Vec<String> },

    #[error("{shard_count} shard results exceed the limit of {limit}")]
    TooManyShards { shard_count: usize, limit: usize },

    #[error("Rule already registered: {0}")]
    DuplicateRule(String),

    #[error("Unsupported statement for merge: {0}")]
    UnsupportedStatement(String),

    #[error("Column index {index} out of bounds ({column_count} columns)")]
    ColumnOutOfBounds { index: usize, column_count: usize },

    #[error("Failed to decrypt column {column}: {reason}")]
    Decrypt { column: String, reason: String },
}

/// Errors raised while advancing or reading a cursor.
#[derive(Error, Debug)]
pub enum CursorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("No current row: next() has not returned true")]
    NoCurrentRow,

    #[error("Column index {index} out of bounds ({column_count} columns)")]
    ColumnOutOfBounds { index: usize, column_count: usize },
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KestrelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KestrelError::Merge(
                MergeError::NoMergeRule { .. }
                | MergeError::MultipleMergeRules { .. }
                | MergeError::TooManyShards { .. }
                | MergeError::DuplicateRule(_),
            ) => ErrorKind::Configuration,
            KestrelError::Merge(MergeError::Decrypt { .. }) => ErrorKind::Streaming,
            KestrelError::Merge(_) => ErrorKind::Construction,
            KestrelError::Cursor(_) => ErrorKind::Streaming,
            KestrelError::Config(_) => ErrorKind::Configuration,
            KestrelError::Internal(_) | KestrelError::InternalBug { .. } => ErrorKind::InternalBug,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    pub fn is_streaming_error(&self) -> bool {
        self.kind() == ErrorKind::Streaming
    }

    pub fn is_internal_bug(&self) -> bool {
        self.kind() == ErrorKind::InternalBug
    }

    /// Map to PostgreSQL SQLSTATE code.
    pub fn pg_sqlstate(&self) -> &'static str {
        match self {
            KestrelError::Merge(MergeError::UnsupportedStatement(_)) => "0A000", // feature_not_supported
            KestrelError::Merge(MergeError::ColumnOutOfBounds { .. }) => "42P10", // invalid_column_reference
            KestrelError::Merge(MergeError::Decrypt { .. }) => "22000",          // data_exception
            KestrelError::Merge(_) => "F0000",                                   // config_file_error
            KestrelError::Config(_) => "F0000",
            KestrelError::Cursor(CursorError::Io(_)) => "08006", // connection_failure
            KestrelError::Cursor(CursorError::Protocol(_)) => "08P01", // protocol_violation
            KestrelError::Cursor(CursorError::ColumnOutOfBounds { .. }) => "42P10",
            KestrelError::Cursor(CursorError::NoCurrentRow) => "24000", // invalid_cursor_state
            KestrelError::Internal(_) | KestrelError::InternalBug { .. } => "XX000",
        }
    }

    /// Construct an internal bug error with error code and context.
    pub fn internal_bug(
        error_code: &'static str,
        message: impl Into<String>,
        debug_context: impl Into<String>,
    ) -> Self {
        KestrelError::InternalBug {
            error_code,
            message: message.into(),
            debug_context: debug_context.into(),
        }
    }

    /// Emit a structured log entry for `InternalBug` errors.
    pub fn log_if_fatal(&self) {
        if let KestrelError::InternalBug {
            error_code,
            message,
            debug_context,
        } = self
        {
            tracing::error!(
                error_code = error_code,
                error_category = "Fatal",
                sqlstate = self.pg_sqlstate(),
                debug_context = debug_context.as_str(),
                "FATAL [{}]: {} | context: {}",
                error_code,
                message,
                debug_context
            );
        }
    }
}
