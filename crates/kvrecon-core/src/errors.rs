use crate::kv::StoreError;
use kvrecon_core_types::RequestId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReconcileError>;

// ========== Error Facility ==========

/// Stable classification of a reconciliation failure
///
/// The `ERR_*` code of each kind appears as `err_code` in `end_error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration
    InvalidConfig,

    // Document input
    UnsupportedFormat,
    Parse,

    // Store collaborator
    Store,

    // Changeset integrity
    UnknownChange,

    // Output
    Serialization,
}

impl ExErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::UnsupportedFormat => "ERR_UNSUPPORTED_FORMAT",
            ExErrorKind::Parse => "ERR_PARSE",
            ExErrorKind::Store => "ERR_STORE",
            ExErrorKind::UnknownChange => "ERR_UNKNOWN_CHANGE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Loggable view of a failure: its stable kind plus optional context
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    key: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            key: None,
            request_id: None,
            message: String::new(),
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add store key context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Tie the error to one reconciler call
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for reconciliation operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    /// A required connection parameter is missing or malformed
    #[error("Invalid store configuration: {reason}")]
    Config { reason: String },

    /// The format tag is not one of the accepted encodings
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Document bytes are not well-formed for the declared format
    #[error("Failed to parse {format} document: {message}")]
    Parse { format: String, message: String },

    /// List/Put/Delete failure reported by the store, passed through unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A change tag outside add/update/remove reached the changeset boundary
    #[error("Invalid change type: {action}")]
    UnknownChange { action: String },

    /// Exporting a document or a changeset plan failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<ReconcileError> for ExError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Config { reason } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("store_config")
                .with_message(reason),

            ReconcileError::UnsupportedFormat { format } => {
                ExError::new(ExErrorKind::UnsupportedFormat)
                    .with_message(format!("Unsupported format: {}", format))
            }

            ReconcileError::Parse { format, message } => ExError::new(ExErrorKind::Parse)
                .with_op("flatten")
                .with_message(format!("{} document: {}", format, message)),

            ReconcileError::Store(store_err) => ExError::new(ExErrorKind::Store)
                .with_message(store_err.message().to_string()),

            ReconcileError::UnknownChange { action } => ExError::new(ExErrorKind::UnknownChange)
                .with_message(format!("Invalid change type: {}", action)),

            ReconcileError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}
