use progmerge_core_types::RequestId;
use thiserror::Error;

/// Result type alias using MergeError
pub type Result<T> = std::result::Result<T, MergeError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers and tests can match on
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Merge phase
    /// No import sources were supplied to the merge
    ImportDataEmpty,
    InvalidInput,
    NotFound,

    // Persistence phase
    /// A create/update/delete call against the persistence collaborator failed
    Persistence,
    /// The read collaborator or transport failed
    ExternalService,
    Serialization,
    Concurrency,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::ImportDataEmpty => "ERR_IMPORT_DATA_EMPTY",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling plus enough
/// context (operation, entity kind, entity id) to explain which call failed.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_kind: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_kind: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity kind context (e.g. "ContentGroup")
    pub fn with_entity_kind(mut self, kind: impl Into<String>) -> Self {
        self.entity_kind = Some(kind.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Tag the error with the save or merge invocation that raised it
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_kind(&self) -> Option<&str> {
        self.entity_kind.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
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
        if let Some(kind) = &self.entity_kind {
            write!(f, " (entity_kind: {})", kind)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Errors raised while merging import sources into a snapshot
///
/// Match ambiguity and field conflicts are not errors: both are resolved
/// deterministically and recorded as change summaries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MergeError {
    /// No import sources were supplied
    #[error("No import data supplied: at least one import source is required")]
    ImportDataEmpty,

    /// A descriptor could not be merged (e.g. a snapshot map key disagrees with the entity id)
    #[error("Invalid descriptor at {location}: {reason}")]
    InvalidDescriptor { location: String, reason: String },

    /// Serialization failure while recording change data
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<MergeError> for ExError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::ImportDataEmpty => ExError::new(ExErrorKind::ImportDataEmpty)
                .with_op("merge_import")
                .with_message("No import data supplied"),

            MergeError::InvalidDescriptor { location, reason } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_entity_kind(location)
                    .with_message(format!("Invalid descriptor: {}", reason))
            }

            MergeError::Serialization { message } => ExError::new(ExErrorKind::Serialization)
                .with_message(format!("Serialization error: {}", message)),
        }
    }
}

impl From<serde_json::Error> for MergeError {
    fn from(err: serde_json::Error) -> Self {
        MergeError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        MergeError::from(err).into()
    }
}
