use thiserror::Error;

/// Result type alias using the canonical error facility
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and CLI exit reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input / configuration
    InvalidInput,
    InvalidConfig,

    // Snapshot integrity
    /// The same global image id appears twice in one snapshot
    DuplicateImageId,

    // Structural (fatal)
    /// A configured report column is not present on a merged table
    MissingReportColumn,
    /// A configured sort column is not present on the assembled report
    MissingSortColumn,

    // Structural (recoverable per diff column)
    /// A value does not fit the declared kind of its diff column
    ColumnTypeMismatch,
    /// A diff column is not present on the merged image table
    MissingColumn,

    // Integration/IO
    NotFound,
    Io,
    Archive,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::DuplicateImageId => "ERR_DUPLICATE_IMAGE_ID",
            ExErrorKind::MissingReportColumn => "ERR_MISSING_REPORT_COLUMN",
            ExErrorKind::MissingSortColumn => "ERR_MISSING_SORT_COLUMN",
            ExErrorKind::ColumnTypeMismatch => "ERR_COLUMN_TYPE_MISMATCH",
            ExErrorKind::MissingColumn => "ERR_MISSING_COLUMN",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Archive => "ERR_ARCHIVE",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a failure of this kind only invalidates the diff column it
    /// occurred in, leaving the rest of the comparison intact.
    pub fn is_column_local(&self) -> bool {
        matches!(
            self,
            ExErrorKind::ColumnTypeMismatch | ExErrorKind::MissingColumn
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context (operation, image id,
/// attribute) for programmatic handling and debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    attribute: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            attribute: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (image id, catalog path)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add attribute context
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
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

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the attribute context, if any
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Get the error message
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
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(attribute) = &self.attribute {
            write!(f, " (attribute: {})", attribute)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain failures raised by the comparison engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogDiffError {
    /// The identity invariant of a snapshot is violated
    #[error("Duplicate image id {image_id} in snapshot {snapshot}")]
    DuplicateImageId { snapshot: String, image_id: String },

    /// A report column was not denormalized onto a merged table
    #[error("Report column {column} is missing from the merged {table} table")]
    MissingReportColumn { table: String, column: String },

    /// A sort column is not part of the assembled report
    #[error("Sort column {column} is not part of the report columns {available:?}")]
    MissingSortColumn {
        column: String,
        available: Vec<String>,
    },

    /// A diff column is not present on the merged image table
    #[error("Diff column {column} is missing from the merged image table")]
    MissingColumn { column: String },

    /// A value cannot be interpreted as the declared column kind
    #[error("Column {column} declared {expected} but image {image_id} holds {found}")]
    ColumnTypeMismatch {
        column: String,
        expected: String,
        found: String,
        image_id: String,
    },

    /// Config violates one of its invariants
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// A chain comparison needs at least two snapshots
    #[error("At least two snapshots are required, got {count}")]
    TooFewSnapshots { count: usize },
}

impl From<CatalogDiffError> for ExError {
    fn from(err: CatalogDiffError) -> Self {
        let message = err.to_string();
        match err {
            CatalogDiffError::DuplicateImageId { snapshot, image_id } => {
                ExError::new(ExErrorKind::DuplicateImageId)
                    .with_op("snapshot_build")
                    .with_entity_id(image_id)
                    .with_message(format!("duplicate image id in snapshot {}", snapshot))
            }

            CatalogDiffError::MissingReportColumn { column, .. } => {
                ExError::new(ExErrorKind::MissingReportColumn)
                    .with_attribute(column)
                    .with_message(message)
            }

            CatalogDiffError::MissingSortColumn { column, .. } => {
                ExError::new(ExErrorKind::MissingSortColumn)
                    .with_op("assemble_report")
                    .with_attribute(column)
                    .with_message(message)
            }

            CatalogDiffError::MissingColumn { column } => ExError::new(ExErrorKind::MissingColumn)
                .with_op("diff_column")
                .with_attribute(column)
                .with_message(message),

            CatalogDiffError::ColumnTypeMismatch {
                column, image_id, ..
            } => ExError::new(ExErrorKind::ColumnTypeMismatch)
                .with_op("diff_column")
                .with_attribute(column)
                .with_entity_id(image_id)
                .with_message(message),

            CatalogDiffError::InvalidConfig { .. } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("config_validate")
                .with_message(message),

            CatalogDiffError::TooFewSnapshots { .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("compare_sequence")
                .with_message(message),
        }
    }
}
