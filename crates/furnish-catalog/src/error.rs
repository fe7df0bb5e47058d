//! Catalog error taxonomy.

use furnish_core::ProductId;
use furnish_storage::{ErrorCategory, ImageStoreError, StorageError};

/// Errors surfaced by the catalog service.
///
/// The HTTP layer only needs to distinguish the four [`ErrorKind`]s;
/// the variants carry enough detail for logging and messages.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Upload exceeds the configured size limit.
    #[error("file too large: {size} bytes (max {max})")]
    FileTooLarge {
        /// Declared upload size in bytes.
        size: u64,
        /// Configured maximum in bytes.
        max: u64,
    },

    /// Upload type rejected by the allow-lists.
    #[error("invalid file type: {detail}")]
    InvalidFileType {
        /// Which check failed and what was declared.
        detail: String,
    },

    /// A product field violates a domain invariant.
    #[error("invalid product field: {message}")]
    InvalidField {
        /// Description of the violation.
        message: String,
    },

    /// The product id is unknown.
    #[error("product not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: ProductId,
    },

    /// Repository failure on the primary path, surfaced as-is.
    #[error(transparent)]
    Repository(#[from] StorageError),

    /// Image store failure on the primary path, surfaced as-is.
    #[error(transparent)]
    ImageStore(#[from] ImageStoreError),
}

impl CatalogError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(id: ProductId) -> Self {
        Self::NotFound { id }
    }

    /// Creates a new `InvalidField` error.
    #[must_use]
    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self::InvalidField {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidFileType` error.
    #[must_use]
    pub fn invalid_file_type(detail: impl Into<String>) -> Self {
        Self::InvalidFileType {
            detail: detail.into(),
        }
    }

    /// Returns `true` if this is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// The coarse classification the caller reacts to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileTooLarge { .. } | Self::InvalidFileType { .. } | Self::InvalidField { .. } => {
                ErrorKind::Validation
            }
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Repository(err) => match err.category() {
                ErrorCategory::NotFound => ErrorKind::NotFound,
                ErrorCategory::Conflict => ErrorKind::Conflict,
                ErrorCategory::Infrastructure | ErrorCategory::Internal => ErrorKind::Dependency,
            },
            Self::ImageStore(_) => ErrorKind::Dependency,
        }
    }
}

/// Coarse error classification for callers (HTTP mapping, logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller can correct the input (oversized or disallowed upload,
    /// invalid field).
    Validation,
    /// Unknown id; 404-equivalent.
    NotFound,
    /// Uniqueness conflict (unused for products, kept for completeness).
    Conflict,
    /// Collaborator transport failure; not retried by the core.
    Dependency,
}
