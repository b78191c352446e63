//! Error types for hierarchy registry operations

use thiserror::Error;

/// Hierarchy registry error types.
///
/// All failures are synchronous and leave the registry unmodified:
/// a failed operation never results in a half-updated entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// An item with this id is already registered
    #[error("Item \"{0}\" already exists in the registry")]
    DuplicateItem(String),

    /// The referenced item is not registered
    #[error("Item \"{0}\" not exists in the registry")]
    UnknownItem(String),

    /// A parent listed during registration is not itself registered
    #[error("Parent \"{parent}\" for \"{item}\" not exists in the registry")]
    UnknownParent {
        /// The parent id that is missing
        parent: String,
        /// The item being registered
        item: String,
    },
}

/// Result type for hierarchy registry operations.
pub type HierarchyResult<T> = Result<T, HierarchyError>;
