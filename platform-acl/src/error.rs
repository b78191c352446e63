//! Error types for ACL operations
//!
//! This module defines all error types that can occur during role and
//! resource management, rule management, and identity binding. Failures
//! are synchronous and never leave the engine in a half-updated state.

use platform_hierarchy::HierarchyError;
use thiserror::Error;

/// ACL error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AclError {
    /// A hierarchy operation failed (duplicate item, unknown item or
    /// unknown parent in either the role or the resource registry)
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// A role argument is not a usable identifier
    #[error("expects role to be a non-empty identifier, got \"{0}\"")]
    InvalidRoleIdentifier(String),

    /// A resource argument is not a usable identifier
    #[error("expects resource to be a non-empty identifier, got \"{0}\"")]
    InvalidResourceIdentifier(String),

    /// `can` was called with no identity bound
    #[error("User identity is null")]
    NoIdentity,
}

/// Result type for ACL operations.
pub type AclResult<T> = Result<T, AclError>;
