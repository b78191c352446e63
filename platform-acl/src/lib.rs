//! # Platform ACL
//!
//! Role/resource-based access-control decisions for the Relay platform:
//! given a role, a resource, and an optional privilege, answer ALLOW or
//! DENY, honoring multi-parent inheritance of both roles and resources
//! and optional dynamic assertions.
//!
//! ## Overview
//!
//! The platform-acl crate handles:
//! - **Role and resource hierarchies**: two independent
//!   `platform_hierarchy` registries with multi-parent inheritance
//! - **Rules**: ALLOW/DENY decisions on exact
//!   (role, resource, privilege) keys, each position wildcardable
//! - **Resolution**: a most-specific-first walk over both hierarchies
//!   with default deny
//! - **Identity binding**: a synthetic role representing "the current
//!   identity" so callers can ask `can(resource, privilege)` without
//!   re-specifying roles
//!
//! ## Architecture
//!
//! ```text
//! Rule = (role | *, resource | *, privilege | all) -> ALLOW | DENY [+ assertion]
//!
//! is_allowed(admin, Post, "edit"):
//!   for resource in [Post, ..ancestors.., *]:      # most specific first
//!     for role in [admin, ..ancestors.., *]:
//!       privilege-specific rule, then all-privileges rule
//!       first rule whose assertion passes decides
//!   -> no match: DENY
//! ```
//!
//! An assertion is a predicate attached to a rule; it receives the
//! original query arguments (not the resolved ids) and can veto the rule
//! at evaluation time, in which case resolution continues as if the rule
//! were absent.
//!
//! ## Usage
//!
//! ```rust
//! use platform_acl::Acl;
//!
//! let mut acl = Acl::new();
//! acl.add_role("user", &[])?
//!     .add_role("admin", &["user"])?
//!     .add_resource("Post", &[])?
//!     .add_resource("Draft", &["Post"])?;
//!
//! acl.allow("user", "Post", "view", None)?;
//! acl.deny("admin", "Draft", "view", None)?;
//!
//! assert!(acl.is_allowed(Some("user"), Some("Draft"), Some("view")));
//! assert!(!acl.is_allowed(Some("admin"), Some("Draft"), Some("view")));
//! # Ok::<(), platform_acl::AclError>(())
//! ```
//!
//! ## Concurrency
//!
//! Every operation is synchronous and runs to completion; the engine
//! assumes exclusive access during any call. When embedding in a
//! multi-threaded host, wrap the `Acl` instance in a single coarse lock.
//!
//! ## Integration with platform-hierarchy
//!
//! The role and resource hierarchies are `platform_hierarchy`
//! registries; this crate layers rule storage and the resolution walk on
//! top of their ancestry queries.

pub mod acl;
pub mod error;
pub mod rules;
pub mod types;

// Re-export main types for convenience
pub use acl::Acl;
pub use error::{AclError, AclResult};
pub use rules::{Assertion, AssertionContext, Rule, RuleStore, RuleType};
pub use types::{
    AclResource, AclRole, PrivilegeSpec, ResourceHandle, ResourceSpec, RoleHandle, RoleSpec,
    UserIdentity, USER_IDENTITY_ROLE,
};
