//! # Platform Hierarchy
//!
//! A generic registry of named items with multi-parent inheritance,
//! shared across the Relay platform access-control crates.
//!
//! ## Overview
//!
//! The platform-hierarchy crate handles:
//! - **Registration**: items with zero or more pre-existing parents
//! - **Inheritance queries**: direct and transitive ancestry checks
//! - **Removal**: single items with orphan-cascade, or the whole registry
//! - **Inspection**: ordered enumeration and deep snapshots
//!
//! ## Architecture
//!
//! ```text
//! Item = { id, parents (ordered), children }
//!
//! guest <- member <- editor        inherits(editor, guest) == true
//! parent1, parent2 <- child        parents(child) == [parent1, parent2]
//! ```
//!
//! The registry is an arena keyed by identifier: relatives are referenced
//! by id, never by pointer, so removal and cascade logic are plain map and
//! vector operations. Parents must exist before they can be referenced,
//! which makes the structure a DAG by construction.
//!
//! ## Usage
//!
//! ```rust
//! use platform_hierarchy::HierarchyRegistry;
//!
//! let mut roles: HierarchyRegistry<String> = HierarchyRegistry::new();
//! roles
//!     .add("guest".to_string(), &[])?
//!     .add("staff".to_string(), &["guest".to_string()])?;
//!
//! assert!(roles.has(&"staff".to_string()));
//! assert!(roles.inherits(&"staff".to_string(), &"guest".to_string(), false)?);
//! assert_eq!(roles.ids(), vec!["guest", "staff"]);
//! # Ok::<(), platform_hierarchy::HierarchyError>(())
//! ```
//!
//! ## Integration with platform-acl
//!
//! `platform-acl` instantiates this registry twice, once for roles and
//! once for resources, and layers rule resolution on top of the
//! [`HierarchyRegistry::ancestors`] walk.

pub mod error;
pub mod registry;

// Re-export main types for convenience
pub use error::{HierarchyError, HierarchyResult};
pub use registry::{HierarchyRegistry, Item};
