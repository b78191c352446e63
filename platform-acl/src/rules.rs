//! # Rule Store
//!
//! ALLOW/DENY rules keyed by exact `(role, resource, privilege)` triples.
//!
//! The store has no inheritance knowledge: walking role and resource
//! ancestry is the decision engine's job. `None` in any key position is
//! the wildcard (all roles / all resources / all privileges), so the
//! engine's candidate chains and the stored keys share one shape. An
//! empty store is the default-deny state; nothing is ever seeded.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::types::{ResourceHandle, RoleHandle};

/// The decision a rule carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// The matched query is permitted.
    Allow,
    /// The matched query is refused.
    Deny,
}

/// The original query arguments, as given to an assertion predicate.
///
/// Handles carry the caller's values unresolved: a resource passed as an
/// application object reaches the assertion as that object, and a query
/// made through `Acl::can` presents the bound identity as the role. A
/// missing privilege stays `None`; it is never substituted with a
/// placeholder privilege name.
#[derive(Debug, Clone, Copy)]
pub struct AssertionContext<'a> {
    /// The role argument of the query.
    pub role: RoleHandle<'a>,
    /// The resource argument of the query.
    pub resource: ResourceHandle<'a>,
    /// The privilege argument of the query, if one was given.
    pub privilege: Option<&'a str>,
}

/// A dynamic predicate that can veto an otherwise-matching rule at
/// evaluation time. Returning `false` makes the rule invisible to the
/// query, letting resolution continue to less specific candidates.
pub type Assertion = Arc<dyn Fn(&AssertionContext<'_>) -> bool + Send + Sync>;

/// A stored rule: a decision plus an optional assertion.
#[derive(Clone)]
pub struct Rule {
    /// Whether the rule allows or denies.
    pub rule_type: RuleType,
    /// Predicate consulted before the rule applies, if any.
    pub assertion: Option<Assertion>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("rule_type", &self.rule_type)
            .field("assertion", &self.assertion.as_ref().map(|_| "<assertion>"))
            .finish()
    }
}

/// Exact storage key. `None` is the wildcard in every position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RuleKey {
    role: Option<String>,
    resource: Option<String>,
    privilege: Option<String>,
}

impl RuleKey {
    fn new(role: Option<&str>, resource: Option<&str>, privilege: Option<&str>) -> Self {
        Self {
            role: role.map(str::to_string),
            resource: resource.map(str::to_string),
            privilege: privilege.map(str::to_string),
        }
    }
}

/// In-memory store of ACL rules, at most one rule per exact key.
///
/// # Examples
///
/// ```
/// use platform_acl::{RuleStore, RuleType};
///
/// let mut store = RuleStore::new();
/// store.set(RuleType::Allow, Some("user"), Some("Post"), Some("edit"), None);
///
/// let rule = store.get(Some("user"), Some("Post"), Some("edit")).unwrap();
/// assert_eq!(rule.rule_type, RuleType::Allow);
///
/// // removal is type-matched: removing a deny at an allow key is a no-op
/// assert!(!store.remove(RuleType::Deny, Some("user"), Some("Post"), Some("edit")));
/// assert!(store.remove(RuleType::Allow, Some("user"), Some("Post"), Some("edit")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: HashMap<RuleKey, Rule>,
}

impl RuleStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the rule at an exact key.
    ///
    /// A later call for the same key overwrites both the type and the
    /// assertion of any prior rule, regardless of the prior type.
    pub fn set(
        &mut self,
        rule_type: RuleType,
        role: Option<&str>,
        resource: Option<&str>,
        privilege: Option<&str>,
        assertion: Option<Assertion>,
    ) {
        self.rules.insert(
            RuleKey::new(role, resource, privilege),
            Rule {
                rule_type,
                assertion,
            },
        );
    }

    /// Delete the rule at an exact key, only if its stored type matches.
    ///
    /// # Returns
    ///
    /// `true` if a rule was deleted, `false` if the key was absent or
    /// held a rule of the other type (a no-op either way, so the call is
    /// idempotent).
    pub fn remove(
        &mut self,
        rule_type: RuleType,
        role: Option<&str>,
        resource: Option<&str>,
        privilege: Option<&str>,
    ) -> bool {
        let key = RuleKey::new(role, resource, privilege);
        match self.rules.get(&key) {
            Some(rule) if rule.rule_type == rule_type => {
                self.rules.remove(&key);
                true
            }
            _ => false,
        }
    }

    /// Look up the rule at an exact key.
    ///
    /// No ancestry or wildcard fallback happens here; absent means
    /// absent at exactly this key.
    pub fn get(
        &self,
        role: Option<&str>,
        resource: Option<&str>,
        privilege: Option<&str>,
    ) -> Option<&Rule> {
        self.rules.get(&RuleKey::new(role, resource, privilege))
    }

    /// Drop every rule keyed on a concrete role id.
    ///
    /// Rules keyed on the wildcard role survive. Backs
    /// `Acl::remove_role_all`.
    pub fn purge_role_rules(&mut self) {
        self.rules.retain(|key, _| key.role.is_none());
    }

    /// Drop every rule keyed on a concrete resource id.
    ///
    /// Rules keyed on the wildcard resource survive. Backs
    /// `Acl::remove_resource_all`.
    pub fn purge_resource_rules(&mut self) {
        self.rules.retain(|key, _| key.resource.is_none());
    }

    /// Remove every rule.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Get the count of stored rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no rules are stored.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_starts_empty() {
        let store = RuleStore::new();
        assert!(store.is_empty());
        // the root wildcard key is absent until populated
        assert!(store.get(None, None, None).is_none());
    }

    #[test]
    fn test_set_overwrites_either_type() {
        let mut store = RuleStore::new();
        store.set(RuleType::Allow, Some("user"), None, None, None);
        store.set(RuleType::Deny, Some("user"), None, None, None);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(Some("user"), None, None).unwrap().rule_type, RuleType::Deny);
    }

    #[test]
    fn test_set_replaces_assertion() {
        let mut store = RuleStore::new();
        let always: Assertion = Arc::new(|_| true);
        store.set(RuleType::Allow, None, None, None, Some(always));
        store.set(RuleType::Allow, None, None, None, None);

        assert!(store.get(None, None, None).unwrap().assertion.is_none());
    }

    #[test]
    fn test_remove_is_type_matched() {
        let mut store = RuleStore::new();
        store.set(RuleType::Allow, None, None, Some("edit"), None);

        assert!(!store.remove(RuleType::Deny, None, None, Some("edit")));
        assert!(store.get(None, None, Some("edit")).is_some());

        assert!(store.remove(RuleType::Allow, None, None, Some("edit")));
        assert!(store.get(None, None, Some("edit")).is_none());

        // idempotent on an absent key
        assert!(!store.remove(RuleType::Allow, None, None, Some("edit")));
        assert!(!store.remove(RuleType::Deny, None, None, None));
    }

    #[test]
    fn test_exact_key_lookup_only() {
        let mut store = RuleStore::new();
        store.set(RuleType::Allow, Some("user"), Some("Post"), Some("edit"), None);

        assert!(store.get(Some("user"), Some("Post"), None).is_none());
        assert!(store.get(Some("user"), None, Some("edit")).is_none());
        assert!(store.get(None, Some("Post"), Some("edit")).is_none());
    }

    #[test]
    fn test_purges_keep_wildcard_rules() {
        let mut store = RuleStore::new();
        store.set(RuleType::Allow, Some("user"), Some("Post"), None, None);
        store.set(RuleType::Allow, Some("user"), None, None, None);
        store.set(RuleType::Allow, None, Some("Post"), None, None);
        store.set(RuleType::Allow, None, None, None, None);

        store.purge_role_rules();
        assert_eq!(store.len(), 2);
        assert!(store.get(None, Some("Post"), None).is_some());
        assert!(store.get(None, None, None).is_some());

        store.purge_resource_rules();
        assert_eq!(store.len(), 1);
        assert!(store.get(None, None, None).is_some());
    }

    #[test]
    fn test_rule_type_serialization() {
        assert_eq!(serde_json::to_string(&RuleType::Allow).unwrap(), "\"allow\"");
        assert_eq!(serde_json::to_string(&RuleType::Deny).unwrap(), "\"deny\"");
    }
}
