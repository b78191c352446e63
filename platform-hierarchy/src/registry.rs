//! # Hierarchy Registry
//!
//! A generic registry of named items with multi-parent inheritance.
//! The registry is the backing store for both the role hierarchy and the
//! resource hierarchy in `platform-acl`, but has no knowledge of either:
//! it only tracks items, their ordered parent lists, and the reverse
//! child links needed for removal.
//!
//! Storage is arena-style: entries are keyed by identifier and relatives
//! are referenced by identifier, so link maintenance is map lookups and
//! vector edits rather than pointer chasing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use crate::error::{HierarchyError, HierarchyResult};

/// A single registered item together with its inheritance links.
///
/// Returned by [`HierarchyRegistry::items`] as an inspection snapshot;
/// the registry never hands out live references to its internal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item<K> {
    /// The item's identifier.
    pub id: K,
    /// Direct parents, unique, in the order they were declared.
    pub parents: Vec<K>,
    /// Direct children, in the order they were registered.
    pub children: Vec<K>,
}

/// A registry of items forming a multi-parent hierarchy (a DAG).
///
/// Items are registered with zero or more pre-existing parents and can be
/// queried for direct or transitive inheritance. Because a parent must be
/// registered before it can be referenced, `add` can never introduce a
/// cycle and inheritance walks need no cycle guard.
///
/// Two registry instances share no identifier space; `platform-acl`
/// instantiates one for roles and one for resources.
///
/// # Examples
///
/// ```
/// use platform_hierarchy::HierarchyRegistry;
///
/// let mut registry: HierarchyRegistry<String> = HierarchyRegistry::new();
/// registry
///     .add("guest".to_string(), &[])?
///     .add("member".to_string(), &["guest".to_string()])?
///     .add("editor".to_string(), &["member".to_string()])?;
///
/// assert!(registry.inherits(&"member".to_string(), &"guest".to_string(), true)?);
/// assert!(registry.inherits(&"editor".to_string(), &"guest".to_string(), false)?);
/// assert!(!registry.inherits(&"guest".to_string(), &"editor".to_string(), false)?);
/// # Ok::<(), platform_hierarchy::HierarchyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HierarchyRegistry<K> {
    /// Entries keyed by identifier.
    entries: HashMap<K, Item<K>>,
    /// Identifiers in registration order, for deterministic enumeration.
    order: Vec<K>,
}

impl<K> Default for HierarchyRegistry<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<K> HierarchyRegistry<K>
where
    K: Clone + Eq + Hash + Display,
{
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item with the given parents.
    ///
    /// Parents must already be registered; duplicate parent ids in the
    /// list are collapsed, keeping first-occurrence order. The item is
    /// appended to each parent's children list. All validation happens
    /// before any mutation, so a failed call leaves the registry
    /// untouched.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier to register
    /// * `parents` - Identifiers of already-registered parents (may be empty)
    ///
    /// # Errors
    ///
    /// * [`HierarchyError::DuplicateItem`] if `id` is already registered
    /// * [`HierarchyError::UnknownParent`] if any parent is not registered
    pub fn add(&mut self, id: K, parents: &[K]) -> HierarchyResult<&mut Self> {
        if self.has(&id) {
            return Err(HierarchyError::DuplicateItem(id.to_string()));
        }

        let mut item_parents: Vec<K> = Vec::with_capacity(parents.len());
        for parent in parents {
            if item_parents.contains(parent) {
                continue;
            }
            if !self.has(parent) {
                return Err(HierarchyError::UnknownParent {
                    parent: parent.to_string(),
                    item: id.to_string(),
                });
            }
            item_parents.push(parent.clone());
        }

        for parent in &item_parents {
            if let Some(entry) = self.entries.get_mut(parent) {
                entry.children.push(id.clone());
            }
        }

        self.order.push(id.clone());
        self.entries.insert(
            id.clone(),
            Item {
                id,
                parents: item_parents,
                children: Vec::new(),
            },
        );

        Ok(self)
    }

    /// Check whether an item is registered.
    pub fn has(&self, id: &K) -> bool {
        self.entries.contains_key(id)
    }

    /// Look up an item, returning its canonical identifier.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::UnknownItem`] if the item is not registered.
    pub fn get(&self, id: &K) -> HierarchyResult<&K> {
        self.entries
            .get(id)
            .map(|entry| &entry.id)
            .ok_or_else(|| HierarchyError::UnknownItem(id.to_string()))
    }

    /// Get the ordered direct parents of an item.
    ///
    /// Returns an owned copy; mutating it does not affect the registry.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::UnknownItem`] if the item is not registered.
    pub fn parents(&self, id: &K) -> HierarchyResult<Vec<K>> {
        self.entries
            .get(id)
            .map(|entry| entry.parents.clone())
            .ok_or_else(|| HierarchyError::UnknownItem(id.to_string()))
    }

    /// Check whether `id` inherits from `ancestor`.
    ///
    /// With `direct_only` set, only the direct parent list is consulted.
    /// Otherwise the parent chain is searched depth-first, so any
    /// transitive ancestor matches. An item never inherits from itself.
    ///
    /// # Arguments
    ///
    /// * `id` - The item to start from
    /// * `ancestor` - The candidate ancestor
    /// * `direct_only` - Restrict the check to direct parents
    ///
    /// # Errors
    ///
    /// [`HierarchyError::UnknownItem`] if either item is not registered.
    pub fn inherits(&self, id: &K, ancestor: &K, direct_only: bool) -> HierarchyResult<bool> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| HierarchyError::UnknownItem(id.to_string()))?;
        if !self.has(ancestor) {
            return Err(HierarchyError::UnknownItem(ancestor.to_string()));
        }

        let direct = entry.parents.contains(ancestor);
        if direct || direct_only {
            return Ok(direct);
        }

        for parent in &entry.parents {
            if self.inherits(parent, ancestor, false)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// All ancestors of an item in depth-first parent order, closest
    /// first, without duplicates. The item itself is not included.
    ///
    /// An unregistered id has no ancestors; this accessor never fails,
    /// which lets resolution walks treat unknown ids as leaf entries.
    pub fn ancestors(&self, id: &K) -> Vec<K> {
        let mut found: Vec<K> = Vec::new();
        let mut stack: Vec<K> = match self.entries.get(id) {
            Some(entry) => entry.parents.iter().rev().cloned().collect(),
            None => return found,
        };

        while let Some(current) = stack.pop() {
            if found.contains(&current) {
                continue;
            }
            if let Some(entry) = self.entries.get(&current) {
                for parent in entry.parents.iter().rev() {
                    stack.push(parent.clone());
                }
            }
            found.push(current);
        }

        found
    }

    /// Remove an item and cascade to orphaned descendants.
    ///
    /// The item is detached from every parent's children list and every
    /// child's parent list. Any descendant whose last remaining parent
    /// link was severed by the removal is removed recursively; a
    /// descendant that still has another parent keeps that link and stays
    /// registered.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::UnknownItem`] if the item is not registered.
    pub fn remove(&mut self, id: &K) -> HierarchyResult<&mut Self> {
        if !self.has(id) {
            return Err(HierarchyError::UnknownItem(id.to_string()));
        }

        let mut doomed: Vec<K> = vec![id.clone()];
        while let Some(current) = doomed.pop() {
            let entry = match self.entries.remove(&current) {
                Some(entry) => entry,
                None => continue,
            };
            self.order.retain(|other| other != &current);

            for parent in &entry.parents {
                if let Some(parent_entry) = self.entries.get_mut(parent) {
                    parent_entry.children.retain(|child| child != &current);
                }
            }
            for child in &entry.children {
                if let Some(child_entry) = self.entries.get_mut(child) {
                    child_entry.parents.retain(|parent| parent != &current);
                    if child_entry.parents.is_empty() {
                        doomed.push(child.clone());
                    }
                }
            }
        }

        Ok(self)
    }

    /// Remove every item from the registry.
    pub fn remove_all(&mut self) -> &mut Self {
        self.entries.clear();
        self.order.clear();
        self
    }

    /// All registered identifiers in registration order.
    pub fn ids(&self) -> Vec<K> {
        self.order.clone()
    }

    /// A deep snapshot of every entry in registration order.
    ///
    /// Intended for inspection and testing; the decision path in
    /// `platform-acl` never uses it.
    pub fn items(&self) -> Vec<Item<K>> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).cloned())
            .collect()
    }

    /// Get the count of registered items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(edges: &[(&str, &[&str])]) -> HierarchyRegistry<String> {
        let mut registry = HierarchyRegistry::new();
        for (id, parents) in edges {
            let parents: Vec<String> = parents.iter().map(|p| p.to_string()).collect();
            registry.add(id.to_string(), &parents).unwrap();
        }
        registry
    }

    #[test]
    fn test_basic_inheritance() {
        let reg = registry(&[("guest", &[]), ("member", &["guest"]), ("editor", &["member"])]);

        assert_eq!(reg.parents(&"guest".to_string()).unwrap(), Vec::<String>::new());
        assert_eq!(reg.parents(&"member".to_string()).unwrap(), vec!["guest"]);
        assert_eq!(reg.parents(&"editor".to_string()).unwrap(), vec!["member"]);

        assert!(reg.inherits(&"member".into(), &"guest".into(), true).unwrap());
        assert!(reg.inherits(&"editor".into(), &"member".into(), true).unwrap());
        assert!(reg.inherits(&"editor".into(), &"guest".into(), false).unwrap());
        assert!(!reg.inherits(&"editor".into(), &"guest".into(), true).unwrap());

        assert!(!reg.inherits(&"guest".into(), &"member".into(), false).unwrap());
        assert!(!reg.inherits(&"member".into(), &"editor".into(), false).unwrap());
        assert!(!reg.inherits(&"guest".into(), &"editor".into(), false).unwrap());
    }

    #[test]
    fn test_item_never_inherits_itself() {
        let reg = registry(&[("solo", &[]), ("child", &["solo"])]);
        assert!(!reg.inherits(&"solo".into(), &"solo".into(), false).unwrap());
        assert!(!reg.inherits(&"child".into(), &"child".into(), false).unwrap());
    }

    #[test]
    fn test_transitivity() {
        let reg = registry(&[("c", &[]), ("b", &["c"]), ("a", &["b"])]);
        assert!(reg.inherits(&"a".into(), &"b".into(), false).unwrap());
        assert!(reg.inherits(&"b".into(), &"c".into(), false).unwrap());
        assert!(reg.inherits(&"a".into(), &"c".into(), false).unwrap());
    }

    #[test]
    fn test_multiple_inheritance() {
        let mut reg = registry(&[("parent1", &[]), ("parent2", &[]), ("child", &["parent1", "parent2"])]);

        let parents = reg.parents(&"child".to_string()).unwrap();
        assert_eq!(parents, vec!["parent1", "parent2"]);
        assert!(reg.inherits(&"child".into(), &"parent1".into(), false).unwrap());
        assert!(reg.inherits(&"child".into(), &"parent2".into(), false).unwrap());

        reg.remove(&"parent2".to_string()).unwrap();

        // child keeps its surviving parent link
        assert!(reg.has(&"child".to_string()));
        assert_eq!(reg.parents(&"child".to_string()).unwrap(), vec!["parent1"]);
        assert!(reg.inherits(&"child".into(), &"parent1".into(), false).unwrap());
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let mut reg = registry(&[("tst", &[])]);
        let err = reg.add("tst".to_string(), &[]).err().unwrap();
        assert_eq!(err, HierarchyError::DuplicateItem("tst".to_string()));
    }

    #[test]
    fn test_unknown_parent_rejected_without_mutation() {
        let mut reg = registry(&[("known", &[])]);
        let err = reg
            .add("orphan".to_string(), &["known".to_string(), "missing".to_string()])
            .err()
            .unwrap();
        assert_eq!(
            err,
            HierarchyError::UnknownParent {
                parent: "missing".to_string(),
                item: "orphan".to_string(),
            }
        );
        // failed add must not leave a half-linked entry behind
        assert!(!reg.has(&"orphan".to_string()));
        assert!(reg.items()[0].children.is_empty());
    }

    #[test]
    fn test_unknown_item_queries_fail() {
        let reg = registry(&[("known", &[])]);
        let missing = "missing".to_string();
        assert!(matches!(reg.get(&missing), Err(HierarchyError::UnknownItem(_))));
        assert!(matches!(reg.parents(&missing), Err(HierarchyError::UnknownItem(_))));
        assert!(matches!(
            reg.inherits(&missing, &"known".to_string(), false),
            Err(HierarchyError::UnknownItem(_))
        ));
        assert!(matches!(
            reg.inherits(&"known".to_string(), &missing, false),
            Err(HierarchyError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_cascading_removal() {
        let mut reg = registry(&[("city", &[]), ("building", &["city"]), ("room", &["building"])]);

        reg.remove(&"building".to_string()).unwrap();

        assert!(!reg.has(&"building".to_string()));
        assert!(!reg.has(&"room".to_string()));
        assert!(reg.has(&"city".to_string()));
        assert!(reg.items()[0].children.is_empty());
    }

    #[test]
    fn test_removal_of_unknown_item_fails() {
        let mut reg: HierarchyRegistry<String> = HierarchyRegistry::new();
        assert!(matches!(
            reg.remove(&"missing".to_string()),
            Err(HierarchyError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_remove_all() {
        let mut reg = registry(&[("a", &[]), ("b", &["a"])]);
        reg.remove_all();
        assert!(reg.is_empty());
        assert!(!reg.has(&"a".to_string()));
        assert_eq!(reg.ids(), Vec::<String>::new());
    }

    #[test]
    fn test_ids_keep_registration_order() {
        let reg = registry(&[("guest", &[]), ("staff", &["guest"]), ("editor", &["staff"]), ("administrator", &[])]);
        assert_eq!(reg.ids(), vec!["guest", "staff", "editor", "administrator"]);
    }

    #[test]
    fn test_ancestors_closest_first() {
        let reg = registry(&[
            ("root", &[]),
            ("left", &["root"]),
            ("right", &["root"]),
            ("leaf", &["left", "right"]),
        ]);

        // depth-first through the first parent before moving to the second,
        // shared ancestors reported once
        assert_eq!(reg.ancestors(&"leaf".to_string()), vec!["left", "root", "right"]);
        assert_eq!(reg.ancestors(&"root".to_string()), Vec::<String>::new());
        assert_eq!(reg.ancestors(&"unregistered".to_string()), Vec::<String>::new());
    }

    #[test]
    fn test_items_snapshot_is_independent() {
        let reg = registry(&[("a", &[]), ("b", &["a"])]);
        let snapshot = reg.items();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].children, vec!["b"]);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json[1]["parents"][0], "a");
    }
}
