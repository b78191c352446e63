//! # Decision Engine
//!
//! The `Acl` façade: role and resource management over two hierarchy
//! registries, rule management over the [`RuleStore`], the `is_allowed`
//! resolution walk, and the user-identity binding.

use std::fmt;
use std::sync::Arc;

use platform_hierarchy::{HierarchyError, HierarchyRegistry};

use crate::error::{AclError, AclResult};
use crate::rules::{Assertion, AssertionContext, Rule, RuleStore, RuleType};
use crate::types::{
    AclResource, PrivilegeSpec, ResourceHandle, ResourceSpec, RoleHandle, RoleSpec,
    UserIdentity, USER_IDENTITY_ROLE,
};

/// Role/resource-based ACL decision engine.
///
/// Owns a role hierarchy, a resource hierarchy, and a rule store, and
/// answers ALLOW/DENY queries by walking both hierarchies from the most
/// specific candidate to the wildcard. With no applicable rule the
/// answer is always deny.
///
/// The engine assumes exclusive access during any call (see the crate
/// docs); wrap it in a lock when sharing across threads.
///
/// # Examples
///
/// ```
/// use platform_acl::Acl;
///
/// let mut acl = Acl::new();
/// acl.add_role("user", &[])?
///     .add_role("admin", &["user"])?
///     .add_resource("Post", &[])?;
///
/// acl.allow("user", "Post", "edit", None)?;
///
/// // admin inherits the user rule
/// assert!(acl.is_allowed(Some("admin"), Some("Post"), Some("edit")));
/// assert!(!acl.is_allowed(Some("admin"), Some("Post"), Some("delete")));
/// # Ok::<(), platform_acl::AclError>(())
/// ```
pub struct Acl {
    /// Role hierarchy.
    roles: HierarchyRegistry<String>,
    /// Resource hierarchy; shares no identifier space with roles.
    resources: HierarchyRegistry<String>,
    /// ALLOW/DENY rules on exact (role, resource, privilege) keys.
    rules: RuleStore,
    /// The bound user identity, if any.
    identity: Option<Arc<dyn UserIdentity>>,
}

impl fmt::Debug for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acl")
            .field("roles", &self.roles)
            .field("resources", &self.resources)
            .field("rules", &self.rules)
            .field("identity", &self.identity.as_ref().map(|_| "<identity>"))
            .finish()
    }
}

impl Default for Acl {
    fn default() -> Self {
        Self {
            roles: HierarchyRegistry::new(),
            resources: HierarchyRegistry::new(),
            rules: RuleStore::new(),
            identity: None,
        }
    }
}

impl Acl {
    /// Create a new empty engine: no roles, no resources, no rules, no
    /// identity. Every query denies until rules are added.
    pub fn new() -> Self {
        Self::default()
    }

    fn validate_role_id(role: &str) -> AclResult<()> {
        if role.trim().is_empty() || role == USER_IDENTITY_ROLE {
            return Err(AclError::InvalidRoleIdentifier(role.to_string()));
        }
        Ok(())
    }

    fn validate_resource_id(resource: &str) -> AclResult<()> {
        if resource.trim().is_empty() {
            return Err(AclError::InvalidResourceIdentifier(resource.to_string()));
        }
        Ok(())
    }

    // ---- Role management -------------------------------------------------

    /// Register a role with the given (already-registered) parent roles.
    ///
    /// # Arguments
    ///
    /// * `role` - The role identifier
    /// * `parents` - Parent role identifiers, most specific inheritance first
    ///
    /// # Errors
    ///
    /// * [`AclError::InvalidRoleIdentifier`] for an empty/blank id or the
    ///   reserved identity role
    /// * [`AclError::Hierarchy`] for a duplicate role or unknown parent
    pub fn add_role(&mut self, role: &str, parents: &[&str]) -> AclResult<&mut Self> {
        Self::validate_role_id(role)?;
        for parent in parents {
            Self::validate_role_id(parent)?;
        }
        let parents: Vec<String> = parents.iter().map(|p| p.to_string()).collect();
        self.roles.add(role.to_string(), &parents)?;
        Ok(self)
    }

    /// Check whether a role is registered.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.has(&role.to_string())
    }

    /// Look up a role, returning its canonical identifier.
    ///
    /// # Errors
    ///
    /// [`AclError::InvalidRoleIdentifier`] for a blank id,
    /// [`AclError::Hierarchy`] if the role is not registered.
    pub fn get_role(&self, role: &str) -> AclResult<&str> {
        Self::validate_role_id(role)?;
        Ok(self.roles.get(&role.to_string())?.as_str())
    }

    /// All registered roles in registration order.
    ///
    /// The synthetic identity role is excluded; it is not part of the
    /// externally managed role set.
    pub fn get_roles(&self) -> Vec<String> {
        self.roles
            .ids()
            .into_iter()
            .filter(|role| role != USER_IDENTITY_ROLE)
            .collect()
    }

    /// Check whether `role` inherits from `ancestor`, directly or (with
    /// `direct_only` unset) through any chain of parents.
    pub fn inherits_role(&self, role: &str, ancestor: &str, direct_only: bool) -> AclResult<bool> {
        Ok(self
            .roles
            .inherits(&role.to_string(), &ancestor.to_string(), direct_only)?)
    }

    /// Remove a role. Descendant roles whose last parent link this
    /// removal severs are removed as well.
    ///
    /// # Errors
    ///
    /// [`AclError::InvalidRoleIdentifier`] for a blank id,
    /// [`AclError::Hierarchy`] if the role is not registered.
    pub fn remove_role(&mut self, role: &str) -> AclResult<&mut Self> {
        Self::validate_role_id(role)?;
        self.roles.remove(&role.to_string())?;
        Ok(self)
    }

    /// Remove every role and purge every rule keyed on a concrete role
    /// id. Rules keyed on the wildcard role survive.
    pub fn remove_role_all(&mut self) -> &mut Self {
        self.roles.remove_all();
        self.rules.purge_role_rules();
        self
    }

    // ---- Resource management ---------------------------------------------

    /// Register a resource with the given (already-registered) parent
    /// resources.
    ///
    /// # Errors
    ///
    /// * [`AclError::InvalidResourceIdentifier`] for an empty/blank id
    /// * [`AclError::Hierarchy`] for a duplicate resource or unknown parent
    pub fn add_resource(&mut self, resource: &str, parents: &[&str]) -> AclResult<&mut Self> {
        Self::validate_resource_id(resource)?;
        for parent in parents {
            Self::validate_resource_id(parent)?;
        }
        let parents: Vec<String> = parents.iter().map(|p| p.to_string()).collect();
        self.resources.add(resource.to_string(), &parents)?;
        Ok(self)
    }

    /// Check whether a resource is registered. Accepts a plain id or any
    /// [`AclResource`] capability.
    pub fn has_resource<R>(&self, resource: &R) -> bool
    where
        R: AclResource + ?Sized,
    {
        self.resources.has(&resource.resource_id().to_string())
    }

    /// All registered resources in registration order.
    pub fn get_resources(&self) -> Vec<String> {
        self.resources.ids()
    }

    /// Check whether `resource` inherits from `ancestor`.
    pub fn inherits_resource(
        &self,
        resource: &str,
        ancestor: &str,
        direct_only: bool,
    ) -> AclResult<bool> {
        Ok(self
            .resources
            .inherits(&resource.to_string(), &ancestor.to_string(), direct_only)?)
    }

    /// Remove a resource and every descendant orphaned by the removal.
    /// Accepts a plain id or any [`AclResource`] capability.
    ///
    /// # Errors
    ///
    /// [`AclError::InvalidResourceIdentifier`] for a blank id,
    /// [`AclError::Hierarchy`] if the resource is not registered.
    pub fn remove_resource<R>(&mut self, resource: &R) -> AclResult<&mut Self>
    where
        R: AclResource + ?Sized,
    {
        let id = resource.resource_id();
        Self::validate_resource_id(id)?;
        self.resources.remove(&id.to_string())?;
        Ok(self)
    }

    /// Remove every resource and purge every rule keyed on a concrete
    /// resource id. Rules keyed on the wildcard resource survive.
    pub fn remove_resource_all(&mut self) -> &mut Self {
        self.resources.remove_all();
        self.rules.purge_resource_rules();
        self
    }

    // ---- Rule management -------------------------------------------------

    /// Add ALLOW rules for every role x resource x privilege combination.
    ///
    /// Each selector is the wildcard, one id, or a sequence of ids (see
    /// [`RoleSpec`], [`ResourceSpec`], [`PrivilegeSpec`]); wildcard
    /// combinations are stored as-is, never expanded over registered
    /// ids. An optional assertion is attached to every combination.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_acl::{Acl, PrivilegeSpec, ResourceSpec, RoleSpec};
    ///
    /// let mut acl = Acl::new();
    /// acl.add_role("user", &[])?.add_resource("Post", &[])?;
    ///
    /// // one role, one resource, all privileges
    /// acl.allow("user", "Post", PrivilegeSpec::Any, None)?;
    ///
    /// // everything for everyone
    /// acl.allow(RoleSpec::Any, ResourceSpec::Any, PrivilegeSpec::Any, None)?;
    ///
    /// // a privilege list on the root wildcard
    /// acl.allow(RoleSpec::Any, ResourceSpec::Any, &["view", "edit"], None)?;
    /// # Ok::<(), platform_acl::AclError>(())
    /// ```
    pub fn allow<'a>(
        &mut self,
        roles: impl Into<RoleSpec<'a>>,
        resources: impl Into<ResourceSpec<'a>>,
        privileges: impl Into<PrivilegeSpec<'a>>,
        assertion: Option<Assertion>,
    ) -> AclResult<&mut Self> {
        self.set_rules(
            RuleType::Allow,
            roles.into(),
            resources.into(),
            privileges.into(),
            assertion,
        )
    }

    /// Add DENY rules for every role x resource x privilege combination.
    ///
    /// Selector semantics match [`Acl::allow`].
    pub fn deny<'a>(
        &mut self,
        roles: impl Into<RoleSpec<'a>>,
        resources: impl Into<ResourceSpec<'a>>,
        privileges: impl Into<PrivilegeSpec<'a>>,
        assertion: Option<Assertion>,
    ) -> AclResult<&mut Self> {
        self.set_rules(
            RuleType::Deny,
            roles.into(),
            resources.into(),
            privileges.into(),
            assertion,
        )
    }

    /// Remove ALLOW rules for every combination. Combinations currently
    /// holding a DENY rule (or no rule) are left untouched.
    pub fn remove_allow<'a>(
        &mut self,
        roles: impl Into<RoleSpec<'a>>,
        resources: impl Into<ResourceSpec<'a>>,
        privileges: impl Into<PrivilegeSpec<'a>>,
    ) -> AclResult<&mut Self> {
        self.remove_rules(
            RuleType::Allow,
            roles.into(),
            resources.into(),
            privileges.into(),
        )
    }

    /// Remove DENY rules for every combination. Combinations currently
    /// holding an ALLOW rule (or no rule) are left untouched, so removing
    /// a never-set default deny is a no-op.
    pub fn remove_deny<'a>(
        &mut self,
        roles: impl Into<RoleSpec<'a>>,
        resources: impl Into<ResourceSpec<'a>>,
        privileges: impl Into<PrivilegeSpec<'a>>,
    ) -> AclResult<&mut Self> {
        self.remove_rules(
            RuleType::Deny,
            roles.into(),
            resources.into(),
            privileges.into(),
        )
    }

    fn validate_rule_ids(
        roles: &[Option<&str>],
        resources: &[Option<&str>],
    ) -> AclResult<()> {
        for role in roles.iter().flatten() {
            Self::validate_role_id(role)?;
        }
        for resource in resources.iter().flatten() {
            Self::validate_resource_id(resource)?;
        }
        Ok(())
    }

    fn set_rules(
        &mut self,
        rule_type: RuleType,
        roles: RoleSpec<'_>,
        resources: ResourceSpec<'_>,
        privileges: PrivilegeSpec<'_>,
        assertion: Option<Assertion>,
    ) -> AclResult<&mut Self> {
        let roles = roles.expand();
        let resources = resources.expand();
        let privileges = privileges.expand();
        Self::validate_rule_ids(&roles, &resources)?;

        for resource in &resources {
            for role in &roles {
                for privilege in &privileges {
                    self.rules
                        .set(rule_type, *role, *resource, *privilege, assertion.clone());
                }
            }
        }
        tracing::debug!(
            ?rule_type,
            combinations = roles.len() * resources.len() * privileges.len(),
            "upserted rules"
        );
        Ok(self)
    }

    fn remove_rules(
        &mut self,
        rule_type: RuleType,
        roles: RoleSpec<'_>,
        resources: ResourceSpec<'_>,
        privileges: PrivilegeSpec<'_>,
    ) -> AclResult<&mut Self> {
        let roles = roles.expand();
        let resources = resources.expand();
        let privileges = privileges.expand();
        Self::validate_rule_ids(&roles, &resources)?;

        let mut removed = 0usize;
        for resource in &resources {
            for role in &roles {
                for privilege in &privileges {
                    if self.rules.remove(rule_type, *role, *resource, *privilege) {
                        removed += 1;
                    }
                }
            }
        }
        tracing::debug!(?rule_type, removed, "removed rules");
        Ok(self)
    }

    // ---- Resolution ------------------------------------------------------

    /// Decide whether `role` may perform `privilege` on `resource`.
    ///
    /// `None` for role or resource means the wildcard; `None` for the
    /// privilege asks "are all privileges allowed", which consults only
    /// all-privileges rules. Role and resource take anything convertible
    /// to a handle: `Some("id")` or `None` for plain identifiers, or a
    /// capability object by reference. A capability is resolved once for
    /// lookup while the original value is what any matched assertion
    /// receives.
    ///
    /// Resolution walks resource candidates outermost (the resolved id,
    /// its ancestors closest first, then the wildcard) and role
    /// candidates innermost, so an exact match always beats an inherited
    /// one and resource specificity outranks role specificity. The first
    /// rule whose assertion passes decides; a failed assertion makes that
    /// rule invisible and the walk continues. An exhausted walk denies.
    ///
    /// Unregistered ids are not an error: they simply contribute no
    /// ancestors, so only wildcard rules can apply to them.
    pub fn is_allowed<'a>(
        &self,
        role: impl Into<RoleHandle<'a>>,
        resource: impl Into<ResourceHandle<'a>>,
        privilege: Option<&str>,
    ) -> bool {
        self.resolve(role.into(), resource.into(), privilege)
    }

    /// Shared resolution path for `is_allowed` and `can`.
    fn resolve(
        &self,
        role: RoleHandle<'_>,
        resource: ResourceHandle<'_>,
        privilege: Option<&str>,
    ) -> bool {
        let resource_chain = Self::candidate_chain(&self.resources, resource.id());
        let role_chain = Self::candidate_chain(&self.roles, role.id());
        let context = AssertionContext {
            role,
            resource,
            privilege,
        };

        for resource_candidate in &resource_chain {
            for role_candidate in &role_chain {
                let role_key = role_candidate.as_deref();
                let resource_key = resource_candidate.as_deref();

                if let Some(privilege) = privilege {
                    if let Some(rule) = self.rules.get(role_key, resource_key, Some(privilege)) {
                        if Self::assertion_passes(rule, &context) {
                            return self.decide(rule, role_key, resource_key, Some(privilege));
                        }
                    }
                }
                if let Some(rule) = self.rules.get(role_key, resource_key, None) {
                    if Self::assertion_passes(rule, &context) {
                        return self.decide(rule, role_key, resource_key, None);
                    }
                }
            }
        }

        tracing::debug!(
            role = ?role.id(),
            resource = ?resource.id(),
            ?privilege,
            "no applicable rule, default deny"
        );
        false
    }

    fn decide(
        &self,
        rule: &Rule,
        role_key: Option<&str>,
        resource_key: Option<&str>,
        privilege_key: Option<&str>,
    ) -> bool {
        tracing::debug!(
            rule_type = ?rule.rule_type,
            role = ?role_key,
            resource = ?resource_key,
            privilege = ?privilege_key,
            "rule matched"
        );
        rule.rule_type == RuleType::Allow
    }

    /// The query candidates for one registry: the resolved id, its
    /// ancestors in depth-first order (closest first), then the wildcard.
    fn candidate_chain(
        registry: &HierarchyRegistry<String>,
        id: Option<&str>,
    ) -> Vec<Option<String>> {
        let mut chain: Vec<Option<String>> = Vec::new();
        if let Some(id) = id {
            chain.push(Some(id.to_string()));
            for ancestor in registry.ancestors(&id.to_string()) {
                chain.push(Some(ancestor));
            }
        }
        chain.push(None);
        chain
    }

    fn assertion_passes(rule: &Rule, context: &AssertionContext<'_>) -> bool {
        match &rule.assertion {
            Some(assertion) => assertion(context),
            None => true,
        }
    }

    // ---- Identity binding ------------------------------------------------

    /// Bind the current user identity.
    ///
    /// Re-creates the synthetic identity role as a child of every role
    /// the identity declares, replacing any prior edges entirely, then
    /// stores the identity for [`Acl::can`]. Declared roles are checked
    /// before anything mutates, so a failed call leaves both the prior
    /// identity and its edges in place.
    ///
    /// # Errors
    ///
    /// [`AclError::Hierarchy`] if any declared role is not registered.
    pub fn set_identity(&mut self, identity: Arc<dyn UserIdentity>) -> AclResult<&mut Self> {
        let declared = identity.roles();
        for role in &declared {
            if role == USER_IDENTITY_ROLE || !self.roles.has(role) {
                return Err(AclError::Hierarchy(HierarchyError::UnknownItem(
                    role.clone(),
                )));
            }
        }

        let synthetic = USER_IDENTITY_ROLE.to_string();
        if self.roles.has(&synthetic) {
            self.roles.remove(&synthetic)?;
        }
        self.roles.add(synthetic, &declared)?;
        self.identity = Some(identity);

        tracing::debug!(roles = ?declared, "user identity bound");
        Ok(self)
    }

    /// The bound user identity, if any.
    pub fn identity(&self) -> Option<&dyn UserIdentity> {
        self.identity.as_deref()
    }

    /// Drop the bound identity and its synthetic role.
    pub fn clear_identity(&mut self) -> &mut Self {
        self.identity = None;
        let synthetic = USER_IDENTITY_ROLE.to_string();
        if self.roles.has(&synthetic) {
            self.roles.remove(&synthetic).ok();
        }
        tracing::debug!("user identity cleared");
        self
    }

    /// Decide whether the bound identity may perform `privilege` on
    /// `resource`.
    ///
    /// Resolves like [`Acl::is_allowed`] with the synthetic identity
    /// role; assertions receive the identity object itself as the role
    /// argument.
    ///
    /// # Errors
    ///
    /// [`AclError::NoIdentity`] if no identity is bound.
    pub fn can<'a>(
        &self,
        resource: impl Into<ResourceHandle<'a>>,
        privilege: Option<&str>,
    ) -> AclResult<bool> {
        let identity = self.identity.as_deref().ok_or(AclError::NoIdentity)?;
        Ok(self.resolve(RoleHandle::Identity(identity), resource.into(), privilege))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_chain_order() {
        let mut acl = Acl::new();
        acl.add_resource("city", &[]).unwrap();
        acl.add_resource("building", &["city"]).unwrap();
        acl.add_resource("room", &["building"]).unwrap();

        let chain = Acl::candidate_chain(&acl.resources, Some("room"));
        assert_eq!(
            chain,
            vec![
                Some("room".to_string()),
                Some("building".to_string()),
                Some("city".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_candidate_chain_unregistered_id() {
        let acl = Acl::new();
        let chain = Acl::candidate_chain(&acl.roles, Some("ghost"));
        assert_eq!(chain, vec![Some("ghost".to_string()), None]);
        assert_eq!(Acl::candidate_chain(&acl.roles, None), vec![None]);
    }

    #[test]
    fn test_blank_identifiers_rejected() {
        let mut acl = Acl::new();
        assert!(matches!(
            acl.add_role("", &[]),
            Err(AclError::InvalidRoleIdentifier(_))
        ));
        assert!(matches!(
            acl.add_role("  ", &[]),
            Err(AclError::InvalidRoleIdentifier(_))
        ));
        assert!(matches!(
            acl.add_resource("", &[]),
            Err(AclError::InvalidResourceIdentifier(_))
        ));
        assert!(matches!(
            acl.allow("", ResourceSpec::Any, PrivilegeSpec::Any, None),
            Err(AclError::InvalidRoleIdentifier(_))
        ));
    }

    #[test]
    fn test_reserved_role_id_rejected() {
        let mut acl = Acl::new();
        assert!(matches!(
            acl.add_role(USER_IDENTITY_ROLE, &[]),
            Err(AclError::InvalidRoleIdentifier(_))
        ));
        acl.add_role("user", &[]).unwrap();
        assert!(matches!(
            acl.add_role("other", &[USER_IDENTITY_ROLE]),
            Err(AclError::InvalidRoleIdentifier(_))
        ));
    }

    #[test]
    fn test_failed_rule_call_mutates_nothing() {
        let mut acl = Acl::new();
        let result = acl.allow(
            RoleSpec::Many(&["user", ""]),
            ResourceSpec::Any,
            PrivilegeSpec::Any,
            None,
        );
        assert!(result.is_err());
        assert!(!acl.is_allowed(Some("user"), None, None));
    }
}
