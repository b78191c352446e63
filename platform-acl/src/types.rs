//! # ACL Types
//!
//! Capability traits and argument shapes for the decision engine.
//!
//! Role and resource parameters are accepted either as plain identifiers
//! or as application objects exposing an identifier accessor. Every entry
//! point resolves the capability once into a canonical id and keeps the
//! original reference around so assertions see the value the caller
//! actually passed, not the resolved id.

use std::fmt;

/// Reserved identifier for the synthetic role representing the bound
/// user identity.
///
/// The role is re-created by `Acl::set_identity` as a child of every role
/// the identity declares. It cannot be registered, removed, or used in
/// rule management through the normal role APIs.
pub const USER_IDENTITY_ROLE: &str = "__user_identity_role__";

/// Capability exposed by anything usable as a role argument.
///
/// Implemented for `str` and `String`, so a plain identifier works
/// anywhere a role object does.
///
/// # Examples
///
/// ```
/// use platform_acl::AclRole;
///
/// struct ServiceAccount {
///     role: String,
/// }
///
/// impl AclRole for ServiceAccount {
///     fn role_id(&self) -> &str {
///         &self.role
///     }
/// }
///
/// let account = ServiceAccount { role: "deployer".to_string() };
/// assert_eq!(account.role_id(), "deployer");
/// assert_eq!("deployer".role_id(), "deployer");
/// ```
pub trait AclRole {
    /// The role identifier used for hierarchy lookup and rule matching.
    fn role_id(&self) -> &str;
}

impl AclRole for str {
    fn role_id(&self) -> &str {
        self
    }
}

impl AclRole for String {
    fn role_id(&self) -> &str {
        self
    }
}

/// Capability exposed by anything usable as a resource argument.
///
/// The resolved id drives hierarchy lookup and rule-key matching; the
/// original value is forwarded unchanged into assertion predicates.
///
/// # Examples
///
/// ```
/// use platform_acl::AclResource;
///
/// struct Post {
///     id: u64,
///     kind: String,
/// }
///
/// impl AclResource for Post {
///     fn resource_id(&self) -> &str {
///         &self.kind
///     }
/// }
///
/// let post = Post { id: 7, kind: "Post".to_string() };
/// assert_eq!(post.resource_id(), "Post");
/// ```
pub trait AclResource {
    /// The resource identifier used for hierarchy lookup and rule matching.
    fn resource_id(&self) -> &str;
}

impl AclResource for str {
    fn resource_id(&self) -> &str {
        self
    }
}

impl AclResource for String {
    fn resource_id(&self) -> &str {
        self
    }
}

/// Capability exposed by the "current identity" bound to the engine.
///
/// The engine only reads the declared role sequence; it never
/// authenticates or stores credentials. An empty sequence is valid.
pub trait UserIdentity {
    /// The ordered sequence of role identifiers this identity holds.
    fn roles(&self) -> Vec<String>;
}

/// Role selector for rule management: the wildcard, one id, or a
/// sequence of ids. An empty sequence collapses to the wildcard.
#[derive(Debug, Clone, Copy, Default)]
pub enum RoleSpec<'a> {
    /// Applies to all roles.
    #[default]
    Any,
    /// A single role id.
    One(&'a str),
    /// A sequence of role ids.
    Many(&'a [&'a str]),
}

impl<'a> RoleSpec<'a> {
    /// Expand into the rule-key role candidates (`None` = wildcard).
    pub(crate) fn expand(&self) -> Vec<Option<&'a str>> {
        match self {
            Self::Any => vec![None],
            Self::One(id) => vec![Some(id)],
            Self::Many(ids) if ids.is_empty() => vec![None],
            Self::Many(ids) => ids.iter().map(|id| Some(*id)).collect(),
        }
    }
}

impl<'a> From<&'a str> for RoleSpec<'a> {
    fn from(id: &'a str) -> Self {
        Self::One(id)
    }
}

impl<'a> From<&'a [&'a str]> for RoleSpec<'a> {
    fn from(ids: &'a [&'a str]) -> Self {
        Self::Many(ids)
    }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for RoleSpec<'a> {
    fn from(ids: &'a [&'a str; N]) -> Self {
        Self::Many(ids)
    }
}

/// Resource selector for rule management, mirroring [`RoleSpec`].
#[derive(Debug, Clone, Copy, Default)]
pub enum ResourceSpec<'a> {
    /// Applies to all resources.
    #[default]
    Any,
    /// A single resource id.
    One(&'a str),
    /// A sequence of resource ids.
    Many(&'a [&'a str]),
}

impl<'a> ResourceSpec<'a> {
    pub(crate) fn expand(&self) -> Vec<Option<&'a str>> {
        match self {
            Self::Any => vec![None],
            Self::One(id) => vec![Some(id)],
            Self::Many(ids) if ids.is_empty() => vec![None],
            Self::Many(ids) => ids.iter().map(|id| Some(*id)).collect(),
        }
    }
}

impl<'a> From<&'a str> for ResourceSpec<'a> {
    fn from(id: &'a str) -> Self {
        Self::One(id)
    }
}

impl<'a> From<&'a [&'a str]> for ResourceSpec<'a> {
    fn from(ids: &'a [&'a str]) -> Self {
        Self::Many(ids)
    }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for ResourceSpec<'a> {
    fn from(ids: &'a [&'a str; N]) -> Self {
        Self::Many(ids)
    }
}

/// Privilege selector for rule management: all privileges, one
/// privilege, or a sequence. "All privileges" is a distinct wildcard,
/// not a privilege named "all".
#[derive(Debug, Clone, Copy, Default)]
pub enum PrivilegeSpec<'a> {
    /// Applies to all privileges.
    #[default]
    Any,
    /// A single privilege.
    One(&'a str),
    /// A sequence of privileges.
    Many(&'a [&'a str]),
}

impl<'a> PrivilegeSpec<'a> {
    pub(crate) fn expand(&self) -> Vec<Option<&'a str>> {
        match self {
            Self::Any => vec![None],
            Self::One(privilege) => vec![Some(privilege)],
            Self::Many(privileges) if privileges.is_empty() => vec![None],
            Self::Many(privileges) => privileges.iter().map(|p| Some(*p)).collect(),
        }
    }
}

impl<'a> From<&'a str> for PrivilegeSpec<'a> {
    fn from(privilege: &'a str) -> Self {
        Self::One(privilege)
    }
}

impl<'a> From<&'a [&'a str]> for PrivilegeSpec<'a> {
    fn from(privileges: &'a [&'a str]) -> Self {
        Self::Many(privileges)
    }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for PrivilegeSpec<'a> {
    fn from(privileges: &'a [&'a str; N]) -> Self {
        Self::Many(privileges)
    }
}

/// The role argument of a query: the wildcard, a plain identifier, a
/// role capability object, or the bound user identity (for `Acl::can`).
///
/// Query entry points take `impl Into<RoleHandle>`, so call sites pass
/// `Some("admin")` / `None` for plain identifiers or `&object` for a
/// capability object; assertions receive the handle with the caller's
/// value intact.
#[derive(Clone, Copy)]
pub enum RoleHandle<'a> {
    /// No role was specified (wildcard).
    Any,
    /// A plain role identifier, exactly as passed by the caller.
    Id(&'a str),
    /// A role capability reference, exactly as passed by the caller.
    Role(&'a dyn AclRole),
    /// The bound user identity, resolved to the synthetic identity role.
    Identity(&'a dyn UserIdentity),
}

impl<'a> RoleHandle<'a> {
    /// The resolved role id, or `None` for the wildcard.
    pub fn id(&self) -> Option<&'a str> {
        match self {
            Self::Any => None,
            Self::Id(id) => Some(id),
            Self::Role(role) => Some(role.role_id()),
            Self::Identity(_) => Some(USER_IDENTITY_ROLE),
        }
    }
}

impl<'a> From<&'a str> for RoleHandle<'a> {
    fn from(id: &'a str) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<Option<&'a str>> for RoleHandle<'a> {
    fn from(id: Option<&'a str>) -> Self {
        match id {
            Some(id) => Self::Id(id),
            None => Self::Any,
        }
    }
}

impl<'a, R: AclRole> From<&'a R> for RoleHandle<'a> {
    fn from(role: &'a R) -> Self {
        Self::Role(role)
    }
}

impl fmt::Debug for RoleHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("RoleHandle::Any"),
            Self::Id(id) => write!(f, "RoleHandle::Id({:?})", id),
            Self::Role(role) => write!(f, "RoleHandle::Role({:?})", role.role_id()),
            Self::Identity(_) => f.write_str("RoleHandle::Identity"),
        }
    }
}

/// The resource argument of a query, mirroring [`RoleHandle`].
#[derive(Clone, Copy)]
pub enum ResourceHandle<'a> {
    /// No resource was specified (wildcard).
    Any,
    /// A plain resource identifier, exactly as passed by the caller.
    Id(&'a str),
    /// A resource capability reference, exactly as passed by the caller.
    Resource(&'a dyn AclResource),
}

impl<'a> ResourceHandle<'a> {
    /// The resolved resource id, or `None` for the wildcard.
    pub fn id(&self) -> Option<&'a str> {
        match self {
            Self::Any => None,
            Self::Id(id) => Some(id),
            Self::Resource(resource) => Some(resource.resource_id()),
        }
    }
}

impl<'a> From<&'a str> for ResourceHandle<'a> {
    fn from(id: &'a str) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<Option<&'a str>> for ResourceHandle<'a> {
    fn from(id: Option<&'a str>) -> Self {
        match id {
            Some(id) => Self::Id(id),
            None => Self::Any,
        }
    }
}

impl<'a, R: AclResource> From<&'a R> for ResourceHandle<'a> {
    fn from(resource: &'a R) -> Self {
        Self::Resource(resource)
    }
}

impl fmt::Debug for ResourceHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("ResourceHandle::Any"),
            Self::Id(id) => write!(f, "ResourceHandle::Id({:?})", id),
            Self::Resource(resource) => write!(f, "ResourceHandle::Resource({:?})", resource.resource_id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifiers_are_capabilities() {
        assert_eq!("admin".role_id(), "admin");
        assert_eq!("Post".to_string().resource_id(), "Post");
    }

    #[test]
    fn test_spec_expansion() {
        assert_eq!(RoleSpec::Any.expand(), vec![None]);
        assert_eq!(RoleSpec::One("user").expand(), vec![Some("user")]);
        assert_eq!(
            RoleSpec::Many(&["user", "admin"]).expand(),
            vec![Some("user"), Some("admin")]
        );
        // an empty sequence means "all", like the wildcard
        assert_eq!(RoleSpec::Many(&[]).expand(), vec![None]);
        assert_eq!(PrivilegeSpec::Many(&[]).expand(), vec![None]);
    }

    #[test]
    fn test_spec_conversions() {
        assert!(matches!(RoleSpec::from("user"), RoleSpec::One("user")));
        assert!(matches!(ResourceSpec::from(&["a", "b"]), ResourceSpec::Many(_)));
        assert!(matches!(PrivilegeSpec::from("edit"), PrivilegeSpec::One("edit")));
    }

    #[test]
    fn test_handle_resolution() {
        assert_eq!(RoleHandle::Any.id(), None);
        assert_eq!(RoleHandle::Id("user").id(), Some("user"));
        assert_eq!(ResourceHandle::Id("Post").id(), Some("Post"));

        struct Stub;
        impl UserIdentity for Stub {
            fn roles(&self) -> Vec<String> {
                vec![]
            }
        }
        assert_eq!(RoleHandle::Identity(&Stub).id(), Some(USER_IDENTITY_ROLE));
    }

    #[test]
    fn test_handle_conversions() {
        assert_eq!(RoleHandle::from("user").id(), Some("user"));
        assert_eq!(RoleHandle::from(Some("user")).id(), Some("user"));
        assert_eq!(RoleHandle::from(None).id(), None);
        assert_eq!(ResourceHandle::from(Some("Post")).id(), Some("Post"));

        let owned = "admin".to_string();
        assert!(matches!(RoleHandle::from(&owned), RoleHandle::Role(_)));

        struct Report;
        impl AclResource for Report {
            fn resource_id(&self) -> &str {
                "Report"
            }
        }
        let report = Report;
        let handle = ResourceHandle::from(&report);
        assert!(matches!(handle, ResourceHandle::Resource(_)));
        assert_eq!(handle.id(), Some("Report"));
    }
}
