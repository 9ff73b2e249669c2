//! The role × resource × action decision table and the predicates derived from it.
//!
//! Everything here is a pure function of its arguments. An absent user is
//! denied everything.

use crate::rbac::config::SystemCatalog;
use crate::rbac::role::{Role, Scope, scope_of};
use crate::rbac::user::User;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Domain collection guarded by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Personnel records
    Personnel,
    /// Competency / qualification standards
    Standards,
}

/// Operation being authorized against a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Personnel => "personnel",
            Resource::Standards => "standards",
        }
    }
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::View)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Actions a role may perform on a resource
pub fn allowed_actions(role: Role, resource: Resource) -> &'static [Action] {
    use Action::*;

    match (role, resource) {
        (Role::Employee, Resource::Personnel) => &[View],
        (Role::Employee, Resource::Standards) => &[View],
        (Role::Coe, Resource::Personnel) => &[View],
        (Role::Coe, Resource::Standards) => &[View, Create, Edit, Delete],
        (Role::Hrbp | Role::SystemLeader, Resource::Personnel) => &[View],
        (Role::Hrbp | Role::SystemLeader, Resource::Standards) => &[View, Create, Edit],
    }
}

/// Breadth of the records a role may view within a resource.
///
/// Standards are readable by everyone; personnel follow the role's scope.
pub fn view_scope(role: Role, resource: Resource) -> Scope {
    match resource {
        Resource::Personnel => scope_of(role),
        Resource::Standards => Scope::Global,
    }
}

/// Whether `user` may perform `action` on `resource` at all
pub fn can_act(user: Option<&User>, resource: Resource, action: Action) -> bool {
    user.is_some_and(|u| allowed_actions(u.role, resource).contains(&action))
}

fn has_role(user: Option<&User>, pred: impl Fn(Role) -> bool) -> bool {
    user.is_some_and(|u| pred(u.role))
}

pub fn can_view_all_employees(user: Option<&User>) -> bool {
    has_role(user, |r| r == Role::Coe)
}

pub fn can_view_system_employees(user: Option<&User>) -> bool {
    has_role(user, |r| matches!(r, Role::Hrbp | Role::SystemLeader))
}

pub fn can_only_view_own_data(user: Option<&User>) -> bool {
    has_role(user, |r| r == Role::Employee)
}

pub fn can_create_standards(user: Option<&User>) -> bool {
    can_act(user, Resource::Standards, Action::Create)
}

pub fn can_edit_standards(user: Option<&User>) -> bool {
    can_act(user, Resource::Standards, Action::Edit)
}

/// Deletion is reserved to `Coe` and is not delegable
pub fn can_delete_standards(user: Option<&User>) -> bool {
    can_act(user, Resource::Standards, Action::Delete)
}

/// Systems the user is aware of.
///
/// Global roles and employees see the whole catalog (awareness, not edit
/// rights). System-bound roles see only their own system, and nothing at all
/// when that system is unset.
pub fn accessible_systems(user: Option<&User>, catalog: &SystemCatalog) -> BTreeSet<String> {
    let Some(user) = user else {
        return BTreeSet::new();
    };

    match scope_of(user.role) {
        Scope::Global | Scope::SelfOnly => catalog.iter().map(str::to_string).collect(),
        Scope::SystemBound => user.system().map(str::to_string).into_iter().collect(),
    }
}
