//! Capability flags consumed by UI layers

use crate::rbac::config::SystemCatalog;
use crate::rbac::policy::{
    accessible_systems, can_create_standards, can_delete_standards, can_edit_standards,
    can_only_view_own_data, can_view_all_employees, can_view_system_employees,
};
use crate::rbac::role::Scope;
use crate::rbac::user::User;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Snapshot of everything a user may do, computed once per render.
///
/// The default value is the anonymous snapshot: every flag false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub scope: Option<Scope>,
    pub can_view_all_employees: bool,
    pub can_view_system_employees: bool,
    pub can_only_view_own_data: bool,
    pub can_create_standards: bool,
    pub can_edit_standards: bool,
    pub can_delete_standards: bool,
    pub accessible_systems: BTreeSet<String>,
}

impl Capabilities {
    pub fn for_user(user: Option<&User>, catalog: &SystemCatalog) -> Self {
        Self {
            scope: user.map(User::scope),
            can_view_all_employees: can_view_all_employees(user),
            can_view_system_employees: can_view_system_employees(user),
            can_only_view_own_data: can_only_view_own_data(user),
            can_create_standards: can_create_standards(user),
            can_edit_standards: can_edit_standards(user),
            can_delete_standards: can_delete_standards(user),
            accessible_systems: accessible_systems(user, catalog),
        }
    }
}
