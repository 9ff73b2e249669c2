//! RBAC Manager - permission checking façade over the decision table

use crate::error::PermissionDenied;
use crate::rbac::audit::{AuditLogEntry, AuditLogger};
use crate::rbac::capabilities::Capabilities;
use crate::rbac::config::{RbacConfig, SystemCatalog};
use crate::rbac::policy::{self, Action, Resource, allowed_actions, view_scope};
use crate::rbac::role::Scope;
use crate::rbac::scope_filter::{ScopedRecord, filter_by_scope, is_visible};
use crate::rbac::user::User;
use std::collections::BTreeSet;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Result of a permission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionResult {
    /// Permission granted
    Allowed,
    /// Permission denied with reason
    Denied(String),
}

impl PermissionResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PermissionResult::Allowed)
    }
}

/// RBAC Manager for permission checking.
///
/// Holds only immutable configuration; every decision is derived from the
/// user passed in.
pub struct RbacManager {
    catalog: SystemCatalog,
    audit: Option<AuditLogger>,
}

impl RbacManager {
    /// Create a new RBAC manager
    pub fn new(catalog: SystemCatalog) -> Self {
        Self {
            catalog,
            audit: None,
        }
    }

    /// Create a manager from config, returning the audit receiver when auditing is on
    pub fn from_config(config: &RbacConfig) -> (Self, Option<mpsc::Receiver<AuditLogEntry>>) {
        let manager = Self::new(config.systems.clone());
        if config.audit {
            let (logger, receiver) = AuditLogger::with_capacity(config.audit_capacity);
            (manager.with_audit(logger), Some(receiver))
        } else {
            (manager, None)
        }
    }

    pub fn with_audit(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    pub fn catalog(&self) -> &SystemCatalog {
        &self.catalog
    }

    /// Check permission for a resource and action
    pub fn check_permission(
        &self,
        user: Option<&User>,
        resource: Resource,
        action: Action,
    ) -> PermissionResult {
        let result = Self::evaluate(user, resource, action);
        self.record(user, resource, action, None, &result);
        result
    }

    /// Check permission for an action against one specific record.
    ///
    /// Views are additionally narrowed to the role's scope for that resource.
    pub fn check_record<R: ScopedRecord + ?Sized>(
        &self,
        user: Option<&User>,
        resource: Resource,
        action: Action,
        record: &R,
    ) -> PermissionResult {
        let mut result = Self::evaluate(user, resource, action);

        if let (PermissionResult::Allowed, Some(u)) = (&result, user) {
            let scope = view_scope(u.role, resource);
            if action == Action::View && scope != Scope::Global && !is_visible(user, record) {
                result = PermissionResult::Denied(format!(
                    "Record is outside the {} scope of user '{}'",
                    scope, u.id
                ));
            }
        }

        self.record(user, resource, action, record.record_id(), &result);
        result
    }

    /// Boolean form of [`check_permission`](Self::check_permission)
    pub fn can_act(&self, user: Option<&User>, resource: Resource, action: Action) -> bool {
        self.check_permission(user, resource, action).is_allowed()
    }

    /// Gate a request, turning a denial into an error
    pub fn authorize(
        &self,
        user: Option<&User>,
        resource: Resource,
        action: Action,
    ) -> Result<(), PermissionDenied> {
        match self.check_permission(user, resource, action) {
            PermissionResult::Allowed => Ok(()),
            PermissionResult::Denied(reason) => Err(PermissionDenied {
                resource,
                action,
                reason,
            }),
        }
    }

    /// Gate a request on a specific record
    pub fn authorize_record<R: ScopedRecord + ?Sized>(
        &self,
        user: Option<&User>,
        resource: Resource,
        action: Action,
        record: &R,
    ) -> Result<(), PermissionDenied> {
        match self.check_record(user, resource, action, record) {
            PermissionResult::Allowed => Ok(()),
            PermissionResult::Denied(reason) => Err(PermissionDenied {
                resource,
                action,
                reason,
            }),
        }
    }

    /// Personnel records the user may see
    pub fn visible_personnel<'a, R: ScopedRecord>(
        &self,
        user: Option<&User>,
        records: &'a [R],
    ) -> Vec<&'a R> {
        filter_by_scope(user, records)
    }

    /// Standards the user may see: all of them once authenticated
    pub fn visible_standards<'a, R>(&self, user: Option<&User>, records: &'a [R]) -> Vec<&'a R> {
        if policy::can_act(user, Resource::Standards, Action::View) {
            records.iter().collect()
        } else {
            Vec::new()
        }
    }

    pub fn accessible_systems(&self, user: Option<&User>) -> BTreeSet<String> {
        policy::accessible_systems(user, &self.catalog)
    }

    pub fn capabilities(&self, user: Option<&User>) -> Capabilities {
        Capabilities::for_user(user, &self.catalog)
    }

    fn evaluate(user: Option<&User>, resource: Resource, action: Action) -> PermissionResult {
        let Some(u) = user else {
            warn!("Denying {} on {}: no authenticated user", action, resource);
            return PermissionResult::Denied("No authenticated user".to_string());
        };

        if allowed_actions(u.role, resource).contains(&action) {
            debug!("Allowing {} on {} for user '{}' ({})", action, resource, u.id, u.role);
            PermissionResult::Allowed
        } else {
            debug!("Denying {} on {} for user '{}' ({})", action, resource, u.id, u.role);
            PermissionResult::Denied(format!(
                "Role '{}' may not {} {}",
                u.role, action, resource
            ))
        }
    }

    fn record(
        &self,
        user: Option<&User>,
        resource: Resource,
        action: Action,
        record: Option<&str>,
        result: &PermissionResult,
    ) {
        if let Some(audit) = &self.audit {
            audit.log(user, resource, action, record, result);
        }
    }
}

impl Default for RbacManager {
    fn default() -> Self {
        Self::new(SystemCatalog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::role::Role;

    #[test]
    fn test_check_permission_allowed() {
        let manager = RbacManager::default();
        let coe = User::new("COE001", "王五", Role::Coe);
        assert_eq!(
            manager.check_permission(Some(&coe), Resource::Standards, Action::Delete),
            PermissionResult::Allowed
        );
    }

    #[test]
    fn test_check_permission_denied() {
        let manager = RbacManager::default();
        let hrbp = User::new("HR001", "李四", Role::Hrbp).with_system("技术体系");
        match manager.check_permission(Some(&hrbp), Resource::Standards, Action::Delete) {
            PermissionResult::Denied(reason) => assert!(reason.contains("hrbp")),
            _ => panic!("Expected denied"),
        }
    }

    #[test]
    fn test_authorize_returns_error() {
        let manager = RbacManager::default();
        let err = manager
            .authorize(None, Resource::Standards, Action::View)
            .unwrap_err();
        assert_eq!(err.resource, Resource::Standards);
        assert_eq!(err.action, Action::View);
    }
}
