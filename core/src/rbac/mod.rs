//! Role-Based Access Control (RBAC) for personnel records and qualification standards
//!
//! Roles map to scopes, scopes narrow record collections, and a fixed decision
//! table gates every action. All checks default to deny for an absent user.

pub mod audit;
pub mod capabilities;
pub mod config;
pub mod manager;
pub mod policy;
pub mod role;
pub mod scope_filter;
pub mod user;


pub use audit::{AuditLogEntry, AuditLogger, DEFAULT_AUDIT_CAPACITY, process_audit_logs};
pub use capabilities::Capabilities;
pub use config::{RbacConfig, SystemCatalog};
pub use manager::{PermissionResult, RbacManager};
pub use policy::{
    Action, Resource, accessible_systems, allowed_actions, can_act, can_create_standards,
    can_delete_standards, can_edit_standards, can_only_view_own_data, can_view_all_employees,
    can_view_system_employees, view_scope,
};
pub use role::{Role, Scope, scope_of};
pub use scope_filter::{ScopedRecord, filter_by_scope, is_visible, retain_by_scope};
pub use user::User;
