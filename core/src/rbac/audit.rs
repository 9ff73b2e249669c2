//! Audit logging for permission checks

use crate::rbac::manager::PermissionResult;
use crate::rbac::policy::{Action, Resource};
use crate::rbac::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Entries buffered before new ones are dropped
pub const DEFAULT_AUDIT_CAPACITY: usize = 1024;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Timestamp of the check
    pub timestamp: DateTime<Utc>,
    /// User ID, `None` for anonymous checks
    pub user_id: Option<String>,
    /// User role name
    pub role: Option<String>,
    pub resource: Resource,
    pub action: Action,
    /// Id of the record checked, if the check was record-level
    pub record: Option<String>,
    /// Result: "allowed" or "denied"
    pub result: String,
    /// Reason for denial
    pub reason: Option<String>,
}

/// Audit logger for RBAC decisions.
///
/// Permission checks never wait on the audit log: when the buffer is full or
/// the receiver is gone, the entry is dropped.
#[derive(Clone)]
pub struct AuditLogger {
    sender: mpsc::Sender<AuditLogEntry>,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new() -> (Self, mpsc::Receiver<AuditLogEntry>) {
        Self::with_capacity(DEFAULT_AUDIT_CAPACITY)
    }

    /// Create an audit logger buffering at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<AuditLogEntry>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Log a permission check
    pub fn log(
        &self,
        user: Option<&User>,
        resource: Resource,
        action: Action,
        record: Option<&str>,
        result: &PermissionResult,
    ) {
        let entry = AuditLogEntry {
            timestamp: Utc::now(),
            user_id: user.map(|u| u.id.clone()),
            role: user.map(|u| u.role.as_str().to_string()),
            resource,
            action,
            record: record.map(str::to_string),
            result: match result {
                PermissionResult::Allowed => "allowed".to_string(),
                PermissionResult::Denied(_) => "denied".to_string(),
            },
            reason: match result {
                PermissionResult::Allowed => None,
                PermissionResult::Denied(reason) => Some(reason.clone()),
            },
        };

        let summary = format!(
            "user={} role={} resource={} action={} result={}",
            entry.user_id.as_deref().unwrap_or("-"),
            entry.role.as_deref().unwrap_or("-"),
            entry.resource,
            entry.action,
            entry.result
        );

        match self.sender.try_send(entry) {
            Ok(()) => debug!("Audit: {}", summary),
            Err(TrySendError::Full(_)) => warn!("Audit buffer full, dropping: {}", summary),
            Err(TrySendError::Closed(_)) => debug!("Audit log closed, dropping: {}", summary),
        }
    }
}

/// Background task draining audit entries into tracing
pub async fn process_audit_logs(mut receiver: mpsc::Receiver<AuditLogEntry>) {
    while let Some(entry) = receiver.recv().await {
        tracing::info!(
            "RBAC Audit: user={} role={} resource={} action={} record={} result={} reason={:?}",
            entry.user_id.as_deref().unwrap_or("-"),
            entry.role.as_deref().unwrap_or("-"),
            entry.resource,
            entry.action,
            entry.record.as_deref().unwrap_or("-"),
            entry.result,
            entry.reason
        );
    }
}
