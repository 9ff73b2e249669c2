//! Authenticated user identity

use crate::rbac::role::{Role, Scope, scope_of};
use serde::{Deserialize, Serialize};

/// An authenticated actor.
///
/// `system` is fixed at authentication time and is the scoping key for
/// system-bound roles. An empty string is treated exactly like an absent value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, matched against record owner ids
    pub id: String,
    /// Display name
    pub name: String,
    /// Role assigned at authentication
    pub role: Role,
    /// Organizational system (business line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Department within the system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            system: None,
            department: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn scope(&self) -> Scope {
        scope_of(self.role)
    }

    /// The user's system, or `None` when unset or empty
    pub fn system(&self) -> Option<&str> {
        self.system.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_system_reads_as_none() {
        let user = User::new("HR001", "李四", Role::Hrbp).with_system("");
        assert_eq!(user.system(), None);

        let user = User::new("HR001", "李四", Role::Hrbp).with_system("技术体系");
        assert_eq!(user.system(), Some("技术体系"));
    }

    #[test]
    fn test_optional_fields_omitted_when_absent() {
        let user = User::new("EMP001", "张三", Role::Employee);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("department").is_none());
        assert_eq!(json["role"], "employee");
    }
}
