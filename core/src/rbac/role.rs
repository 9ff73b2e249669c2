//! Role definitions and the role → scope mapping

use crate::error::UnknownName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four roles an authenticated actor can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular employee - sees only their own personnel record
    Employee,
    /// Center-of-excellence cadre reviewer - unrestricted
    Coe,
    /// HR business partner - bound to one system
    Hrbp,
    /// System executive - bound to one system
    SystemLeader,
}

/// Breadth of records a role may see or act upon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Every record
    Global,
    /// Records whose system tag equals the user's system
    SystemBound,
    /// The single record owned by the user
    SelfOnly,
}

/// Map a role to its scope.
///
/// Exhaustive on purpose: adding a role does not compile until it is mapped here.
pub fn scope_of(role: Role) -> Scope {
    match role {
        Role::Coe => Scope::Global,
        Role::Hrbp | Role::SystemLeader => Scope::SystemBound,
        Role::Employee => Scope::SelfOnly,
    }
}

impl Role {
    /// Every role, in display order
    pub const ALL: [Role; 4] = [Role::Employee, Role::Coe, Role::Hrbp, Role::SystemLeader];

    /// Get role name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Coe => "coe",
            Role::Hrbp => "hrbp",
            Role::SystemLeader => "system_leader",
        }
    }

    /// Title shown to end users
    pub fn label(&self) -> &'static str {
        match self {
            Role::Employee => "员工",
            Role::Coe => "COE",
            Role::Hrbp => "HRBP",
            Role::SystemLeader => "体系负责人",
        }
    }

    pub fn scope(&self) -> Scope {
        scope_of(*self)
    }
}

/// Parse role from string (case-insensitive)
impl FromStr for Role {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "coe" => Ok(Role::Coe),
            "hrbp" => Ok(Role::Hrbp),
            "system_leader" | "systemleader" | "system-leader" => Ok(Role::SystemLeader),
            _ => Err(UnknownName {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::Global => "global",
            Scope::SystemBound => "system_bound",
            Scope::SelfOnly => "self_only",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_of_each_role() {
        assert_eq!(scope_of(Role::Coe), Scope::Global);
        assert_eq!(scope_of(Role::Hrbp), Scope::SystemBound);
        assert_eq!(scope_of(Role::SystemLeader), Scope::SystemBound);
        assert_eq!(scope_of(Role::Employee), Scope::SelfOnly);
    }

    #[test]
    fn test_scope_of_is_stable() {
        for role in Role::ALL {
            assert_eq!(scope_of(role), scope_of(role));
            assert_eq!(role.scope(), scope_of(role));
        }
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("employee".parse::<Role>(), Ok(Role::Employee));
        assert_eq!("COE".parse::<Role>(), Ok(Role::Coe));
        assert_eq!("Hrbp".parse::<Role>(), Ok(Role::Hrbp));
        assert_eq!("system_leader".parse::<Role>(), Ok(Role::SystemLeader));
        assert_eq!("systemLeader".parse::<Role>(), Ok(Role::SystemLeader));
        assert_eq!(" system-leader ".parse::<Role>(), Ok(Role::SystemLeader));

        let err = "admin".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown role 'admin'");
    }

    #[test]
    fn test_role_display_matches_serde() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role));
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn test_unknown_role_fails_to_deserialize() {
        assert!(serde_json::from_str::<Role>("\"superadmin\"").is_err());
    }
}
