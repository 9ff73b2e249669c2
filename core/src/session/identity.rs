//! Identity verification and profile lookup hooks used by `authenticate`

use crate::error::AuthError;
use crate::rbac::{Role, User};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

/// Username and password supplied at login
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Checks a username/password pair against an identity provider
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// `Ok(false)` means the credentials were rejected; `Err` means the
    /// provider could not answer.
    async fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError>;
}

/// Accepts any non-empty username. Authorization is driven by the selected
/// role, so this stands in until a real identity provider is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllVerifier;

#[async_trait]
impl IdentityVerifier for AcceptAllVerifier {
    async fn verify(&self, username: &str, _password: &str) -> Result<bool, AuthError> {
        Ok(!username.trim().is_empty())
    }
}

/// Resolves the user profile for a login under a given role
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn profile(&self, username: &str, role: Role) -> Result<User, AuthError>;
}

/// One fixed profile per role.
///
/// A fixture for demos and tests; production deployments look profiles up in
/// an HR system.
#[derive(Debug, Clone)]
pub struct CannedProfiles {
    profiles: HashMap<Role, User>,
}

impl CannedProfiles {
    pub fn new(profiles: impl IntoIterator<Item = User>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|u| (u.role, u)).collect(),
        }
    }
}

impl Default for CannedProfiles {
    fn default() -> Self {
        Self::new([
            User::new("EMP001", "张三", Role::Employee)
                .with_system("技术体系")
                .with_department("研发部"),
            User::new("COE001", "王五", Role::Coe).with_department("人才发展中心"),
            User::new("HRBP001", "李四", Role::Hrbp)
                .with_system("技术体系")
                .with_department("人力资源部"),
            User::new("SL001", "赵六", Role::SystemLeader)
                .with_system("技术体系")
                .with_department("技术体系办公室"),
        ])
    }
}

#[async_trait]
impl ProfileDirectory for CannedProfiles {
    async fn profile(&self, _username: &str, role: Role) -> Result<User, AuthError> {
        self.profiles
            .get(&role)
            .cloned()
            .ok_or_else(|| {
                AuthError::Provider(format!("No profile configured for role '{}'", role))
            })
    }
}
