//! RBAC configuration structures

use crate::rbac::audit::DEFAULT_AUDIT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Known organizational systems, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemCatalog(Vec<String>);

impl SystemCatalog {
    pub fn new<I, S>(systems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(systems.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, system: &str) -> bool {
        self.0.iter().any(|s| s == system)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SystemCatalog {
    fn default() -> Self {
        Self::new(["技术体系", "产品体系", "销售体系", "运营体系"])
    }
}

/// RBAC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    /// Catalog of known systems
    #[serde(default)]
    pub systems: SystemCatalog,
    /// Whether permission checks are sent to the audit log. Off unless the
    /// caller drains the receiver returned by `RbacManager::from_config`.
    #[serde(default)]
    pub audit: bool,
    /// Audit entries buffered before new ones are dropped
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            systems: SystemCatalog::default(),
            audit: false,
            audit_capacity: default_audit_capacity(),
        }
    }
}

fn default_audit_capacity() -> usize {
    DEFAULT_AUDIT_CAPACITY
}

impl RbacConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.systems.is_empty() {
            return Err("System catalog must not be empty".to_string());
        }

        let mut seen = HashSet::new();
        for system in self.systems.iter() {
            if system.trim().is_empty() {
                return Err("System catalog contains a blank name".to_string());
            }
            if !seen.insert(system) {
                return Err(format!("System '{}' is listed more than once", system));
            }
        }

        if self.audit && self.audit_capacity == 0 {
            return Err("audit_capacity must be greater than 0".to_string());
        }

        Ok(())
    }
}
