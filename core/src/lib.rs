//! TalentScope Core Library
//!
//! Role-based access control for personnel records and qualification
//! standards: who is signed in, what they may do, and which records they may
//! see.

pub mod config;
pub mod error;
pub mod rbac;
pub mod records;
pub mod session;

// Re-exports for convenience
pub use config::{
    Config, SessionBackend, SessionConfig, get_config_dir, get_config_path, get_data_dir,
    load_config, load_config_from, save_config, save_config_to,
};
pub use error::*;
pub use rbac::{
    Action, Capabilities, PermissionResult, RbacConfig, RbacManager, Resource, Role, Scope,
    ScopedRecord, SystemCatalog, User, filter_by_scope, scope_of,
};
pub use records::{PersonnelRecord, QualificationStandard};
pub use session::{
    Credentials, JsonFileSessionStorage, MemorySessionStorage, SessionState, SessionStorage,
    SessionStore,
};
