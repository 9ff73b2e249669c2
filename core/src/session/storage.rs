//! Persistence hooks for the authenticated user

use crate::error::SessionError;
use crate::rbac::User;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Fixed name the session is stored under
pub const DEFAULT_SESSION_KEY: &str = "talentscope_user";

const SESSION_SCHEMA_VERSION: u32 = 1;

/// Durable get/set/delete store for the session user
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, user: &User) -> Result<(), SessionError>;

    /// `Ok(None)` when nothing is stored, `Err(SessionError::Corrupt)` when the
    /// stored data cannot be decoded.
    async fn load(&self) -> Result<Option<User>, SessionError>;

    /// Remove the stored user. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    schema_version: u32,
    user: User,
}

pub(crate) fn encode_user(user: &User) -> Result<String, SessionError> {
    let stored = StoredSession {
        schema_version: SESSION_SCHEMA_VERSION,
        user: user.clone(),
    };
    serde_json::to_string(&stored).map_err(|e| SessionError::SaveFailed(e.to_string()))
}

pub(crate) fn decode_user(raw: &str) -> Result<User, SessionError> {
    let stored: StoredSession =
        serde_json::from_str(raw).map_err(|e| SessionError::Corrupt(e.to_string()))?;

    if stored.schema_version != SESSION_SCHEMA_VERSION {
        return Err(SessionError::Corrupt(format!(
            "Unsupported schema version {}",
            stored.schema_version
        )));
    }

    Ok(stored.user)
}

/// In-process key/value store
#[derive(Debug)]
pub struct MemorySessionStorage {
    key: String,
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store raw data under the session key, bypassing encoding
    pub fn insert_raw(&self, raw: impl Into<String>) {
        self.entries.lock().insert(self.key.clone(), raw.into());
    }

    /// Raw data currently stored under the session key
    pub fn raw(&self) -> Option<String> {
        self.entries.lock().get(&self.key).cloned()
    }
}

impl Default for MemorySessionStorage {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_KEY)
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn save(&self, user: &User) -> Result<(), SessionError> {
        let raw = encode_user(user)?;
        self.insert_raw(raw);
        Ok(())
    }

    async fn load(&self) -> Result<Option<User>, SessionError> {
        self.raw().map(|raw| decode_user(&raw)).transpose()
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.entries.lock().remove(&self.key);
        Ok(())
    }
}

/// One JSON file per session key inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileSessionStorage {
    path: PathBuf,
}

impl JsonFileSessionStorage {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        let path = dir.as_ref().join(format!("{}.json", safe_filename(key)));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStorage for JsonFileSessionStorage {
    async fn save(&self, user: &User) -> Result<(), SessionError> {
        let raw = encode_user(user)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::SaveFailed(e.to_string()))?;
        }

        // Write then rename so a reader never sees a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)
            .await
            .map_err(|e| SessionError::SaveFailed(e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| SessionError::SaveFailed(e.to_string()))
    }

    async fn load(&self) -> Result<Option<User>, SessionError> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => decode_user(&raw).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                Err(SessionError::Corrupt(e.to_string()))
            }
            Err(e) => Err(SessionError::LoadFailed(e.to_string())),
        }
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::ClearFailed(e.to_string())),
        }
    }
}

/// Convert a key to a safe filename
fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::Role;

    fn sample_users() -> Vec<User> {
        vec![
            User::new("EMP001", "张三", Role::Employee)
                .with_system("技术体系")
                .with_department("研发部"),
            User::new("EMP002", "钱七", Role::Employee),
            User::new("COE001", "王五", Role::Coe).with_department("人才发展中心"),
            User::new("COE002", "孙八", Role::Coe),
            User::new("HRBP001", "李四", Role::Hrbp).with_system("产品体系"),
            User::new("HRBP002", "周九", Role::Hrbp)
                .with_system("销售体系")
                .with_department("人力资源部"),
            User::new("SL001", "赵六", Role::SystemLeader).with_system("运营体系"),
        ]
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("talentscope_user"), "talentscope_user");
        assert_eq!(safe_filename("tenant:user/1"), "tenant_user_1");
    }

    #[tokio::test]
    async fn test_memory_round_trip_every_role() {
        let storage = MemorySessionStorage::default();
        for user in sample_users() {
            storage.save(&user).await.unwrap();
            assert_eq!(storage.load().await.unwrap(), Some(user));
        }
    }

    #[tokio::test]
    async fn test_memory_clear_is_idempotent() {
        let storage = MemorySessionStorage::default();
        storage.clear().await.unwrap();
        storage
            .save(&User::new("COE001", "王五", Role::Coe))
            .await
            .unwrap();
        storage.clear().await.unwrap();
        storage.clear().await.unwrap();
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_corrupt_data() {
        let storage = MemorySessionStorage::default();
        storage.insert_raw("{not json");
        assert!(matches!(storage.load().await, Err(SessionError::Corrupt(_))));

        storage.insert_raw(r#"{"schema_version":1,"user":{"id":"X","name":"X","role":"root"}}"#);
        assert!(matches!(storage.load().await, Err(SessionError::Corrupt(_))));

        storage.insert_raw(r#"{"schema_version":9,"user":{"id":"X","name":"X","role":"coe"}}"#);
        assert!(matches!(storage.load().await, Err(SessionError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_file_round_trip_every_role() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let storage = JsonFileSessionStorage::new(temp_dir.path(), DEFAULT_SESSION_KEY);

        assert_eq!(storage.load().await.unwrap(), None);

        for user in sample_users() {
            storage.save(&user).await.unwrap();
            assert_eq!(storage.load().await.unwrap(), Some(user));
        }

        storage.clear().await.unwrap();
        assert!(!storage.path().exists());
        assert_eq!(storage.load().await.unwrap(), None);
        storage.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_creates_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let storage = JsonFileSessionStorage::new(temp_dir.path().join("nested/sessions"), "user");
        storage
            .save(&User::new("EMP001", "张三", Role::Employee))
            .await
            .unwrap();
        assert!(storage.path().exists());
    }

    #[tokio::test]
    async fn test_file_corrupt_data() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let storage = JsonFileSessionStorage::new(temp_dir.path(), DEFAULT_SESSION_KEY);
        std::fs::write(storage.path(), "garbage").unwrap();
        assert!(matches!(storage.load().await, Err(SessionError::Corrupt(_))));
    }
}
