//! Session store holding the authenticated user
//!
//! One `SessionStore` is constructed per process and shared by handle
//! (`Arc<SessionStore>`). Transitions are serialized, and the user slot is
//! swapped in a single write so readers never see a half-built user.

pub mod identity;
pub mod storage;

use crate::error::{AuthError, SessionError};
use crate::rbac::{Role, Scope, User};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use identity::{
    AcceptAllVerifier, CannedProfiles, Credentials, IdentityVerifier, ProfileDirectory,
};
pub use storage::{
    DEFAULT_SESSION_KEY, JsonFileSessionStorage, MemorySessionStorage, SessionStorage,
};

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

/// Process-wide holder of at most one authenticated user
pub struct SessionStore {
    verifier: Arc<dyn IdentityVerifier>,
    profiles: Arc<dyn ProfileDirectory>,
    storage: Arc<dyn SessionStorage>,
    user: RwLock<Option<User>>,
    loading: AtomicBool,
    /// Serializes authenticate / load / end transitions
    transition: Arc<Mutex<()>>,
}

/// Clears the loading flag however `authenticate` exits, including cancellation
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// An in-flight save of a new login.
///
/// The save runs as its own task so it always finishes. If the owning
/// `authenticate` future is dropped before the in-memory swap, the prior
/// persisted session is written back once the save has settled. The
/// transition lock travels with the rollback, so no other transition can
/// observe the abandoned login.
struct PendingSave {
    storage: Arc<dyn SessionStorage>,
    prior: Option<User>,
    transition: Option<OwnedMutexGuard<()>>,
    save: Option<JoinHandle<Result<(), SessionError>>>,
    settled: bool,
}

impl PendingSave {
    fn start(
        storage: Arc<dyn SessionStorage>,
        user: User,
        prior: Option<User>,
        transition: OwnedMutexGuard<()>,
    ) -> Self {
        let save = {
            let storage = storage.clone();
            tokio::spawn(async move { storage.save(&user).await })
        };
        Self {
            storage,
            prior,
            transition: Some(transition),
            save: Some(save),
            settled: false,
        }
    }

    /// Wait for the save task to finish
    async fn wait(&mut self) -> Result<(), SessionError> {
        let Some(handle) = self.save.as_mut() else {
            return Ok(());
        };
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(SessionError::SaveFailed(format!("save task failed: {}", e))),
        };
        self.save = None;
        result
    }

    /// The outcome has been applied in memory; nothing to roll back
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for PendingSave {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!("Login cancelled during save with no runtime to restore the prior session");
            return;
        };

        let storage = self.storage.clone();
        let prior = self.prior.take();
        let transition = self.transition.take();
        let save = self.save.take();
        runtime.spawn(async move {
            let _transition = transition;
            if let Some(save) = save {
                let _ = save.await;
            }
            let restored = match &prior {
                Some(user) => storage.save(user).await,
                None => storage.clear().await,
            };
            match restored {
                Ok(()) => debug!("Restored prior session after cancelled login"),
                Err(e) => warn!("Failed to restore prior session after cancelled login: {}", e),
            }
        });
    }
}

impl SessionStore {
    /// Create an empty store persisting through `storage`, using the stub
    /// verifier and the canned profile fixture
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            verifier: Arc::new(AcceptAllVerifier),
            profiles: Arc::new(CannedProfiles::default()),
            storage,
            user: RwLock::new(None),
            loading: AtomicBool::new(false),
            transition: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn IdentityVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_profiles(mut self, profiles: Arc<dyn ProfileDirectory>) -> Self {
        self.profiles = profiles;
        self
    }

    /// Authenticate a user under `role`.
    ///
    /// `system` overrides the profile's system; blank values count as absent.
    /// On any failure, or if the future is dropped, the previous session is
    /// left untouched, both in memory and in storage.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
        role: Role,
        system: Option<&str>,
    ) -> Result<User, AuthError> {
        let username = credentials.username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }

        let transition = self.transition.clone().lock_owned().await;
        let _loading = LoadingGuard::enter(&self.loading);

        if !self.verifier.verify(username, &credentials.password).await? {
            warn!("Credentials rejected for '{}'", username);
            return Err(AuthError::CredentialsRejected);
        }

        let mut user = self.profiles.profile(username, role).await?;
        if user.role != role {
            return Err(AuthError::Provider(format!(
                "Profile for '{}' has role '{}', expected '{}'",
                username, user.role, role
            )));
        }

        if let Some(system) = system.map(str::trim).filter(|s| !s.is_empty()) {
            user.system = Some(system.to_string());
        }

        if user.scope() == Scope::SystemBound && user.system().is_none() {
            return Err(AuthError::MissingSystem(role));
        }

        let mut pending =
            PendingSave::start(self.storage.clone(), user.clone(), self.current(), transition);
        let saved = pending.wait().await;
        if saved.is_ok() {
            *self.user.write() = Some(user.clone());
        }
        pending.settle();
        saved?;

        info!(
            "Authenticated '{}' as {} (system: {})",
            user.id,
            user.role,
            user.system().unwrap_or("-")
        );
        Ok(user)
    }

    /// Restore the persisted user at startup.
    ///
    /// Corrupt data is discarded and treated as no session.
    pub async fn load_session(&self) -> Option<User> {
        let _transition = self.transition.lock().await;

        match self.storage.load().await {
            Ok(Some(user)) => {
                info!("Restored session for '{}' ({})", user.id, user.role);
                *self.user.write() = Some(user.clone());
                Some(user)
            }
            Ok(None) => {
                debug!("No persisted session");
                None
            }
            Err(SessionError::Corrupt(reason)) => {
                warn!("Discarding corrupt session data: {}", reason);
                if let Err(e) = self.storage.clear().await {
                    warn!("Failed to discard corrupt session data: {}", e);
                }
                None
            }
            Err(e) => {
                warn!("Failed to load session: {}", e);
                None
            }
        }
    }

    /// Clear the in-memory user and the persisted copy. Idempotent.
    ///
    /// The in-memory user is cleared even when the persisted copy cannot be.
    pub async fn end_session(&self) -> Result<(), SessionError> {
        let _transition = self.transition.lock().await;

        if let Some(user) = self.user.write().take() {
            info!("Ending session for '{}'", user.id);
        }
        self.storage.clear().await
    }

    pub fn current(&self) -> Option<User> {
        self.user.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.read().is_some()
    }

    /// True only while an `authenticate` call is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SessionState {
        let user = self.current();
        SessionState {
            is_authenticated: user.is_some(),
            user,
            is_loading: self.is_loading(),
        }
    }
}
