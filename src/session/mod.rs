//! Who is logged in.
//!
//! A [`SessionContext`] is created once by the composition root and handed
//! to every view. Views read the current user from it and never touch the
//! on-disk record directly; [`SessionContext::logout`] is the only way a
//! session ends.

mod store;

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::api::models::User;

pub use store::{SessionRecord, SessionStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Administrator access required")]
    NotAdmin,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Session file {path} is unreadable: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Shared handle on the current session.
#[derive(Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Option<User>>>,
    store: SessionStore,
}

impl SessionContext {
    /// Restore whatever the store holds. A corrupt record is logged and
    /// treated as logged out.
    pub fn restore(store: SessionStore) -> Self {
        let user = match store.load() {
            Ok(record) => record.map(|r| r.user),
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring unreadable session");
                None
            }
        };
        Self {
            current: Arc::new(RwLock::new(user)),
            store,
        }
    }

    pub fn current(&self) -> Option<User> {
        self.current.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.read().is_some()
    }

    /// The current user, or [`SessionError::NotLoggedIn`].
    pub fn require(&self) -> Result<User, SessionError> {
        self.current().ok_or(SessionError::NotLoggedIn)
    }

    pub fn require_admin(&self) -> Result<User, SessionError> {
        let user = self.require()?;
        if user.admin {
            Ok(user)
        } else {
            Err(SessionError::NotAdmin)
        }
    }

    /// Record a successful login, persisting it before readers see it.
    pub fn begin(&self, user: User) -> Result<(), SessionError> {
        let mut current = self.current.write();
        self.store.save(&SessionRecord {
            user: user.clone(),
            logged_in: true,
        })?;
        tracing::info!(user_id = user.user_id, username = %user.username, "Session started");
        *current = Some(user);
        Ok(())
    }

    /// Replace the stored user after a profile edit.
    pub fn refresh(&self, user: User) -> Result<(), SessionError> {
        let mut current = self.current.write();
        if current.is_none() {
            return Err(SessionError::NotLoggedIn);
        }
        self.store.save(&SessionRecord {
            user: user.clone(),
            logged_in: true,
        })?;
        *current = Some(user);
        Ok(())
    }

    /// End the session. Memory and disk are cleared under the same write
    /// lock, so no reader observes one without the other. The disk record
    /// goes first; if clearing it fails the session stays in memory too.
    pub fn logout(&self) -> Result<(), SessionError> {
        let mut current = self.current.write();
        self.store.clear()?;
        if current.take().is_some() {
            tracing::info!("Session ended");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user(admin: bool) -> User {
        serde_json::from_value(serde_json::json!({
            "user_id": 9,
            "username": "linus",
            "admin": admin
        }))
        .unwrap()
    }

    fn context(dir: &TempDir) -> SessionContext {
        SessionContext::restore(SessionStore::new(dir.path().join("session.json")))
    }

    #[test]
    fn empty_store_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        assert!(!ctx.is_logged_in());
        assert!(matches!(ctx.require(), Err(SessionError::NotLoggedIn)));
    }

    #[test]
    fn begin_persists_across_restore() {
        let dir = TempDir::new().unwrap();
        context(&dir).begin(user(false)).unwrap();

        let restored = context(&dir);
        assert_eq!(restored.require().unwrap().username, "linus");
    }

    #[test]
    fn logout_clears_memory_and_disk() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        ctx.begin(user(false)).unwrap();
        let other_view = ctx.clone();

        ctx.logout().unwrap();

        assert!(!other_view.is_logged_in());
        assert!(!context(&dir).is_logged_in());
    }

    #[test]
    fn failed_disk_clear_keeps_session() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        ctx.begin(user(false)).unwrap();

        // A directory where the record should be makes the clear fail.
        let path = dir.path().join("session.json");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(matches!(ctx.logout(), Err(SessionError::Io { .. })));
        assert!(ctx.is_logged_in());
    }

    #[test]
    fn admin_gate() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        ctx.begin(user(false)).unwrap();
        assert!(matches!(ctx.require_admin(), Err(SessionError::NotAdmin)));

        ctx.refresh(user(true)).unwrap();
        assert!(ctx.require_admin().is_ok());
    }

    #[test]
    fn corrupt_record_restores_as_logged_out() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("session.json"), "nope").unwrap();
        assert!(!context(&dir).is_logged_in());
    }
}
