//! Session token stores.
//!
//! Two implementations of the [`TokenStore`] port: an in-memory store for
//! tests and ephemeral sessions, and a file-backed store that persists the
//! credential under a named key inside a capability-scoped profile
//! directory so a session survives a process restart.

use std::io;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::{debug, error};

use crate::domain::{SessionToken, TokenStore};

/// File name the credential is stored under, mirroring the browser storage
/// key the API contract names.
const TOKEN_KEY: &str = "token";

/// Volatile token store; the session ends with the process.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: RwLock<Option<SessionToken>>,
}

impl InMemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            token: RwLock::new(None),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get(&self) -> Option<SessionToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: SessionToken) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Token store persisting the credential inside a profile directory.
///
/// The directory handle is capability scoped: once opened, the store can
/// touch nothing outside the profile. Read failures behave as an absent
/// session; write failures are logged rather than surfaced, because the
/// port's contract is infallible and a failed persist only costs the user a
/// re-login after restart.
#[derive(Debug)]
pub struct FileTokenStore {
    profile: Dir,
}

impl FileTokenStore {
    /// Open (creating if needed) a profile directory and bind the store to
    /// it.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or opened.
    pub fn open(profile_dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(profile_dir)?;
        let profile = Dir::open_ambient_dir(profile_dir, ambient_authority())?;
        Ok(Self { profile })
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<SessionToken> {
        let raw = self.profile.read_to_string(TOKEN_KEY).ok()?;
        SessionToken::new(raw.trim()).ok()
    }

    fn set(&self, token: SessionToken) {
        if let Err(err) = self.profile.write(TOKEN_KEY, token.as_str()) {
            error!(error = %err, "failed to persist session token");
        } else {
            debug!("session token persisted");
        }
    }

    fn clear(&self) {
        match self.profile.remove_file(TOKEN_KEY) {
            Ok(()) => debug!("session token cleared"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => error!(error = %err, "failed to clear session token"),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Contract coverage for both stores.

    use super::*;

    fn token(raw: &str) -> SessionToken {
        SessionToken::new(raw).expect("non-empty token")
    }

    #[test]
    fn get_before_set_returns_none() {
        let store = InMemoryTokenStore::new();
        assert!(store.get().is_none());
    }

    #[test]
    fn set_then_clear_round_trips() {
        let store = InMemoryTokenStore::new();
        store.set(token("bearer-1"));
        assert_eq!(store.get(), Some(token("bearer-1")));
        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn file_store_survives_reopening_the_profile() {
        let profile = tempfile::tempdir().expect("temp profile dir");

        let store = FileTokenStore::open(profile.path()).expect("profile opens");
        assert!(store.get().is_none(), "fresh profile has no session");
        store.set(token("persisted-bearer"));
        drop(store);

        let reopened = FileTokenStore::open(profile.path()).expect("profile reopens");
        assert_eq!(reopened.get(), Some(token("persisted-bearer")));
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let profile = tempfile::tempdir().expect("temp profile dir");
        let store = FileTokenStore::open(profile.path()).expect("profile opens");

        store.clear();
        store.set(token("bearer-2"));
        store.clear();
        store.clear();
        assert!(store.get().is_none());
    }
}
