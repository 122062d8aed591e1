//! Session state and token persistence.
//!
//! [`SessionStore`] owns the bearer token, the signed-in username and the
//! active deposit address. The token is persisted through a [`TokenVault`]
//! (the OS keychain in production) so a restart resumes the session until
//! the user logs out.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Keychain service name used for the stored token.
const SERVICE: &str = "tidewatch";

/// Keychain entry holding the bearer token.
const TOKEN_ENTRY: &str = "session_token";

/// Durable storage for the session token.
pub trait TokenVault: Send {
    /// Returns the stored token, or `None` if nothing is stored.
    fn load(&self) -> Option<Zeroizing<String>>;

    /// Stores `token`, replacing any previous value.
    fn save(&mut self, token: &str) -> crate::Result<()>;

    /// Removes the stored token. Removing a missing token succeeds.
    fn delete(&mut self) -> crate::Result<()>;
}

/// [`TokenVault`] backed by the OS keychain.
#[derive(Debug, Default)]
pub struct KeychainVault;

impl KeychainVault {
    fn entry() -> crate::Result<keyring::Entry> {
        keyring::Entry::new(SERVICE, TOKEN_ENTRY)
            .map_err(|e| crate::TidewatchError::Keychain(format!("keyring entry error: {e}")))
    }
}

impl TokenVault for KeychainVault {
    fn load(&self) -> Option<Zeroizing<String>> {
        let entry = Self::entry().ok()?;
        match entry.get_password() {
            Ok(token) => Some(Zeroizing::new(token)),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, "failed to read keychain entry");
                None
            }
        }
    }

    fn save(&mut self, token: &str) -> crate::Result<()> {
        Self::entry()?
            .set_password(token)
            .map_err(|e| crate::TidewatchError::Keychain(format!("failed to save token: {e}")))
    }

    fn delete(&mut self) -> crate::Result<()> {
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(crate::TidewatchError::Keychain(format!(
                "failed to delete token: {e}"
            ))),
        }
    }
}

/// In-memory [`TokenVault`]. Clones share the same slot, so a test can keep
/// a handle to inspect what the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryVault {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryVault {
    /// Creates a vault pre-populated with `token`.
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.to_string()))),
        }
    }

    /// Returns a copy of the stored token.
    pub fn stored(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl TokenVault for MemoryVault {
    fn load(&self) -> Option<Zeroizing<String>> {
        self.stored().map(Zeroizing::new)
    }

    fn save(&mut self, token: &str) -> crate::Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| crate::TidewatchError::Keychain("memory vault poisoned".into()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn delete(&mut self) -> crate::Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| crate::TidewatchError::Keychain("memory vault poisoned".into()))?;
        *slot = None;
        Ok(())
    }
}

/// The signed-in session.
pub struct SessionStore {
    vault: Box<dyn TokenVault>,
    credential: Option<Zeroizing<String>>,
    username: Option<String>,
    active_address: Option<String>,
    /// Bumped on every set/clear so late responses can be discarded.
    epoch: u64,
}

impl SessionStore {
    /// Creates a store and restores any persisted token.
    pub fn restore(vault: Box<dyn TokenVault>) -> Self {
        let credential = vault.load();
        if credential.is_some() {
            debug!("restored session token from vault");
        }
        Self {
            vault,
            credential,
            username: None,
            active_address: None,
            epoch: 0,
        }
    }

    /// Starts a new session, persisting `credential`.
    ///
    /// The in-memory session is updated even if persisting fails; the
    /// error is returned so the caller can warn that it will not survive a
    /// restart.
    pub fn set_session(&mut self, credential: &str, username: &str) -> crate::Result<()> {
        self.credential = Some(Zeroizing::new(credential.to_string()));
        self.username = Some(username.to_string());
        self.active_address = None;
        self.epoch += 1;
        info!(username, "session started");
        self.vault.save(credential)
    }

    /// Ends the session, forgetting the token and active address.
    pub fn clear_session(&mut self) -> crate::Result<()> {
        self.credential = None;
        self.username = None;
        self.active_address = None;
        self.epoch += 1;
        info!("session cleared");
        self.vault.delete()
    }

    /// Returns `true` while a token is held.
    pub fn has_session(&self) -> bool {
        self.credential.is_some()
    }

    /// Returns the bearer token.
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref().map(String::as_str)
    }

    /// Returns the username, known only after an interactive login.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Records the address deposits are being watched for.
    pub fn set_active_address(&mut self, address: impl Into<String>) {
        self.active_address = Some(address.into());
    }

    /// Returns the address deposits are being watched for.
    pub fn active_address(&self) -> Option<&str> {
        self.active_address.as_deref()
    }

    /// Returns the current session epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_session", &self.has_session())
            .field("username", &self.username)
            .field("active_address", &self.active_address)
            .field("epoch", &self.epoch)
            .finish()
    }
}
