//! Consumer credentials and the stores that hold them.
//!
//! The client never persists credentials itself; it reads them through a
//! [`CredentialStore`] supplied by the caller.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Environment variable holding the consumer key.
pub const CONSUMER_KEY_VAR: &str = "WORKFORCE_CONSUMER_KEY";
/// Environment variable holding the consumer secret.
pub const CONSUMER_SECRET_VAR: &str = "WORKFORCE_CONSUMER_SECRET";

/// Consumer key/secret pair exchanged for access tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub key: String,
    pub secret: String,
}

impl Credential {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Both halves must be non-empty for the credential to be usable.
    pub fn is_complete(&self) -> bool {
        !self.key.trim().is_empty() && !self.secret.trim().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Where the acting user's credential lives.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credential, if any.
    fn get(&self) -> Option<Credential>;

    /// Replaces the stored credential.
    fn set(&self, credential: Credential);

    /// Removes the stored credential.
    fn clear(&self);
}

/// Returns true if the store holds a complete credential.
pub fn has_credential(store: &dyn CredentialStore) -> bool {
    store.get().is_some_and(|c| c.is_complete())
}

/// In-memory store, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: RwLock::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.credential.read().unwrap().clone()
    }

    fn set(&self, credential: Credential) {
        *self.credential.write().unwrap() = Some(credential);
    }

    fn clear(&self) {
        *self.credential.write().unwrap() = None;
    }
}

/// Reads the credential from a pair of environment variables.
///
/// `set` and `clear` only affect this process: an explicit value set here
/// shadows the environment, and `clear` hides it until the next `set`.
#[derive(Debug)]
pub struct EnvCredentialStore {
    key_var: String,
    secret_var: String,
    state: RwLock<Override>,
}

#[derive(Debug, Clone)]
enum Override {
    None,
    Set(Credential),
    Cleared,
}

impl EnvCredentialStore {
    /// Uses [`CONSUMER_KEY_VAR`] and [`CONSUMER_SECRET_VAR`].
    pub fn new() -> Self {
        Self::with_vars(CONSUMER_KEY_VAR, CONSUMER_SECRET_VAR)
    }

    pub fn with_vars(key_var: impl Into<String>, secret_var: impl Into<String>) -> Self {
        Self {
            key_var: key_var.into(),
            secret_var: secret_var.into(),
            state: RwLock::new(Override::None),
        }
    }

    fn from_env(&self) -> Option<Credential> {
        let key = std::env::var(&self.key_var).ok()?;
        let secret = std::env::var(&self.secret_var).ok()?;
        Some(Credential::new(key.trim(), secret.trim()))
    }
}

impl Default for EnvCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for EnvCredentialStore {
    fn get(&self) -> Option<Credential> {
        match self.state.read().unwrap().clone() {
            Override::Set(credential) => Some(credential),
            Override::Cleared => None,
            Override::None => self.from_env(),
        }
    }

    fn set(&self, credential: Credential) {
        *self.state.write().unwrap() = Override::Set(credential);
    }

    fn clear(&self) {
        *self.state.write().unwrap() = Override::Cleared;
    }
}
