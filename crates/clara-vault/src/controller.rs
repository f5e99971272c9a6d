use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use clara_utils::error::{ValidationError, VaultError};

use crate::cipher::{self, MAGIC_TAG};
use crate::store::VaultStore;

static PIN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("valid regex"));

/// Check that `pin` is exactly six ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if PIN_PATTERN.is_match(pin) {
        Ok(())
    } else {
        Err(ValidationError::MalformedPin)
    }
}

/// Session state of the vault. The plaintext secret only exists in `Unlocked`.
#[derive(Clone, PartialEq, Eq)]
pub enum VaultState {
    /// No record stored.
    Unset,
    /// A record is stored; the secret is not in memory.
    Locked,
    Unlocked { secret: String },
}

impl VaultState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Locked => "locked",
            Self::Unlocked { .. } => "unlocked",
        }
    }
}

impl fmt::Debug for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "Unset"),
            Self::Locked => write!(f, "Locked"),
            Self::Unlocked { secret } => f
                .debug_struct("Unlocked")
                .field("secret_len", &secret.len())
                .finish(),
        }
    }
}

impl fmt::Display for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// PIN-gated vault over a single [`VaultStore`] slot.
///
/// ```rust
/// use std::sync::Arc;
/// use clara_vault::{MemoryVaultStore, VaultController, VaultState};
///
/// let mut vault = VaultController::open(Arc::new(MemoryVaultStore::new()))?;
/// vault.save("sk-test-123", "482913")?;
/// assert_eq!(vault.state(), &VaultState::Locked);
/// assert_eq!(vault.unlock("482913")?, "sk-test-123");
/// # Ok::<(), clara_utils::error::VaultError>(())
/// ```
pub struct VaultController {
    store: Arc<dyn VaultStore>,
    state: VaultState,
    pending_pin: String,
}

impl VaultController {
    /// Build a controller whose initial state reflects the store:
    /// `Locked` if a record exists, `Unset` otherwise.
    pub fn open(store: Arc<dyn VaultStore>) -> Result<Self, VaultError> {
        let state = if store.exists()? {
            VaultState::Locked
        } else {
            VaultState::Unset
        };
        debug!(state = %state, "Vault opened");
        Ok(Self {
            store,
            state,
            pending_pin: String::new(),
        })
    }

    /// Encode `secret` under `pin` and replace the stored record.
    ///
    /// Input is validated before the store is touched. The secret is stored
    /// as given; only a secret that is blank after trimming is rejected.
    /// The vault ends `Locked` and the pending PIN is cleared.
    pub fn save(&mut self, secret: &str, pin: &str) -> Result<(), VaultError> {
        validate_pin(pin)?;
        if secret.trim().is_empty() {
            return Err(ValidationError::EmptySecret.into());
        }

        let payload = format!("{MAGIC_TAG}{secret}");
        let record = cipher::encode(&payload, pin);
        self.store.store(&record)?;

        self.state = VaultState::Locked;
        self.pending_pin.clear();
        info!(secret_len = secret.len(), "API key saved to vault");
        Ok(())
    }

    /// Decode the stored record with `pin` and return the secret.
    ///
    /// A wrong PIN leaves the record untouched and the vault `Locked`.
    /// There is no attempt counter.
    pub fn unlock(&mut self, pin: &str) -> Result<String, VaultError> {
        validate_pin(pin)?;

        if matches!(self.state, VaultState::Unlocked { .. }) {
            return Err(VaultError::NotLocked);
        }

        let Some(record) = self.store.load()? else {
            self.state = VaultState::Unset;
            return Err(VaultError::NoRecord);
        };

        let plaintext = cipher::decode(&record, pin);
        self.pending_pin.clear();

        match plaintext.strip_prefix(MAGIC_TAG) {
            Some(secret) => {
                let secret = secret.to_string();
                self.state = VaultState::Unlocked {
                    secret: secret.clone(),
                };
                info!(secret_len = secret.len(), "Vault unlocked");
                Ok(secret)
            }
            None => {
                self.state = VaultState::Locked;
                warn!("Vault unlock rejected: invalid PIN");
                Err(VaultError::InvalidPin)
            }
        }
    }

    /// Drop the plaintext secret. Idempotent.
    pub fn lock(&mut self) {
        self.state = if self.has_stored_secret() {
            VaultState::Locked
        } else {
            VaultState::Unset
        };
        debug!(state = %self.state, "Vault locked");
    }

    /// Delete the stored record and reset to `Unset`.
    ///
    /// Callers are expected to have confirmed the deletion with the user.
    pub fn clear(&mut self) -> Result<(), VaultError> {
        self.store.remove()?;
        self.state = VaultState::Unset;
        self.pending_pin.clear();
        info!("Vault cleared");
        Ok(())
    }

    /// Whether a record exists. Does not decode anything.
    ///
    /// When the store cannot be read the answer follows the current state, so
    /// a locked or unlocked vault never reports a missing record.
    #[must_use]
    pub fn has_stored_secret(&self) -> bool {
        match self.store.exists() {
            Ok(exists) => exists,
            Err(e) => {
                warn!(error = %e, "Could not check vault record");
                self.state != VaultState::Unset
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> &VaultState {
        &self.state
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, VaultState::Unlocked { .. })
    }

    /// The secret, only while unlocked.
    #[must_use]
    pub fn plaintext_secret(&self) -> Option<&str> {
        match &self.state {
            VaultState::Unlocked { secret } => Some(secret),
            _ => None,
        }
    }

    #[must_use]
    pub fn pending_pin(&self) -> &str {
        &self.pending_pin
    }

    pub fn set_pending_pin(&mut self, pin: impl Into<String>) {
        self.pending_pin = pin.into();
    }
}

impl fmt::Debug for VaultController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultController")
            .field("state", &self.state)
            .field("pending_pin_len", &self.pending_pin.len())
            .finish_non_exhaustive()
    }
}
