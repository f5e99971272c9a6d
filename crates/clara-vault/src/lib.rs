//! PIN-gated storage for a single API key.
//!
//! [`VaultController`] is the state machine (`Unset`, `Locked`, `Unlocked`).
//! It persists through a [`VaultStore`] handed in by the caller, so the same
//! controller runs against a file on disk or an in-memory slot in tests.
//!
//! The at-rest transform in [`cipher`] is a cyclic XOR with the PIN followed
//! by base64. It is obfuscation kept for compatibility with records written
//! by the web client, not encryption.

pub mod cipher;
mod controller;
mod store;

pub use cipher::{MAGIC_TAG, decode, encode};
pub use controller::{VaultController, VaultState, validate_pin};
pub use store::{FileVaultStore, MemoryVaultStore, VaultStore};
