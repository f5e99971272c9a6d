//! Property-based tests for clara
//!
//! Verifies the vault and cipher invariants across generated secrets and PINs.
//!
//! ## Configuration
//!
//! Property test case counts can be configured via environment variables:
//!
//! - `PROPTEST_CASES`: Number of test cases per property (default: 64)
//! - `PROPTEST_MAX_SHRINK_ITERS`: Max shrinking iterations on failure (default: 1000)
//!
//! ```bash
//! PROPTEST_CASES=256 cargo test --test property_based_tests
//! ```

use proptest::prelude::*;
use std::env;
use std::sync::Arc;

use clara_utils::error::{ValidationError, VaultError};
use clara_utils::logging::mask_secret;
use clara_vault::{
    MAGIC_TAG, MemoryVaultStore, VaultController, VaultState, VaultStore, decode, encode,
};

/// Default number of test cases per property.
const DEFAULT_PROPTEST_CASES: u32 = 64;

/// Default max shrink iterations.
const DEFAULT_MAX_SHRINK_ITERS: u32 = 1000;

/// Creates a ProptestConfig that respects environment variables.
///
/// `max_cases` caps the case count for slow properties even when
/// `PROPTEST_CASES` asks for more.
fn proptest_config(max_cases: Option<u32>) -> ProptestConfig {
    let env_cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_PROPTEST_CASES);

    let env_shrink_iters = env::var("PROPTEST_MAX_SHRINK_ITERS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_MAX_SHRINK_ITERS);

    let cases = match max_cases {
        Some(max) => env_cases.min(max),
        None => env_cases,
    };

    ProptestConfig {
        cases,
        max_shrink_iters: env_shrink_iters,
        max_shrink_time: 30000,
        ..ProptestConfig::default()
    }
}

fn arb_pin() -> impl Strategy<Value = String> {
    "[0-9]{6}"
}

/// API-key-like secrets, never blank.
fn arb_secret() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,64}"
}

fn arb_malformed_pin() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{0,5}",
        "[0-9]{7,10}",
        "[0-9]{0,5}[a-zA-Z ][0-9]{0,5}".prop_filter("six chars", |s| s.len() == 6),
    ]
}

fn open_vault() -> (VaultController, Arc<MemoryVaultStore>) {
    let store = Arc::new(MemoryVaultStore::new());
    let vault = VaultController::open(store.clone()).unwrap();
    (vault, store)
}

proptest! {
    #![proptest_config(proptest_config(None))]

    #[test]
    fn prop_save_then_unlock_returns_secret(secret in arb_secret(), pin in arb_pin()) {
        let (mut vault, _) = open_vault();
        vault.save(&secret, &pin).unwrap();

        prop_assert_eq!(vault.unlock(&pin).unwrap(), secret.clone());
        prop_assert_eq!(vault.state(), &VaultState::Unlocked { secret });
    }

    #[test]
    fn prop_wrong_pin_is_rejected_and_record_unchanged(
        secret in arb_secret(),
        pin in arb_pin(),
        other in arb_pin(),
    ) {
        prop_assume!(pin != other);
        let (mut vault, store) = open_vault();
        vault.save(&secret, &pin).unwrap();
        let before = store.load().unwrap();

        prop_assert_eq!(vault.unlock(&other), Err(VaultError::InvalidPin));
        prop_assert_eq!(vault.state(), &VaultState::Locked);
        prop_assert_eq!(store.load().unwrap(), before);
    }

    #[test]
    fn prop_malformed_pin_never_touches_store(secret in arb_secret(), pin in arb_malformed_pin()) {
        let (mut vault, store) = open_vault();

        prop_assert_eq!(
            vault.save(&secret, &pin),
            Err(VaultError::Validation(ValidationError::MalformedPin))
        );
        prop_assert_eq!(vault.state(), &VaultState::Unset);
        prop_assert!(!store.exists().unwrap());
    }

    #[test]
    fn prop_record_never_contains_plain_tag(secret in arb_secret(), pin in arb_pin()) {
        let record = encode(&format!("{MAGIC_TAG}{secret}"), &pin);

        prop_assert!(!record.contains(MAGIC_TAG));
        prop_assert_eq!(decode(&record, &pin), format!("{MAGIC_TAG}{secret}"));
    }

    #[test]
    fn prop_mask_secret_hides_every_occurrence(secret in "[a-z]{4,16}", prefix in "[A-Z ]{0,10}") {
        let text = format!("{prefix}{secret}|AND AGAIN|{secret}");
        let masked = mask_secret(&text, &secret);

        prop_assert!(!masked.contains(&secret));
        prop_assert_eq!(masked.matches("***").count(), 2);
    }
}
