use camino::Utf8PathBuf;
use std::cell::RefCell;

// Thread-local override used only in tests to avoid process-global env races.
thread_local! {
    static THREAD_HOME: RefCell<Option<Utf8PathBuf>> = const { RefCell::new(None) };
}

/// Environment variable that relocates all clara state.
pub const CLARA_HOME_ENV: &str = "CLARA_HOME";

/// Resolve clara home:
/// 1) thread-local override (tests use this)
/// 2) env `CLARA_HOME`
/// 3) `<local data dir>/clara` when the platform reports one
/// 4) default ".clara"
#[must_use]
pub fn clara_home() -> Utf8PathBuf {
    if let Some(tl) = THREAD_HOME.with(|tl| tl.borrow().clone()) {
        return tl;
    }
    if let Ok(p) = std::env::var(CLARA_HOME_ENV) {
        return Utf8PathBuf::from(p);
    }
    dirs::data_local_dir()
        .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        .map(|dir| dir.join("clara"))
        .unwrap_or_else(|| Utf8PathBuf::from(".clara"))
}

/// Returns `<CLARA_HOME>/vault`
#[must_use]
pub fn vault_dir() -> Utf8PathBuf {
    clara_home().join("vault")
}

/// Returns `<CLARA_HOME>/vault/encrypted_key`, the single persisted record.
#[must_use]
pub fn vault_record_path() -> Utf8PathBuf {
    vault_dir().join("encrypted_key")
}

/// mkdir -p; treat `AlreadyExists` as success (removes TOCTTOU races)
pub fn ensure_dir_all<P: AsRef<std::path::Path>>(p: P) -> std::io::Result<()> {
    match std::fs::create_dir_all(&p) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

/// RAII guard for isolated home that clears thread-local state on drop
#[cfg(any(test, feature = "test-utils"))]
pub struct HomeGuard {
    inner: tempfile::TempDir,
}

#[cfg(any(test, feature = "test-utils"))]
impl HomeGuard {
    /// The isolated home as a UTF-8 path.
    #[must_use]
    pub fn utf8_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.inner.path().to_path_buf())
            .unwrap_or_else(|p| Utf8PathBuf::from(p.to_string_lossy().into_owned()))
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Drop for HomeGuard {
    fn drop(&mut self) {
        THREAD_HOME.with(|tl| *tl.borrow_mut() = None);
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl std::ops::Deref for HomeGuard {
    type Target = tempfile::TempDir;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Test helper: give this test a unique clara home under the system temp dir.
///
/// Hold the `HomeGuard` for the test's duration so the directory stays alive.
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(not(test), allow(dead_code))]
#[must_use]
pub fn with_isolated_home() -> HomeGuard {
    let td = tempfile::TempDir::new().expect("create temp home");
    let p = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
    THREAD_HOME.with(|tl| *tl.borrow_mut() = Some(p));
    HomeGuard { inner: td }
}
