//! Tests for the configuration system
//!
//! Covers upward discovery stopping at repository roots, precedence
//! CLI > env > config file > defaults, source attribution, and invalid
//! configuration handling.

use anyhow::Result;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use clara::{CliArgs, Config, ConfigSource};
use clara_config::BACKEND_URL_ENV;
use clara_utils::error::ConfigError;

/// Helper to create a config file in a directory
fn create_config_file(dir: &std::path::Path, content: &str) -> PathBuf {
    let clara_dir = dir.join(".clara");
    fs::create_dir_all(&clara_dir).unwrap();
    let config_path = clara_dir.join("config.toml");
    fs::write(&config_path, content).unwrap();
    config_path
}

/// Helper to create a .git directory marker
fn create_git_marker(dir: &std::path::Path) {
    fs::create_dir_all(dir.join(".git")).unwrap();
}

struct EnvGuard;

impl EnvGuard {
    fn backend_url(value: Option<&str>) -> Self {
        // SAFETY: callers are #[serial]
        unsafe {
            match value {
                Some(v) => std::env::set_var(BACKEND_URL_ENV, v),
                None => std::env::remove_var(BACKEND_URL_ENV),
            }
        }
        Self
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: callers are #[serial]
        unsafe { std::env::remove_var(BACKEND_URL_ENV) };
    }
}

#[test]
#[serial]
fn test_upward_discovery_from_nested_directory() -> Result<()> {
    let _env = EnvGuard::backend_url(None);
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    // root/
    //   .git/
    //   .clara/config.toml
    //   docs/guides/
    create_git_marker(root);
    let config_path = create_config_file(
        root,
        r#"
[backend]
base_url = "http://10.0.0.5:8000/api"

[defaults]
verbose = true
"#,
    );
    let nested = root.join("docs").join("guides");
    fs::create_dir_all(&nested)?;

    let config = Config::discover_from(&nested, &CliArgs::default())?;

    assert_eq!(config.base_url(), "http://10.0.0.5:8000/api");
    assert!(config.verbose());
    assert_eq!(
        config.source_attribution.get("base_url"),
        Some(&ConfigSource::ConfigFile(config_path))
    );
    Ok(())
}

#[test]
#[serial]
fn test_discovery_does_not_cross_repository_root() -> Result<()> {
    let _env = EnvGuard::backend_url(None);
    let temp_dir = TempDir::new()?;
    let outer = temp_dir.path();

    // outer/.clara/config.toml must not be seen from inside outer/repo/
    create_config_file(outer, "[backend]\nbase_url = \"http://outer:1\"\n");
    let repo = outer.join("repo");
    create_git_marker(&repo);

    let config = Config::discover_from(&repo, &CliArgs::default())?;

    assert_eq!(config.base_url(), "http://127.0.0.1:8000");
    assert_eq!(
        config.effective_config().get("base_url").map(|(_, s)| s.as_str()),
        Some("default")
    );
    Ok(())
}

#[test]
#[serial]
fn test_precedence_cli_over_env_over_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    create_git_marker(root);
    create_config_file(root, "[backend]\nbase_url = \"http://file:8000\"\n");

    {
        let _env = EnvGuard::backend_url(Some("http://env:8000"));

        let config = Config::discover_from(root, &CliArgs::default())?;
        assert_eq!(config.base_url(), "http://env:8000");
        assert_eq!(
            config.source_attribution.get("base_url"),
            Some(&ConfigSource::Env(BACKEND_URL_ENV.to_string()))
        );

        let cli_args = CliArgs {
            backend_url: Some("http://cli:8000/".to_string()),
            ..Default::default()
        };
        let config = Config::discover_from(root, &cli_args)?;
        assert_eq!(config.base_url(), "http://cli:8000");
        assert_eq!(config.source_attribution.get("base_url"), Some(&ConfigSource::Cli));
    }

    let config = Config::discover_from(root, &CliArgs::default())?;
    assert_eq!(config.base_url(), "http://file:8000");
    Ok(())
}

#[test]
#[serial]
fn test_explicit_config_path_and_vault_override() -> Result<()> {
    let _env = EnvGuard::backend_url(None);
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(&config_path, "[vault]\npath = \"/srv/clara/key\"\n")?;

    let cli_args = CliArgs {
        config_path: Some(config_path.clone()),
        ..Default::default()
    };
    let config = Config::discover_from(temp_dir.path(), &cli_args)?;
    assert_eq!(config.vault_path().as_str(), "/srv/clara/key");

    let cli_args = CliArgs {
        config_path: Some(config_path),
        vault_path: Some("/tmp/override".to_string()),
        ..Default::default()
    };
    let config = Config::discover_from(temp_dir.path(), &cli_args)?;
    assert_eq!(config.vault_path().as_str(), "/tmp/override");
    assert_eq!(config.source_attribution.get("vault_path"), Some(&ConfigSource::Cli));
    Ok(())
}

#[test]
#[serial]
fn test_missing_explicit_config_is_not_found() {
    let _env = EnvGuard::backend_url(None);
    let temp_dir = TempDir::new().unwrap();

    let cli_args = CliArgs {
        config_path: Some(temp_dir.path().join("nope.toml")),
        ..Default::default()
    };
    let err = Config::discover_from(temp_dir.path(), &cli_args).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::NotFound { .. })
    ));
}

#[test]
#[serial]
fn test_invalid_toml_and_invalid_values_are_rejected() {
    let _env = EnvGuard::backend_url(None);
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_git_marker(root);

    create_config_file(root, "[backend\nbase_url = 3");
    let err = Config::discover_from(root, &CliArgs::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidFile(_))
    ));

    create_config_file(root, "[backend]\nbase_url = \"localhost:8000\"\n");
    let err = Config::discover_from(root, &CliArgs::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidValue { key, .. }) if key == "base_url"
    ));
}
