use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use clara_utils::error::ConfigError;

use super::{BACKEND_URL_ENV, BackendConfig, CliArgs, Config, ConfigSource, Defaults, VaultConfig};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
struct TomlConfig {
    defaults: Option<Defaults>,
    backend: Option<BackendConfig>,
    vault: Option<VaultConfig>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > env > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = env::current_dir().map_err(|e| ConfigError::DiscoveryFailed {
            reason: format!("cannot read current directory: {e}"),
        })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory.
    ///
    /// This is the path-driven variant used by tests to avoid depending on the
    /// process working directory.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let mut source_attribution = HashMap::new();

        let mut defaults = Defaults {
            verbose: Some(false),
        };
        let mut backend = BackendConfig::default();
        let mut vault = VaultConfig::default();

        source_attribution.insert("verbose".to_string(), ConfigSource::Defaults);
        source_attribution.insert("base_url".to_string(), ConfigSource::Defaults);
        source_attribution.insert("vault_path".to_string(), ConfigSource::Defaults);

        let config_path = if let Some(explicit_path) = &cli_args.config_path {
            if !explicit_path.exists() {
                return Err(ConfigError::NotFound {
                    path: explicit_path.display().to_string(),
                }
                .into());
            }
            Some(explicit_path.clone())
        } else {
            Self::discover_config_file_from(start_dir)?
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            let config_source = ConfigSource::ConfigFile(path.clone());

            if let Some(file_defaults) = file_config.defaults
                && file_defaults.verbose.is_some()
            {
                defaults.verbose = file_defaults.verbose;
                source_attribution.insert("verbose".to_string(), config_source.clone());
            }

            if let Some(file_backend) = file_config.backend
                && file_backend.base_url.is_some()
            {
                backend.base_url = file_backend.base_url;
                source_attribution.insert("base_url".to_string(), config_source.clone());
            }

            if let Some(file_vault) = file_config.vault
                && file_vault.path.is_some()
            {
                vault.path = file_vault.path;
                source_attribution.insert("vault_path".to_string(), config_source.clone());
            }
        }

        // Environment overrides the config file
        if let Ok(env_url) = env::var(BACKEND_URL_ENV)
            && !env_url.is_empty()
        {
            backend.base_url = Some(env_url);
            source_attribution.insert(
                "base_url".to_string(),
                ConfigSource::Env(BACKEND_URL_ENV.to_string()),
            );
        }

        // CLI flags override everything
        if let Some(url) = &cli_args.backend_url {
            backend.base_url = Some(url.clone());
            source_attribution.insert("base_url".to_string(), ConfigSource::Cli);
        }
        if let Some(path) = &cli_args.vault_path {
            vault.path = Some(path.clone());
            source_attribution.insert("vault_path".to_string(), ConfigSource::Cli);
        }
        if let Some(verbose) = cli_args.verbose {
            defaults.verbose = Some(verbose);
            source_attribution.insert("verbose".to_string(), ConfigSource::Cli);
        }

        let config = Self {
            defaults,
            backend,
            vault,
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Discover config file by searching upward from a given directory.
    ///
    /// Walks up the directory tree looking for `.clara/config.toml`, stopping
    /// at repository root markers (.git, .hg, .svn) or the filesystem root.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = start_dir.to_path_buf();

        loop {
            let config_path = current_dir.join(".clara").join("config.toml");
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                break;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: TomlConfig = toml::from_str(&content).map_err(|e| {
            ConfigError::InvalidFile(format!("{}: {}", path.display(), e.message()))
        })?;

        Ok(config)
    }
}
