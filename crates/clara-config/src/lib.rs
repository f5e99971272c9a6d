//! Configuration for clara: TOML model, discovery, precedence and validation.

pub mod config;

pub use config::{
    BACKEND_URL_ENV, BackendConfig, CliArgs, Config, ConfigSource, DEFAULT_BASE_URL, Defaults,
    VaultConfig,
};
