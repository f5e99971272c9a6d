use clara_utils::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base_url) = &self.backend.base_url {
            let rest = base_url
                .strip_prefix("http://")
                .or_else(|| base_url.strip_prefix("https://"));
            match rest {
                Some(host) if !host.trim_matches('/').is_empty() => {}
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "base_url".to_string(),
                        value: format!("'{base_url}' is not an http(s) URL"),
                    });
                }
            }
        }

        if let Some(path) = &self.vault.path
            && path.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                key: "vault_path".to_string(),
                value: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
