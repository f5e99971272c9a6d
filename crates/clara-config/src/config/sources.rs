use std::collections::HashMap;

use super::{Config, ConfigSource};

fn source_label(source: Option<&ConfigSource>) -> String {
    match source {
        Some(ConfigSource::Cli) => "cli".to_string(),
        Some(ConfigSource::Env(_)) => "env".to_string(),
        Some(ConfigSource::ConfigFile(_)) => "config".to_string(),
        Some(ConfigSource::Defaults) | None => "default".to_string(),
    }
}

impl Config {
    /// Get effective configuration as key-value pairs with source attribution
    #[must_use]
    pub fn effective_config(&self) -> HashMap<String, (String, String)> {
        let mut config = HashMap::new();

        let mut add_config = |key: &str, value: String| {
            let source = source_label(self.source_attribution.get(key));
            config.insert(key.to_string(), (value, source));
        };

        add_config("base_url", self.base_url().to_string());
        add_config("vault_path", self.vault_path().to_string());
        add_config("verbose", self.verbose().to_string());

        config
    }
}
