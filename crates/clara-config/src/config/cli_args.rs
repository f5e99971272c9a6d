use std::path::PathBuf;

/// Configuration overrides coming from global command-line flags.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub backend_url: Option<String>,
    pub vault_path: Option<String>,
    pub verbose: Option<bool>,
}
