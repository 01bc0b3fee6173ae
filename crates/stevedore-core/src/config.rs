use serde::{Deserialize, Serialize};

use crate::options::OptionLayer;

/// File name of the optional process config, looked up in the working directory.
pub const CONFIG_FILE: &str = "stevedore.toml";

/// stevedore.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StevedoreConfig {
    /// Deploy option defaults for this project
    #[serde(default)]
    pub deploy: OptionLayer,
    #[serde(default)]
    pub shell: ShellConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShellConfig {
    /// How buffered and streamed commands classify stderr output
    #[serde(default)]
    pub stderr: StderrPolicy,
}

/// Success classification for external commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StderrPolicy {
    /// Non-zero exit or any stderr output fails the command.
    #[default]
    Strict,
    /// Only the exit code decides; stderr is informational.
    ExitCode,
}

impl StevedoreConfig {
    /// Load from stevedore.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}
