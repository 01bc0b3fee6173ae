use std::path::Path;

use serde::Deserialize;

use crate::options::OptionLayer;

/// Location of the EB CLI project config, relative to the project directory.
pub const EB_CONFIG_PATH: &str = ".elasticbeanstalk/config.yml";

/// Defaults read from the Elastic Beanstalk CLI project config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub global: GlobalSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GlobalSection {
    pub application_name: Option<String>,
    pub default_region: Option<String>,
}

impl PlatformConfig {
    /// Read `.elasticbeanstalk/config.yml` under `project_dir`.
    ///
    /// A missing file yields `None`. An unreadable or malformed one is logged
    /// and also yields `None`; EB config only ever supplies defaults.
    pub fn discover(project_dir: &Path) -> Option<Self> {
        let path = project_dir.join(EB_CONFIG_PATH);
        if !path.exists() {
            return None;
        }

        match read(&path) {
            Ok(config) => Some(config),
            Err(reason) => {
                tracing::warn!(path = %path.display(), %reason, "ignoring elastic beanstalk config");
                None
            }
        }
    }

    /// Convert into an option layer (application name and default region).
    pub fn into_layer(self) -> OptionLayer {
        OptionLayer {
            platform_app: self.global.application_name,
            regions: self.global.default_region.into_iter().collect(),
            ..OptionLayer::default()
        }
    }
}

fn read(path: &Path) -> Result<PlatformConfig, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_yaml::from_str(&content).map_err(|e| e.to_string())
}
