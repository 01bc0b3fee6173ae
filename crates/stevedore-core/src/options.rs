use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::registry::RegistryTarget;

/// Region used when no source names one.
pub const DEFAULT_REGION: &str = "us-east-1";

const DEFAULT_NAME: &str = "app";
const DEFAULT_BUNDLE_TEMPLATE: &str = "./Dockerrun.aws.json";
const DEFAULT_OUTPUT_DIR: &str = "./dist/deploy";

/// One partial source of deploy options.
///
/// Every source (defaults, EB config, `stevedore.toml`, flags, prompt
/// answers) produces a layer; layers are folded with [`OptionLayer::merge`]
/// and turned into a [`DeployOptions`] by [`OptionLayer::finalize`].
///
/// Legacy key names (`ecr_uri`, `eb`, `eb_app`, ...) are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionLayer {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(alias = "ecr_uri")]
    pub registry_uri: Option<String>,
    #[serde(alias = "eb")]
    pub deploy_to_platform: Option<bool>,
    #[serde(alias = "eb_app")]
    pub platform_app: Option<String>,
    #[serde(alias = "eb_env")]
    pub platform_env: Option<String>,
    #[serde(alias = "eb_bucket")]
    pub platform_bucket: Option<String>,
    #[serde(alias = "dockerrun")]
    pub bundle_template: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    #[serde(default, alias = "region")]
    pub regions: Vec<String>,
    pub silent: Option<bool>,
    pub interactive: Option<bool>,
    #[serde(default)]
    pub region_list: Vec<String>,
}

impl OptionLayer {
    /// Built-in defaults, the lowest-precedence layer.
    ///
    /// The default region is not part of this layer: it is applied by
    /// [`finalize`](Self::finalize) only when no layer names a region, so it
    /// never leaks into a configured region set.
    pub fn defaults() -> Self {
        Self {
            name: Some(DEFAULT_NAME.to_owned()),
            deploy_to_platform: Some(true),
            bundle_template: Some(PathBuf::from(DEFAULT_BUNDLE_TEMPLATE)),
            output_dir: Some(PathBuf::from(DEFAULT_OUTPUT_DIR)),
            silent: Some(false),
            interactive: Some(true),
            ..Self::default()
        }
    }

    /// Fold layers in precedence order on top of [`defaults`](Self::defaults).
    pub fn resolve<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = OptionLayer>,
    {
        layers.into_iter().fold(Self::defaults(), Self::merge)
    }

    /// Overlay `other` on `self`: scalars set in `other` win, region fields are unioned.
    pub fn merge(mut self, other: OptionLayer) -> Self {
        self.name = other.name.or(self.name);
        self.version = other.version.or(self.version);
        self.registry_uri = other.registry_uri.or(self.registry_uri);
        self.deploy_to_platform = other.deploy_to_platform.or(self.deploy_to_platform);
        self.platform_app = other.platform_app.or(self.platform_app);
        self.platform_env = other.platform_env.or(self.platform_env);
        self.platform_bucket = other.platform_bucket.or(self.platform_bucket);
        self.bundle_template = other.bundle_template.or(self.bundle_template);
        self.output_dir = other.output_dir.or(self.output_dir);
        self.silent = other.silent.or(self.silent);
        self.interactive = other.interactive.or(self.interactive);
        self.regions = union(self.regions, other.regions);
        self.region_list = union(self.region_list, other.region_list);
        self
    }

    /// Whether prompts should be collected before the pipeline runs.
    pub fn is_interactive(&self) -> bool {
        self.interactive.unwrap_or(true)
    }

    pub fn is_silent(&self) -> bool {
        self.silent.unwrap_or(false)
    }

    /// Produce the immutable options record, validating it.
    pub fn finalize(self) -> Result<DeployOptions, OptionsError> {
        let mut regions = union(self.regions, Vec::new());
        if regions.is_empty() {
            regions.push(DEFAULT_REGION.to_owned());
        }

        let options = DeployOptions {
            name: self.name.unwrap_or_default(),
            version: self.version.unwrap_or_default(),
            registry_uri: self.registry_uri.unwrap_or_default(),
            deploy_to_platform: self.deploy_to_platform.unwrap_or(true),
            platform_app: self.platform_app,
            platform_env: self.platform_env,
            platform_bucket: self.platform_bucket,
            bundle_template: self
                .bundle_template
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BUNDLE_TEMPLATE)),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            regions,
            silent: self.silent.unwrap_or(false),
            interactive: self.interactive.unwrap_or(true),
            region_list: self.region_list,
        };

        options.validate()?;
        Ok(options)
    }
}

fn union(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(first.len() + second.len());
    union_into(&mut out, first);
    union_into(&mut out, second);
    out
}

/// Append trimmed, non-empty values not already present.
fn union_into(dest: &mut Vec<String>, src: Vec<String>) {
    for value in src {
        let value = value.trim();
        if !value.is_empty() && !dest.iter().any(|existing| existing == value) {
            dest.push(value.to_owned());
        }
    }
}

/// The resolved deploy options threaded through a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Local image name
    pub name: String,
    /// Image tag, S3 key stem, and EB version label
    pub version: String,
    /// Target ECR repository URI
    pub registry_uri: String,
    /// Run the Elastic Beanstalk stages after the image push
    pub deploy_to_platform: bool,
    pub platform_app: Option<String>,
    pub platform_env: Option<String>,
    pub platform_bucket: Option<String>,
    /// Dockerrun template rendered into the bundle
    pub bundle_template: PathBuf,
    /// Directory receiving `<version>.zip`
    pub output_dir: PathBuf,
    /// Rollout regions, in rollout order
    pub regions: Vec<String>,
    pub silent: bool,
    pub interactive: bool,
    /// Regions offered by the interactive region prompt
    pub region_list: Vec<String>,
}

/// Borrowed Elastic Beanstalk identifiers of a validated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTarget<'a> {
    pub app: &'a str,
    pub env: &'a str,
    pub bucket: &'a str,
}

impl DeployOptions {
    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.name.trim().is_empty() {
            return Err(OptionsError::MissingField("name"));
        }
        if self.version.trim().is_empty() {
            return Err(OptionsError::MissingField("version"));
        }
        if self.registry_uri.trim().is_empty() {
            return Err(OptionsError::MissingField("registry_uri"));
        }
        self.registry()?;

        if self.deploy_to_platform {
            self.platform()?;
            if self.regions.is_empty() {
                return Err(OptionsError::NoRegions);
            }
        }

        Ok(())
    }

    /// Registry id and region parsed from `registry_uri`.
    pub fn registry(&self) -> Result<RegistryTarget, OptionsError> {
        RegistryTarget::parse(&self.registry_uri)
    }

    /// Platform identifiers; each must be present and non-empty.
    pub fn platform(&self) -> Result<PlatformTarget<'_>, OptionsError> {
        Ok(PlatformTarget {
            app: required(&self.platform_app, "platform_app")?,
            env: required(&self.platform_env, "platform_env")?,
            bucket: required(&self.platform_bucket, "platform_bucket")?,
        })
    }

    /// `name:version`, the locally built image.
    pub fn local_image(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }

    /// `registry_uri:version`, the pushed image.
    pub fn remote_image(&self) -> String {
        format!("{}:{}", self.registry_uri, self.version)
    }

    /// `output_dir/version.zip`
    pub fn archive_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.zip", self.version))
    }

    /// Value for a `{{key}}` bundle template placeholder.
    ///
    /// Returns `None` for unknown keys and for unset optional fields.
    pub fn template_value(&self, key: &str) -> Option<String> {
        let value = match key {
            "name" => self.name.clone(),
            "version" => self.version.clone(),
            "registryUri" | "ecrUri" => self.registry_uri.clone(),
            "image" => self.remote_image(),
            "platformApp" | "ebApp" => self.platform_app.clone()?,
            "platformEnv" | "ebEnv" => self.platform_env.clone()?,
            "platformBucket" | "ebBucket" => self.platform_bucket.clone()?,
            "bundleTemplate" | "dockerrun" => path_string(&self.bundle_template),
            "outputDir" => path_string(&self.output_dir),
            "archivePath" => path_string(&self.archive_path()),
            "regions" | "region" => self.regions.join(","),
            _ => return None,
        };
        Some(value)
    }
}

fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, OptionsError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or(OptionsError::MissingField(field))
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}
