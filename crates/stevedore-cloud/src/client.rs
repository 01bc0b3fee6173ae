use std::path::{Path, PathBuf};

use serde::Deserialize;
use stevedore_core::RegistryTarget;

use crate::executor::{RealExecutor, ShellExecutor, Streams};
use crate::shell::ShellError;

/// Tools the deploy pipeline shells out to, checked in this order.
pub const REQUIRED_TOOLS: &[&str] = &["git", "aws", "eb", "docker"];

/// Error text of a login that already succeeded through docker's
/// `--password-stdin` warning path.
pub const BENIGN_LOGIN_PATTERN: &str = "--password-stdin";

/// Deploy operations over docker, aws, and git, parameterized over the
/// executor for testability.
pub struct DeployClient<E: ShellExecutor = RealExecutor> {
    executor: E,
}

impl DeployClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor::default(),
        }
    }
}

impl Default for DeployClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ShellExecutor> DeployClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Preflight ──

    /// Resolve every tool in [`REQUIRED_TOOLS`]; fails on the first missing one.
    pub fn check_environment(&self) -> Result<EnvironmentReport, PreflightError> {
        let mut report = EnvironmentReport::default();

        for tool in REQUIRED_TOOLS {
            let path = self
                .executor
                .which(tool)
                .ok_or_else(|| PreflightError::ToolNotFound((*tool).to_owned()))?;
            report.tools.push(((*tool).to_owned(), path));
        }

        Ok(report)
    }

    // ── Docker ──

    /// `docker build -t <image> .`
    pub async fn build_image(&self, image: &str) -> Result<(), ContainerError> {
        self.executor
            .exec_streaming("docker", &args(["build", "-t", image, "."]), Streams::STDOUT)
            .await
            .map_err(|e| ContainerError::Build { source: e })?;

        Ok(())
    }

    /// `docker tag <source> <target>`
    pub async fn tag_image(&self, source: &str, target: &str) -> Result<(), ContainerError> {
        self.executor
            .exec_streaming("docker", &args(["tag", source, target]), Streams::STDOUT)
            .await
            .map_err(|e| ContainerError::Tag { source: e })?;

        Ok(())
    }

    /// `docker push <image>`, with both streams forwarded.
    pub async fn push_image(&self, image: &str) -> Result<(), ContainerError> {
        self.executor
            .exec_streaming("docker", &args(["push", image]), Streams::BOTH)
            .await
            .map_err(|e| ContainerError::Push { source: e })?;

        Ok(())
    }

    // ── ECR ──

    /// Obtain a docker login command from `aws ecr get-login` and run it.
    ///
    /// An error mentioning [`BENIGN_LOGIN_PATTERN`] is treated as success.
    pub async fn login(&self, registry: &RegistryTarget) -> Result<LoginOutcome, LoginError> {
        match self.run_login(registry).await {
            Ok(()) => Ok(LoginOutcome::LoggedIn),
            Err(e) if e.is_benign() => {
                tracing::warn!(error = %e, "treating docker login warning as success");
                Ok(LoginOutcome::AcceptedWithWarning)
            }
            Err(e) => Err(e),
        }
    }

    async fn run_login(&self, registry: &RegistryTarget) -> Result<(), LoginError> {
        let output = self
            .executor
            .exec(
                "aws",
                &args([
                    "ecr",
                    "get-login",
                    "--no-include-email",
                    "--region",
                    &registry.region,
                    "--registry-ids",
                    &registry.registry_id,
                ]),
            )
            .await
            .map_err(|e| LoginError::GetLogin { source: e })?;

        let mut words = output.stdout.split_whitespace().map(str::to_owned);
        let program = words.next().ok_or(LoginError::EmptyLoginCommand)?;
        let login_args: Vec<String> = words.collect();

        self.executor
            .exec(&program, &login_args)
            .await
            .map_err(|e| LoginError::Login { source: e })?;

        Ok(())
    }

    // ── S3 ──

    /// `aws s3 cp <archive> s3://<bucket>/<key>`
    pub async fn upload_bundle(
        &self,
        archive: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), PlatformError> {
        let archive_str = archive
            .to_str()
            .ok_or_else(|| PlatformError::InvalidPath(archive.to_path_buf()))?;
        let destination = format!("s3://{bucket}/{key}");

        self.executor
            .exec_streaming(
                "aws",
                &args(["s3", "cp", archive_str, &destination]),
                Streams::STDOUT,
            )
            .await
            .map_err(|e| PlatformError::Upload { source: e })?;

        Ok(())
    }

    // ── Elastic Beanstalk ──

    pub async fn create_application_version(
        &self,
        app: &str,
        version: &str,
        bucket: &str,
        region: &str,
    ) -> Result<(), PlatformError> {
        let source_bundle = format!("S3Bucket={bucket},S3Key={}", bundle_key(app, version));

        self.executor
            .exec_streaming(
                "aws",
                &args([
                    "elasticbeanstalk",
                    "create-application-version",
                    "--application-name",
                    app,
                    "--version-label",
                    version,
                    "--source-bundle",
                    &source_bundle,
                    "--region",
                    region,
                ]),
                Streams::STDOUT,
            )
            .await
            .map_err(|e| PlatformError::CreateVersion {
                region: region.to_owned(),
                source: e,
            })?;

        Ok(())
    }

    pub async fn update_environment(
        &self,
        app: &str,
        env: &str,
        version: &str,
        region: &str,
    ) -> Result<(), PlatformError> {
        self.executor
            .exec_streaming(
                "aws",
                &args([
                    "elasticbeanstalk",
                    "update-environment",
                    "--application-name",
                    app,
                    "--environment-name",
                    env,
                    "--version-label",
                    version,
                    "--region",
                    region,
                ]),
                Streams::STDOUT,
            )
            .await
            .map_err(|e| PlatformError::UpdateEnvironment {
                region: region.to_owned(),
                source: e,
            })?;

        Ok(())
    }

    /// Application names from `aws elasticbeanstalk describe-applications`.
    pub async fn describe_applications(&self) -> Result<Vec<String>, PlatformError> {
        let output = self
            .executor
            .exec("aws", &args(["elasticbeanstalk", "describe-applications"]))
            .await
            .map_err(|e| PlatformError::Describe { source: e })?;

        let parsed: ApplicationsResponse = serde_json::from_str(&output.stdout)
            .map_err(|e| PlatformError::ParseResponse { source: e })?;

        Ok(parsed
            .applications
            .into_iter()
            .map(|a| a.application_name)
            .collect())
    }

    /// Environment names of `app` from `aws elasticbeanstalk describe-environments`.
    pub async fn describe_environments(&self, app: &str) -> Result<Vec<String>, PlatformError> {
        let output = self
            .executor
            .exec(
                "aws",
                &args([
                    "elasticbeanstalk",
                    "describe-environments",
                    "--application-name",
                    app,
                ]),
            )
            .await
            .map_err(|e| PlatformError::Describe { source: e })?;

        let parsed: EnvironmentsResponse = serde_json::from_str(&output.stdout)
            .map_err(|e| PlatformError::ParseResponse { source: e })?;

        Ok(parsed
            .environments
            .into_iter()
            .map(|e| e.environment_name)
            .collect())
    }

    // ── Git ──

    /// Gather branch, commit, and nearest tag concurrently.
    ///
    /// Each lookup degrades to `None` on its own failure.
    pub async fn versions(&self) -> VersionInfo {
        let commit = args(["rev-parse", "HEAD"]);
        let branch = args(["rev-parse", "--abbrev-ref", "HEAD"]);
        let tag = args(["describe", "--tags"]);

        let (commit, branch, tag) = tokio::join!(
            self.git_value(&commit),
            self.git_value(&branch),
            self.git_value(&tag),
        );

        VersionInfo::new(branch, commit, tag)
    }

    async fn git_value(&self, git_args: &[String]) -> Option<String> {
        match self.executor.exec("git", git_args).await {
            Ok(output) => Some(output.stdout.trim().to_owned()).filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::debug!(error = %e, "git lookup failed");
                None
            }
        }
    }
}

/// Object key of a version's bundle: `<app>/<version>.zip`.
pub fn bundle_key(app: &str, version: &str) -> String {
    format!("{app}/{version}.zip")
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Response types ──

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApplicationsResponse {
    #[serde(default)]
    applications: Vec<ApplicationDescription>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApplicationDescription {
    application_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EnvironmentsResponse {
    #[serde(default)]
    environments: Vec<EnvironmentDescription>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EnvironmentDescription {
    environment_name: String,
}

// ── Report types ──

#[derive(Debug, Default)]
pub struct EnvironmentReport {
    /// Resolved `(tool, path)` pairs in check order
    pub tools: Vec<(String, PathBuf)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn,
    /// The login command reported the benign `--password-stdin` warning.
    AcceptedWithWarning,
}

/// Version-control state used to suggest image tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionInfo {
    pub branch: Option<String>,
    pub commit_hash: Option<String>,
    /// First 7 characters of `commit_hash`
    pub short_hash: Option<String>,
    pub tag: Option<String>,
    /// `branch-short_hash`
    pub branch_short: Option<String>,
    /// `branch-tag`
    pub branch_tag: Option<String>,
}

impl VersionInfo {
    pub fn new(branch: Option<String>, commit_hash: Option<String>, tag: Option<String>) -> Self {
        let short_hash = commit_hash
            .as_deref()
            .map(|hash| hash.chars().take(7).collect::<String>());
        let branch_short = join(&branch, &short_hash);
        let branch_tag = join(&branch, &tag);

        Self {
            branch,
            commit_hash,
            short_hash,
            tag,
            branch_short,
            branch_tag,
        }
    }
}

fn join(left: &Option<String>, right: &Option<String>) -> Option<String> {
    Some(format!("{}-{}", left.as_deref()?, right.as_deref()?))
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error("{0} not found in PATH, please install it")]
    ToolNotFound(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("docker build failed")]
    Build { source: ShellError },

    #[error("docker tag failed")]
    Tag { source: ShellError },

    #[error("docker push failed")]
    Push { source: ShellError },
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("aws ecr get-login failed")]
    GetLogin { source: ShellError },

    #[error("aws ecr get-login returned no login command")]
    EmptyLoginCommand,

    #[error("docker login failed")]
    Login { source: ShellError },
}

impl LoginError {
    /// Whether a command exited 0 and only its stderr mentions
    /// [`BENIGN_LOGIN_PATTERN`]. A non-zero exit is never benign.
    pub fn is_benign(&self) -> bool {
        match self {
            Self::GetLogin { source } | Self::Login { source } => match source {
                ShellError::StderrOutput { stderr, .. } => stderr.contains(BENIGN_LOGIN_PATTERN),
                _ => false,
            },
            Self::EmptyLoginCommand => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("bundle path is not valid UTF-8: {0}")]
    InvalidPath(std::path::PathBuf),

    #[error("s3 upload failed")]
    Upload { source: ShellError },

    #[error("create-application-version failed in region {region}")]
    CreateVersion { region: String, source: ShellError },

    #[error("update-environment failed in region {region}")]
    UpdateEnvironment { region: String, source: ShellError },

    #[error("elastic beanstalk describe call failed")]
    Describe { source: ShellError },

    #[error("unexpected elastic beanstalk response")]
    ParseResponse { source: serde_json::Error },
}

impl PlatformError {
    /// Region a rollout failure happened in, if any.
    pub fn region(&self) -> Option<&str> {
        match self {
            Self::CreateVersion { region, .. } | Self::UpdateEnvironment { region, .. } => {
                Some(region)
            }
            _ => None,
        }
    }
}
