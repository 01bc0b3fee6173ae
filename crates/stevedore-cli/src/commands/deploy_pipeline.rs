use std::path::PathBuf;

use stevedore_build::PackagingError;
use stevedore_cloud::{
    ContainerError, DeployClient, LoginError, LoginOutcome, PlatformError, PreflightError,
    ShellExecutor, bundle_key,
};
use stevedore_core::{DeployOptions, OptionsError};

use crate::output::Reporter;

/// Result of a successful deploy pipeline run.
#[derive(Debug)]
pub(crate) struct DeployOutcome {
    pub remote_image: String,
    pub login: LoginOutcome,
    /// Bundle archive, when the platform stages ran
    pub archive: Option<PathBuf>,
    /// Regions rolled out, in order
    pub regions: Vec<String>,
}

/// Failure of one pipeline stage. Rollout failures name their region.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PipelineError {
    #[error("invalid deploy options")]
    Options(#[from] OptionsError),

    #[error("environment check failed")]
    Environment(#[from] PreflightError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("ECR login failed")]
    Login(#[from] LoginError),

    #[error("bundle packaging failed")]
    Packaging(#[from] PackagingError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Run the deploy pipeline:
/// validate → environment check → build → tag → login → push
/// → [package → upload → per-region create version + update environment].
///
/// Stages run strictly in order; the first failure aborts the run.
pub(crate) async fn run<E: ShellExecutor>(
    client: &DeployClient<E>,
    options: &DeployOptions,
    reporter: &Reporter,
) -> Result<DeployOutcome, PipelineError> {
    options.validate()?;
    let registry = options.registry()?;
    let local_image = options.local_image();
    let remote_image = options.remote_image();

    reporter.info("Checking environment...");
    client.check_environment()?;
    reporter.success("Environment check passed");

    reporter.info(format!("Building docker image {local_image}..."));
    client.build_image(&local_image).await?;
    reporter.success("Docker build succeeded");

    reporter.info(format!("Tagging {local_image} as {remote_image}..."));
    client.tag_image(&local_image, &remote_image).await?;
    reporter.success("Docker tag succeeded");

    reporter.info(format!(
        "Logging in to ECR registry {} ({})...",
        registry.registry_id, registry.region
    ));
    let login = client.login(&registry).await?;
    match login {
        LoginOutcome::LoggedIn => reporter.success("ECR login succeeded"),
        LoginOutcome::AcceptedWithWarning => {
            reporter.warn("ECR login reported a --password-stdin warning, continuing")
        }
    }

    reporter.info(format!("Pushing {remote_image}..."));
    client.push_image(&remote_image).await?;
    reporter.success("Docker push succeeded");

    let mut outcome = DeployOutcome {
        remote_image,
        login,
        archive: None,
        regions: Vec::new(),
    };

    if options.deploy_to_platform {
        deploy_platform(client, options, reporter, &mut outcome).await?;
    }

    reporter.success("Deploy complete");
    Ok(outcome)
}

async fn deploy_platform<E: ShellExecutor>(
    client: &DeployClient<E>,
    options: &DeployOptions,
    reporter: &Reporter,
    outcome: &mut DeployOutcome,
) -> Result<(), PipelineError> {
    let target = options.platform()?;

    reporter.info("Packaging application version bundle...");
    let archive = stevedore_build::package(options)?;
    reporter.success(format!("Bundle written to {}", archive.display()));

    let key = bundle_key(target.app, &options.version);
    reporter.info(format!("Uploading bundle to s3://{}/{key}...", target.bucket));
    client.upload_bundle(&archive, target.bucket, &key).await?;
    reporter.success("Bundle uploaded");
    outcome.archive = Some(archive);

    for region in &options.regions {
        reporter.info(format!(
            "Creating application version {} in {region}...",
            options.version
        ));
        client
            .create_application_version(target.app, &options.version, target.bucket, region)
            .await?;
        reporter.success(format!("Application version created in {region}"));

        reporter.info(format!("Updating environment {} in {region}...", target.env));
        client
            .update_environment(target.app, target.env, &options.version, region)
            .await?;
        reporter.success(format!("Environment updated in {region}"));

        outcome.regions.push(region.clone());
    }

    Ok(())
}
