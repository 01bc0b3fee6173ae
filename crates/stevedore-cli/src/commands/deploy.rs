use std::path::PathBuf;

use stevedore_cloud::{DeployClient, RealExecutor};
use stevedore_core::{OptionLayer, PlatformConfig, StevedoreConfig};

use super::deploy_pipeline;
use super::prompt::{DeployPrompt, PromptError};
use crate::output::Reporter;

/// Resolve options from every source and run the deploy pipeline.
///
/// Precedence, lowest first: built-in defaults, `.elasticbeanstalk/config.yml`,
/// `stevedore.toml`, `flags`, then interactive answers.
pub async fn deploy(flags: OptionLayer) -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");

    let config = StevedoreConfig::load(&project_dir)?;
    let discovered = PlatformConfig::discover(&project_dir).map(PlatformConfig::into_layer);
    let layer = OptionLayer::resolve(discovered.into_iter().chain([config.deploy, flags]));

    let client = DeployClient::with_executor(RealExecutor::new(config.shell.stderr));

    let layer = if layer.is_interactive() {
        match DeployPrompt::new().collect(&client, layer).await {
            Ok(answered) => answered,
            Err(PromptError::Declined) => {
                Reporter::default().error("Deploy not confirmed, nothing was run");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        layer
    };

    let options = layer.finalize()?;
    let reporter = Reporter::new(options.silent);

    let outcome = deploy_pipeline::run(&client, &options, &reporter).await?;

    tracing::debug!(login = ?outcome.login, "deploy finished");
    reporter.success(format!("Deployed {}", outcome.remote_image));
    if let Some(archive) = &outcome.archive {
        reporter.success(format!("Application version bundle: {}", archive.display()));
    }
    if !outcome.regions.is_empty() {
        reporter.success(format!("Rolled out to: {}", outcome.regions.join(", ")));
    }

    Ok(())
}
