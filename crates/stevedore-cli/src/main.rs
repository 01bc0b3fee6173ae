mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use stevedore_core::OptionLayer;

/// Deploy docker images to AWS ECR and Elastic Beanstalk.
///
/// Builds and pushes the image, then optionally rolls it out to an Elastic
/// Beanstalk environment in one or more regions.
#[derive(Parser)]
#[command(name = "stevedore", disable_version_flag = true)]
struct Cli {
    /// Name of the docker image to build, eg: nginx
    #[arg(long, short = 'n')]
    name: Option<String>,

    /// Version string to tag image as, eg: 2.0.0
    #[arg(long, short = 'v')]
    version: Option<String>,

    /// ECR URI to push the image to, eg: <ACCOUNT_ID>.dkr.ecr.<REGION>.amazonaws.com/<NAME>
    #[arg(long, short = 'u', visible_alias = "ecr-uri")]
    registry_uri: Option<String>,

    /// Region(s) to deploy to, eg: us-east-1 (repeatable)
    #[arg(long = "region", short = 'r', num_args = 1.., value_delimiter = ',')]
    regions: Vec<String>,

    /// Whether to deploy to an Elastic Beanstalk environment
    #[arg(
        long,
        visible_alias = "eb",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = parse_switch
    )]
    deploy_to_platform: Option<bool>,

    /// Elastic Beanstalk application name, eg: cool-app
    #[arg(long, short = 'a', visible_alias = "eb-app")]
    platform_app: Option<String>,

    /// Elastic Beanstalk environment name, eg: cool-app-prod
    #[arg(long, short = 'e', visible_alias = "eb-env")]
    platform_env: Option<String>,

    /// S3 bucket receiving application versions, eg: cool-app-versions
    #[arg(long, short = 'b', visible_alias = "eb-bucket")]
    platform_bucket: Option<String>,

    /// Path to the Dockerrun template, eg: ./Dockerrun.aws.json
    #[arg(long, short = 'd', visible_alias = "dockerrun")]
    bundle_template: Option<PathBuf>,

    /// Where to write the application version zip, eg: ./dist/deploy
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,

    /// Only print failures
    #[arg(
        long,
        short = 's',
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = parse_switch
    )]
    silent: Option<bool>,

    /// Whether to use the interactive prompts
    #[arg(
        long,
        short = 'i',
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = parse_switch
    )]
    interactive: Option<bool>,

    /// Regions offered by the interactive region prompt (repeatable)
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    region_list: Vec<String>,
}

/// `0`, `false`, `no`, and `off` switch a flag off; any other value switches it on.
fn parse_switch(value: &str) -> Result<bool, String> {
    let off = ["0", "false", "no", "off"]
        .iter()
        .any(|v| value.trim().eq_ignore_ascii_case(v));
    Ok(!off)
}

impl Cli {
    fn into_layer(self) -> OptionLayer {
        OptionLayer {
            name: self.name,
            version: self.version,
            registry_uri: self.registry_uri,
            deploy_to_platform: self.deploy_to_platform,
            platform_app: self.platform_app,
            platform_env: self.platform_env,
            platform_bucket: self.platform_bucket,
            bundle_template: self.bundle_template,
            output_dir: self.output_dir,
            regions: self.regions,
            silent: self.silent,
            interactive: self.interactive,
            region_list: self.region_list,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match commands::deploy(cli.into_layer()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::Reporter::default().error(format!("Deploy failed: {e:#}"));
            ExitCode::FAILURE
        }
    }
}
