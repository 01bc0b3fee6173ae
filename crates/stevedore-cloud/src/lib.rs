pub mod client;
pub mod executor;
pub mod shell;

pub use client::{
    BENIGN_LOGIN_PATTERN, ContainerError, DeployClient, EnvironmentReport, LoginError,
    LoginOutcome, PlatformError, PreflightError, REQUIRED_TOOLS, VersionInfo, bundle_key,
};
pub use executor::{CommandOutput, RealExecutor, ShellExecutor, Streams};
pub use shell::ShellError;
