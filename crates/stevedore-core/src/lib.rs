//! Core types and configuration for stevedore.
//!
//! This crate defines the deploy options record ([`DeployOptions`]), the
//! layered sources it is resolved from ([`OptionLayer`]), the optional
//! `stevedore.toml` process config ([`StevedoreConfig`]), Elastic Beanstalk
//! config discovery, and shared error types.
//!
//! # Option precedence
//!
//! ```text
//! defaults
//!   < .elasticbeanstalk/config.yml
//!   < stevedore.toml [deploy]
//!   < command-line flags
//!   < interactive answers
//! ```
//!
//! Scalar fields are overridden by later layers. `regions` and `region_list`
//! are unioned across layers, keeping first-seen order.

pub mod config;
pub mod error;
pub mod options;
pub mod platform;
pub mod regions;
pub mod registry;

pub use config::{ShellConfig, StderrPolicy, StevedoreConfig};
pub use error::{Error, OptionsError, Result};
pub use options::{DEFAULT_REGION, DeployOptions, OptionLayer, PlatformTarget};
pub use platform::PlatformConfig;
pub use regions::{KNOWN_REGIONS, Region, uncatalogued};
pub use registry::RegistryTarget;
