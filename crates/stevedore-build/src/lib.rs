//! Dockerrun bundle rendering and packaging for stevedore.
//!
//! # Platform stages
//!
//! ```text
//! stevedore (deploy_to_platform = true)
//!   6. Package ── render Dockerrun template → <output_dir>/<version>.zip
//!   7. Upload  ── aws s3 cp → s3://<bucket>/<app>/<version>.zip
//!   8. Rollout ── per region: create-application-version, update-environment
//! ```
//!
//! This crate owns stage 6. The archive holds exactly one entry,
//! [`bundle::BUNDLE_ENTRY`], the rendered template.
//!
//! # Placeholders
//!
//! `{{key}}` tokens are replaced with [`DeployOptions::template_value`]
//! (see that method for the known keys). Unknown keys are left verbatim.
//!
//! [`DeployOptions::template_value`]: stevedore_core::DeployOptions::template_value

pub mod bundle;

pub use bundle::{BUNDLE_ENTRY, PackagingError, package, render};
