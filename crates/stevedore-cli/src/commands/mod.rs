mod deploy;
mod deploy_pipeline;
mod prompt;

pub use deploy::deploy;
