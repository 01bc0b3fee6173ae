use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use stevedore_core::DeployOptions;

/// File name of the single entry inside the bundle archive.
pub const BUNDLE_ENTRY: &str = "Dockerrun.aws.json";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern is valid"));

/// Substitute every `{{key}}` in `template` from `options`.
///
/// Keys without a value are kept as the original `{{key}}` text.
pub fn render(template: &str, options: &DeployOptions) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            options
                .template_value(caps[1].trim())
                .unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}

/// Render the bundle template and write it to `<output_dir>/<version>.zip`.
///
/// Returns the path of the written archive.
pub fn package(options: &DeployOptions) -> Result<PathBuf, PackagingError> {
    let template_path = &options.bundle_template;
    let template =
        std::fs::read_to_string(template_path).map_err(|e| PackagingError::TemplateRead {
            path: template_path.clone(),
            source: e,
        })?;

    let rendered = render(&template, options);

    std::fs::create_dir_all(&options.output_dir).map_err(|e| PackagingError::CreateDir {
        path: options.output_dir.clone(),
        source: e,
    })?;

    let archive_path = options.archive_path();
    write_archive(&archive_path, &rendered)?;

    tracing::debug!(
        archive = %archive_path.display(),
        bytes = rendered.len(),
        "bundle archive written"
    );

    Ok(archive_path)
}

fn write_archive(path: &Path, contents: &str) -> Result<(), PackagingError> {
    let file = std::fs::File::create(path).map_err(|e| PackagingError::ArchiveCreate {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut archive = zip::ZipWriter::new(file);

    archive
        .start_file(BUNDLE_ENTRY, zip::write::FileOptions::default())
        .map_err(|e| PackagingError::Archive {
            path: path.to_path_buf(),
            source: e,
        })?;

    archive
        .write_all(contents.as_bytes())
        .map_err(|e| PackagingError::ArchiveWrite {
            path: path.to_path_buf(),
            source: e,
        })?;

    archive.finish().map_err(|e| PackagingError::Archive {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PackagingError {
    #[error("failed to read bundle template {path}")]
    TemplateRead {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create output directory {path}")]
    CreateDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create bundle archive {path}")]
    ArchiveCreate {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write bundle archive {path}")]
    ArchiveWrite {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("zip error in bundle archive {path}")]
    Archive {
        path: std::path::PathBuf,
        source: zip::result::ZipError,
    },
}
