use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VgError>;

/// Failures surfaced by the activation engine and environment registry.
#[derive(Error, Debug)]
pub enum VgError {
    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    #[error("invalid environment name '{0}'")]
    InvalidEnvName(String),

    #[error("Go {version} is not installed")]
    NotInstalled { version: String },

    #[error("Go {version} is already installed")]
    AlreadyInstalled { version: String },

    #[error("no Go version is currently active (run 'vg use <version>' first)")]
    NoActiveVersion,

    #[error("environment '{name}' not found for Go {version}")]
    EnvironmentNotFound { version: String, name: String },

    #[error("environment '{name}' already exists for Go {version}")]
    AlreadyExists { version: String, name: String },

    #[error("cannot remove active environment '{name}' (run 'vg env exit' first)")]
    EnvironmentActive { version: String, name: String },

    #[error("cannot remove Go {version}: it is currently in use")]
    VersionInUse { version: String },

    #[error("broken {link} link: {reason}")]
    BrokenLink { link: String, reason: String },

    #[error("failed to {action}: {}", path.display())]
    Io {
        action: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl VgError {
    pub fn io(action: impl Into<String>, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action: action.into(),
            path: path.to_path_buf(),
            source,
        }
    }
}
