use std::fmt;

use crate::version::{EnvName, VersionId};

/// One of the four indirection links that together define the active context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActivationLink {
    Version,
    Workspace,
    Cache,
    Settings,
}

impl ActivationLink {
    pub const ALL: [Self; 4] = [Self::Version, Self::Workspace, Self::Cache, Self::Settings];

    /// Links that follow the environment rather than the version.
    pub const AUXILIARY: [Self; 3] = [Self::Workspace, Self::Cache, Self::Settings];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Version => "current",
            Self::Workspace => "current-gopath",
            Self::Cache => "current-gocache",
            Self::Settings => "current-goenv",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            Self::Version => "GOROOT",
            Self::Workspace => "GOPATH",
            Self::Cache => "GOCACHE",
            Self::Settings => "GOENV",
        }
    }

    /// Whether the link target is a regular file instead of a directory.
    pub fn targets_file(self) -> bool {
        matches!(self, Self::Settings)
    }
}

impl fmt::Display for ActivationLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// The active (version, environment) pair, derived from the links on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveContext {
    Global { version: VersionId },
    Scoped { version: VersionId, name: EnvName },
}

impl ActiveContext {
    pub fn version(&self) -> &VersionId {
        match self {
            Self::Global { version } | Self::Scoped { version, .. } => version,
        }
    }

    pub fn environment(&self) -> Option<&EnvName> {
        match self {
            Self::Global { .. } => None,
            Self::Scoped { name, .. } => Some(name),
        }
    }

    pub fn is_scoped(&self) -> bool {
        matches!(self, Self::Scoped { .. })
    }
}

impl fmt::Display for ActiveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global { version } => write!(f, "Go {version} (global)"),
            Self::Scoped { version, name } => write!(f, "Go {version} (env {name})"),
        }
    }
}
