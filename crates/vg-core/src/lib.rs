mod archive;
mod config;
mod context;
mod error;
mod fetch;
mod version;

pub use archive::ArchiveType;
pub use config::{AutoInstallPolicy, InstallConfig, VgConfig, DEFAULT_MIRROR};
pub use context::{ActivationLink, ActiveContext};
pub use error::{Result, VgError};
pub use fetch::{DistributionFetcher, FetchedArchive};
pub use version::{EnvName, VersionId};

#[cfg(test)]
mod tests;
