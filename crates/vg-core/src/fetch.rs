use std::path::{Path, PathBuf};

use crate::archive::ArchiveType;
use crate::version::VersionId;

/// A distribution archive sitting on local disk, ready for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArchive {
    pub path: PathBuf,
    pub archive_type: ArchiveType,
    /// The top-level directory inside the archive that becomes the version root.
    pub root_dir: String,
}

/// Obtains the distribution archive for a version, caching it under `dists_dir`.
pub trait DistributionFetcher {
    fn fetch(&self, version: &VersionId, dists_dir: &Path) -> anyhow::Result<FetchedArchive>;
}
