use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use vg_core::{DistributionFetcher, VersionId, VgError};

use crate::activation::ActivationEngine;
use crate::artifact::{extract_archive, make_tmp_dir, move_dir_or_copy};
use crate::fs_utils::{remove_dir_all_if_exists, remove_file_if_exists};
use crate::provision::ensure_version_aux;
use crate::RootLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRemoval {
    pub version: VersionId,
    /// Auxiliary paths that could not be removed; the SDK itself is gone.
    pub warnings: Vec<String>,
}

/// Installed versions, oldest first.
pub fn installed_versions(layout: &RootLayout) -> vg_core::Result<Vec<VersionId>> {
    let dir = layout.sdks_dir();
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(VgError::io("read installed versions", &dir, source)),
    };

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| VgError::io("read installed versions", &dir, source))?;
        if !entry.path().is_dir() {
            continue;
        }
        let Some(raw) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if raw.starts_with('.') {
            continue;
        }
        if let Ok(version) = VersionId::parse(&raw) {
            if version.as_str() == raw {
                versions.push(version);
            }
        }
    }
    versions.sort();
    Ok(versions)
}

/// Fetches, extracts and provisions `version` under `sdks/`.
pub fn install_version(
    layout: &RootLayout,
    version: &VersionId,
    fetcher: &dyn DistributionFetcher,
) -> Result<PathBuf> {
    let version_root = layout.version_root(version);
    if version_root.exists() {
        return Err(VgError::AlreadyInstalled {
            version: version.to_string(),
        }
        .into());
    }

    layout.ensure_base_dirs()?;
    let archive = fetcher
        .fetch(version, &layout.dists_dir())
        .with_context(|| format!("failed to fetch Go {version}"))?;

    let staging = make_tmp_dir(layout, "install")?;
    let result = extract_archive(&archive.path, &staging, archive.archive_type).and_then(|()| {
        let extracted_root = staging.join(&archive.root_dir);
        if !extracted_root.is_dir() {
            anyhow::bail!(
                "archive {} has no top-level '{}' directory",
                archive.path.display(),
                archive.root_dir
            );
        }
        move_dir_or_copy(&extracted_root, &version_root)
    });
    let _ = remove_dir_all_if_exists(&staging);

    if let Err(err) = result {
        let _ = remove_dir_all_if_exists(&version_root);
        return Err(err);
    }

    ensure_version_aux(layout, version)?;
    info!(version = %version, root = %version_root.display(), "installed version");
    Ok(version_root)
}

/// Removes an installed version together with its workspace, cache, settings
/// file and environments. Refuses while the version link points at it.
pub fn remove_version(layout: &RootLayout, version: &VersionId) -> vg_core::Result<VersionRemoval> {
    let version_root = layout.version_root(version);
    if !version_root.is_dir() {
        return Err(VgError::NotInstalled {
            version: version.to_string(),
        });
    }

    let linked = ActivationEngine::new(layout)
        .linked_version()
        .ok()
        .flatten();
    if linked.as_ref() == Some(version) {
        return Err(VgError::VersionInUse {
            version: version.to_string(),
        });
    }

    fs::remove_dir_all(&version_root)
        .map_err(|source| VgError::io("remove SDK", &version_root, source))?;

    let mut warnings = Vec::new();
    for (label, dir) in [
        ("GOPATH", layout.version_gopath(version)),
        ("GOCACHE", layout.version_gocache(version)),
        ("environments", layout.version_envs_dir(version)),
    ] {
        if let Err(err) = remove_dir_all_if_exists(&dir) {
            warn!(path = %dir.display(), error = %err, "failed to remove version directory");
            warnings.push(format!("failed to remove {label} {}: {err}", dir.display()));
        }
    }

    let goenv = layout.version_goenv(version);
    if let Err(err) = remove_file_if_exists(&goenv) {
        warn!(path = %goenv.display(), error = %err, "failed to remove settings file");
        warnings.push(format!("failed to remove GOENV {}: {err}", goenv.display()));
    }

    info!(version = %version, "removed version");
    Ok(VersionRemoval {
        version: version.clone(),
        warnings,
    })
}
