use std::fs;
use std::path::Path;

use tracing::debug;
use vg_core::{EnvName, Result, VersionId, VgError};

use crate::layout::WORKSPACE_SUBDIRS;
use crate::RootLayout;

const VERSION_SETTINGS_HEADER: &str = "# This file is managed by vg.\n\
# GOROOT and GOPATH are set automatically by 'vg init'.\n\
# You can add custom environment variables below or use 'go env -w KEY=VALUE'\n";

/// Creates whichever of the version's workspace, cache and settings file is
/// missing. Versions installed before an auxiliary path existed get it here.
pub fn ensure_version_aux(layout: &RootLayout, version: &VersionId) -> Result<()> {
    ensure_workspace(&layout.version_gopath(version))?;
    ensure_dir(&layout.version_gocache(version))?;

    let goenv = layout.version_goenv(version);
    if !goenv.exists() {
        if let Some(parent) = goenv.parent() {
            ensure_dir(parent)?;
        }
        write_file(&goenv, VERSION_SETTINGS_HEADER)?;
        debug!(path = %goenv.display(), "created version settings file");
    }
    Ok(())
}

/// Lays out an environment's private directories under `env_dir`.
pub(crate) fn provision_env_tree(
    env_dir: &Path,
    version: &VersionId,
    name: &EnvName,
    remark: Option<&str>,
) -> Result<()> {
    ensure_workspace(&env_dir.join("gopath"))?;
    ensure_dir(&env_dir.join("gocache"))?;
    write_file(
        &env_dir.join("goenv"),
        &format!("# Environment '{name}' (Go {version})\n# Managed by vg.\n"),
    )?;

    if let Some(remark) = remark.map(str::trim).filter(|remark| !remark.is_empty()) {
        write_file(&env_dir.join(crate::layout::REMARK_FILE_NAME), remark)?;
    }
    Ok(())
}

fn ensure_workspace(gopath: &Path) -> Result<()> {
    for subdir in WORKSPACE_SUBDIRS {
        ensure_dir(&gopath.join(subdir))?;
    }
    Ok(())
}

pub(crate) fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| VgError::io("create directory", path, source))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content.as_bytes()).map_err(|source| VgError::io("write file", path, source))
}
