use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use vg_core::{ActivationLink, EnvName, Result, VersionId, VgError};

use crate::fs_utils::remove_dir_all_if_exists;
use crate::layout::REMARK_FILE_NAME;
use crate::provision::{ensure_dir, provision_env_tree};
use crate::RootLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentEntry {
    pub name: EnvName,
    pub remark: String,
}

/// Named environments nested under installed versions.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentRegistry<'a> {
    layout: &'a RootLayout,
}

impl<'a> EnvironmentRegistry<'a> {
    pub fn new(layout: &'a RootLayout) -> Self {
        Self { layout }
    }

    pub fn exists(&self, version: &VersionId, name: &EnvName) -> bool {
        self.layout.env_dir(version, name).is_dir()
    }

    /// Builds the environment in a staging directory and renames it into
    /// place, so a half-provisioned environment is never visible by name.
    pub fn create(
        &self,
        version: &VersionId,
        name: &EnvName,
        remark: Option<&str>,
    ) -> Result<PathBuf> {
        if !self.layout.version_root(version).is_dir() {
            return Err(VgError::NotInstalled {
                version: version.to_string(),
            });
        }

        let env_dir = self.layout.env_dir(version, name);
        if fs::symlink_metadata(&env_dir).is_ok() {
            return Err(VgError::AlreadyExists {
                version: version.to_string(),
                name: name.to_string(),
            });
        }

        let parent = self.layout.version_envs_dir(version);
        ensure_dir(&parent)?;
        let staging = parent.join(format!(".{name}.staging-{}", std::process::id()));
        remove_dir_all_if_exists(&staging)
            .map_err(|source| VgError::io("clear environment staging", &staging, source))?;

        let staged = provision_env_tree(&staging, version, name, remark).and_then(|()| {
            fs::rename(&staging, &env_dir)
                .map_err(|source| VgError::io("move environment into place", &env_dir, source))
        });
        if let Err(err) = staged {
            let _ = remove_dir_all_if_exists(&staging);
            return Err(err);
        }

        info!(version = %version, name = %name, "created environment");
        Ok(env_dir)
    }

    /// Deletes an environment unless the workspace link currently points into it.
    pub fn remove(&self, version: &VersionId, name: &EnvName) -> Result<()> {
        let env_dir = self.layout.env_dir(version, name);
        if !env_dir.is_dir() {
            return Err(VgError::EnvironmentNotFound {
                version: version.to_string(),
                name: name.to_string(),
            });
        }

        if self.is_active(version, name) {
            return Err(VgError::EnvironmentActive {
                version: version.to_string(),
                name: name.to_string(),
            });
        }

        fs::remove_dir_all(&env_dir)
            .map_err(|source| VgError::io("remove environment", &env_dir, source))?;
        info!(version = %version, name = %name, "removed environment");
        Ok(())
    }

    /// Whether the workspace link resolves into this environment.
    ///
    /// Both sides are canonicalized, so a root reached through a symlinked
    /// home directory still compares equal.
    pub fn is_active(&self, version: &VersionId, name: &EnvName) -> bool {
        let link = self.layout.link_path(ActivationLink::Workspace);
        let Ok(active_gopath) = link.canonicalize() else {
            return false;
        };
        let Ok(env_dir) = self.layout.env_dir(version, name).canonicalize() else {
            return false;
        };
        active_gopath.parent() == Some(env_dir.as_path())
    }

    /// Environments of `version` sorted by name. Remarks are read as the
    /// iterator advances; each call re-reads the directory.
    pub fn list(&self, version: &VersionId) -> Result<Environments> {
        let dir = self.layout.version_envs_dir(version);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Environments::empty(dir));
            }
            Err(source) => return Err(VgError::io("read environments", &dir, source)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| VgError::io("read environments", &dir, source))?;
            if !entry.path().is_dir() {
                continue;
            }
            let Some(raw) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if let Ok(name) = EnvName::parse(&raw) {
                if name.as_str() == raw {
                    names.push(name);
                }
            }
        }
        names.sort();

        Ok(Environments {
            dir,
            names: names.into_iter(),
        })
    }

    /// The environment's remark, or an empty string when none was recorded.
    pub fn describe(&self, version: &VersionId, name: &EnvName) -> Result<String> {
        if !self.exists(version, name) {
            return Err(VgError::EnvironmentNotFound {
                version: version.to_string(),
                name: name.to_string(),
            });
        }
        let path = self.layout.env_remark_path(version, name);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(raw.trim().to_string()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(VgError::io("read remark", &path, source)),
        }
    }
}

/// Lazy listing produced by [`EnvironmentRegistry::list`].
#[derive(Debug)]
pub struct Environments {
    dir: PathBuf,
    names: std::vec::IntoIter<EnvName>,
}

impl Environments {
    fn empty(dir: PathBuf) -> Self {
        Self {
            dir,
            names: Vec::new().into_iter(),
        }
    }
}

impl Iterator for Environments {
    type Item = EnvironmentEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.next()?;
        let remark = read_remark(&self.dir.join(name.as_str()));
        Some(EnvironmentEntry { name, remark })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

fn read_remark(env_dir: &Path) -> String {
    let path = env_dir.join(REMARK_FILE_NAME);
    match fs::read_to_string(&path) {
        Ok(raw) => raw.trim().to_string(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read environment remark");
            String::new()
        }
    }
}
