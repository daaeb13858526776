use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use vg_core::{ActivationLink, ActiveContext, EnvName, VersionId};

pub const SETTINGS_EXTENSION: &str = "env";
pub const REMARK_FILE_NAME: &str = "remark.txt";
pub const WORKSPACE_SUBDIRS: [&str; 3] = ["src", "bin", "pkg"];

/// Pure mapping from the root directory and identifiers to managed paths.
///
/// Nothing here touches the filesystem; identifiers are validated when the
/// `VersionId`/`EnvName` values are constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootLayout {
    root: PathBuf,
}

impl RootLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sdks_dir(&self) -> PathBuf {
        self.root.join("sdks")
    }

    pub fn gopaths_dir(&self) -> PathBuf {
        self.root.join("gopaths")
    }

    pub fn gocaches_dir(&self) -> PathBuf {
        self.root.join("gocaches")
    }

    pub fn goenvs_dir(&self) -> PathBuf {
        self.root.join("goenvs")
    }

    pub fn envs_dir(&self) -> PathBuf {
        self.root.join("envs")
    }

    pub fn dists_dir(&self) -> PathBuf {
        self.root.join("dists")
    }

    pub fn gomodcache_dir(&self) -> PathBuf {
        self.root.join("gomodcache")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn version_root(&self, version: &VersionId) -> PathBuf {
        self.root.join(self.version_root_rel(version))
    }

    pub fn version_gopath(&self, version: &VersionId) -> PathBuf {
        self.root.join(self.version_gopath_rel(version))
    }

    pub fn version_gocache(&self, version: &VersionId) -> PathBuf {
        self.root.join(self.version_gocache_rel(version))
    }

    pub fn version_goenv(&self, version: &VersionId) -> PathBuf {
        self.root.join(self.version_goenv_rel(version))
    }

    pub fn version_envs_dir(&self, version: &VersionId) -> PathBuf {
        self.envs_dir().join(version.as_str())
    }

    pub fn env_dir(&self, version: &VersionId, name: &EnvName) -> PathBuf {
        self.root.join(self.env_dir_rel(version, name))
    }

    pub fn env_gopath(&self, version: &VersionId, name: &EnvName) -> PathBuf {
        self.env_dir(version, name).join("gopath")
    }

    pub fn env_gocache(&self, version: &VersionId, name: &EnvName) -> PathBuf {
        self.env_dir(version, name).join("gocache")
    }

    pub fn env_goenv(&self, version: &VersionId, name: &EnvName) -> PathBuf {
        self.env_dir(version, name).join("goenv")
    }

    pub fn env_remark_path(&self, version: &VersionId, name: &EnvName) -> PathBuf {
        self.env_dir(version, name).join(REMARK_FILE_NAME)
    }

    pub fn link_path(&self, link: ActivationLink) -> PathBuf {
        self.root.join(link.file_name())
    }

    /// Root-relative link targets for the given context, in link order.
    pub fn link_targets(&self, context: &ActiveContext) -> Vec<(ActivationLink, PathBuf)> {
        ActivationLink::ALL
            .iter()
            .map(|link| (*link, self.link_target(context, *link)))
            .collect()
    }

    pub fn link_target(&self, context: &ActiveContext, link: ActivationLink) -> PathBuf {
        let version = context.version();
        match (context, link) {
            (_, ActivationLink::Version) => self.version_root_rel(version),
            (ActiveContext::Global { .. }, ActivationLink::Workspace) => {
                self.version_gopath_rel(version)
            }
            (ActiveContext::Global { .. }, ActivationLink::Cache) => {
                self.version_gocache_rel(version)
            }
            (ActiveContext::Global { .. }, ActivationLink::Settings) => {
                self.version_goenv_rel(version)
            }
            (ActiveContext::Scoped { name, .. }, ActivationLink::Workspace) => {
                self.env_dir_rel(version, name).join("gopath")
            }
            (ActiveContext::Scoped { name, .. }, ActivationLink::Cache) => {
                self.env_dir_rel(version, name).join("gocache")
            }
            (ActiveContext::Scoped { name, .. }, ActivationLink::Settings) => {
                self.env_dir_rel(version, name).join("goenv")
            }
        }
    }

    /// Recovers the version named by a `current` link target.
    pub fn classify_version_target(&self, target: &Path) -> Option<VersionId> {
        let parts = self.root_relative_parts(target)?;
        match parts.as_slice() {
            [sdks, version] if sdks == "sdks" => VersionId::parse(version).ok(),
            _ => None,
        }
    }

    /// Structural tagging of a `current-gopath` link target.
    ///
    /// `gopaths/<version>` is global, `envs/<version>/<name>/gopath` is scoped;
    /// anything else is not a target this layout produces.
    pub fn classify_gopath_target(&self, target: &Path) -> Option<ActiveContext> {
        let parts = self.root_relative_parts(target)?;
        match parts.as_slice() {
            [gopaths, version] if gopaths == "gopaths" => Some(ActiveContext::Global {
                version: VersionId::parse(version).ok()?,
            }),
            [envs, version, name, gopath] if envs == "envs" && gopath == "gopath" => {
                Some(ActiveContext::Scoped {
                    version: VersionId::parse(version).ok()?,
                    name: EnvName::parse(name).ok()?,
                })
            }
            _ => None,
        }
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.sdks_dir(),
            self.gopaths_dir(),
            self.gocaches_dir(),
            self.goenvs_dir(),
            self.envs_dir(),
            self.dists_dir(),
            self.tmp_dir(),
        ] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    fn version_root_rel(&self, version: &VersionId) -> PathBuf {
        Path::new("sdks").join(version.as_str())
    }

    fn version_gopath_rel(&self, version: &VersionId) -> PathBuf {
        Path::new("gopaths").join(version.as_str())
    }

    fn version_gocache_rel(&self, version: &VersionId) -> PathBuf {
        Path::new("gocaches").join(version.as_str())
    }

    fn version_goenv_rel(&self, version: &VersionId) -> PathBuf {
        Path::new("goenvs").join(format!("{}.{SETTINGS_EXTENSION}", version.as_str()))
    }

    fn env_dir_rel(&self, version: &VersionId, name: &EnvName) -> PathBuf {
        Path::new("envs").join(version.as_str()).join(name.as_str())
    }

    fn root_relative_parts(&self, target: &Path) -> Option<Vec<String>> {
        let relative = if target.is_absolute() {
            target.strip_prefix(&self.root).ok()?
        } else {
            target
        };

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?.to_string()),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(parts)
    }
}

pub fn default_root() -> Result<PathBuf> {
    if let Some(explicit) = std::env::var_os("VG_HOME").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(explicit));
    }

    if cfg!(windows) {
        let app_data = std::env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows vg root")?;
        return Ok(PathBuf::from(app_data).join("vg"));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve vg root")?;
    Ok(PathBuf::from(home).join(".vg"))
}
