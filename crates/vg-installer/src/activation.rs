use std::path::{Path, PathBuf};

use tracing::{debug, info};
use vg_core::{ActivationLink, ActiveContext, EnvName, Result, VersionId, VgError};

use crate::links::{LinkSet, LinkSnapshot, LinkTransition};
use crate::provision::{ensure_dir, ensure_version_aux};
use crate::RootLayout;

/// Outcome of a state change: the context now in effect and the links touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub context: ActiveContext,
    pub transition: LinkTransition,
}

/// Reads and moves the active (version, environment) pair.
///
/// No state is kept between calls; every operation starts by reading the
/// links back from disk.
#[derive(Debug, Clone, Copy)]
pub struct ActivationEngine<'a> {
    layout: &'a RootLayout,
}

impl<'a> ActivationEngine<'a> {
    pub fn new(layout: &'a RootLayout) -> Self {
        Self { layout }
    }

    pub fn links(&self) -> LinkSet<'a> {
        LinkSet::new(self.layout)
    }

    pub fn snapshot(&self) -> Result<LinkSnapshot> {
        self.links().snapshot()
    }

    pub fn is_installed(&self, version: &VersionId) -> bool {
        self.layout.version_root(version).is_dir()
    }

    /// Activates `version` in its global shape. Any scoped environment of the
    /// previous version is dropped.
    pub fn switch_version(&self, version: &VersionId) -> Result<Activation> {
        if !self.is_installed(version) {
            return Err(VgError::NotInstalled {
                version: version.to_string(),
            });
        }

        ensure_dir(self.layout.root())?;
        ensure_version_aux(self.layout, version)?;

        let context = ActiveContext::Global {
            version: version.clone(),
        };
        let transition = self.links().apply(&self.layout.link_targets(&context))?;
        info!(version = %version, changed = transition.changed.len(), "switched version");
        Ok(Activation {
            context,
            transition,
        })
    }

    /// Points the workspace, cache and settings links at an environment of the
    /// active version. The version link is left alone.
    pub fn enter_environment(&self, name: &EnvName) -> Result<Activation> {
        let version = self.active_version()?;
        let env_dir = self.layout.env_dir(&version, name);
        if !env_dir.is_dir() {
            return Err(VgError::EnvironmentNotFound {
                version: version.to_string(),
                name: name.to_string(),
            });
        }

        let context = ActiveContext::Scoped {
            version,
            name: name.clone(),
        };
        let transition = self.apply_auxiliary(&context)?;
        info!(context = %context, "entered environment");
        Ok(Activation {
            context,
            transition,
        })
    }

    /// Returns the auxiliary links to the active version's own directories.
    /// Calling it while already global changes nothing.
    pub fn exit_to_global(&self) -> Result<Activation> {
        let version = self.active_version()?;
        ensure_version_aux(self.layout, &version)?;

        let context = ActiveContext::Global { version };
        let transition = self.apply_auxiliary(&context)?;
        debug!(context = %context, changed = transition.changed.len(), "exited to global");
        Ok(Activation {
            context,
            transition,
        })
    }

    /// Derives the active context from the version and workspace links.
    pub fn current_context(&self) -> Result<ActiveContext> {
        let version = self.active_version()?;

        let Some(target) = self.links().read(ActivationLink::Workspace)? else {
            return Err(VgError::BrokenLink {
                link: ActivationLink::Workspace.file_name().to_string(),
                reason: format!(
                    "link is missing while Go {version} is active (run 'vg use {version}')"
                ),
            });
        };

        match self.classify_workspace(&target) {
            Some(ActiveContext::Scoped {
                version: env_version,
                name,
            }) => {
                if env_version != version {
                    return Err(mixed_links(&env_version, &version));
                }
                if !self.layout.env_dir(&version, &name).is_dir() {
                    return Err(VgError::BrokenLink {
                        link: ActivationLink::Workspace.file_name().to_string(),
                        reason: format!(
                            "environment '{name}' of Go {version} no longer exists \
                             (run 'vg env exit')"
                        ),
                    });
                }
                Ok(ActiveContext::Scoped { version, name })
            }
            Some(ActiveContext::Global {
                version: linked_version,
            }) if linked_version != version => Err(mixed_links(&linked_version, &version)),
            _ => Ok(ActiveContext::Global { version }),
        }
    }

    /// Version named by the `current` link.
    pub fn active_version(&self) -> Result<VersionId> {
        self.active_version_if_any()?.ok_or(VgError::NoActiveVersion)
    }

    pub fn active_version_if_any(&self) -> Result<Option<VersionId>> {
        let Some(version) = self.linked_version()? else {
            return Ok(None);
        };
        if !self.is_installed(&version) {
            return Err(VgError::BrokenLink {
                link: ActivationLink::Version.file_name().to_string(),
                reason: format!("Go {version} is no longer installed (run 'vg use <version>')"),
            });
        }
        Ok(Some(version))
    }

    /// Version the `current` link names, whether or not it is still installed.
    pub fn linked_version(&self) -> Result<Option<VersionId>> {
        let Some(target) = self.links().read(ActivationLink::Version)? else {
            return Ok(None);
        };

        self.root_relative(&target)
            .and_then(|relative| self.layout.classify_version_target(&relative))
            .map(Some)
            .ok_or_else(|| VgError::BrokenLink {
                link: ActivationLink::Version.file_name().to_string(),
                reason: format!(
                    "target {} is not an installed version directory",
                    target.display()
                ),
            })
    }

    fn apply_auxiliary(&self, context: &ActiveContext) -> Result<LinkTransition> {
        let updates = self
            .layout
            .link_targets(context)
            .into_iter()
            .filter(|(link, _)| *link != ActivationLink::Version)
            .collect::<Vec<_>>();
        self.links().apply(&updates)
    }

    fn classify_workspace(&self, target: &Path) -> Option<ActiveContext> {
        let relative = self.root_relative(target)?;
        self.layout.classify_gopath_target(&relative)
    }

    /// Expresses a link target relative to the root. Absolute targets written
    /// through a symlinked root are matched against the canonical root too.
    fn root_relative(&self, target: &Path) -> Option<PathBuf> {
        if !target.is_absolute() {
            return Some(target.to_path_buf());
        }
        if let Ok(relative) = target.strip_prefix(self.layout.root()) {
            return Some(relative.to_path_buf());
        }

        let canonical_root = self.layout.root().canonicalize().ok()?;
        let canonical_target = target.canonicalize().ok()?;
        canonical_target
            .strip_prefix(&canonical_root)
            .ok()
            .map(Path::to_path_buf)
    }
}

fn mixed_links(linked: &VersionId, active: &VersionId) -> VgError {
    VgError::BrokenLink {
        link: ActivationLink::Workspace.file_name().to_string(),
        reason: format!(
            "points at Go {linked} while Go {active} is active (run 'vg use {active}' to repair)"
        ),
    }
}
