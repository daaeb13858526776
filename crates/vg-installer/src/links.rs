use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use vg_core::{ActivationLink, Result, VgError};

use crate::fs_utils::{create_symlink, read_link_if_exists};
use crate::RootLayout;

/// The four `current-*` links of one root, updated as an ordered transition.
///
/// Each link is swapped by creating the new symlink under a temporary sibling
/// name and renaming it over the old one, so a reader sees either the old or
/// the new target for that link. The set as a whole is not transactional: a
/// failure on the second link leaves the first one already replaced.
#[derive(Debug, Clone, Copy)]
pub struct LinkSet<'a> {
    layout: &'a RootLayout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTransition {
    pub changed: Vec<ActivationLink>,
    pub unchanged: Vec<ActivationLink>,
}

impl LinkTransition {
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}

/// What a single `current-*` path holds on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Missing,
    Target(PathBuf),
    /// Something other than a symlink sits at the link path.
    Unreadable(String),
}

/// Raw link targets as found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSnapshot {
    states: Vec<(ActivationLink, LinkState)>,
}

impl LinkSnapshot {
    pub fn iter(&self) -> impl Iterator<Item = (ActivationLink, &LinkState)> {
        self.states.iter().map(|(link, state)| (*link, state))
    }

    pub fn present_count(&self) -> usize {
        self.states
            .iter()
            .filter(|(_, state)| matches!(state, LinkState::Target(_)))
            .count()
    }

    pub fn problems(&self) -> impl Iterator<Item = (ActivationLink, &str)> {
        self.states.iter().filter_map(|(link, state)| match state {
            LinkState::Unreadable(reason) => Some((*link, reason.as_str())),
            _ => None,
        })
    }

    /// All four links exist, or none do, and every one is a symlink.
    pub fn is_complete_or_empty(&self) -> bool {
        let present = self.present_count();
        self.problems().next().is_none() && (present == 0 || present == self.states.len())
    }
}

impl<'a> LinkSet<'a> {
    pub fn new(layout: &'a RootLayout) -> Self {
        Self { layout }
    }

    pub fn read(&self, link: ActivationLink) -> Result<Option<PathBuf>> {
        let path = self.layout.link_path(link);
        match read_link_if_exists(&path) {
            Ok(target) => Ok(target),
            Err(err) if err.kind() == io::ErrorKind::InvalidInput => Err(VgError::BrokenLink {
                link: link.file_name().to_string(),
                reason: format!("{} is not a symbolic link", path.display()),
            }),
            Err(source) => Err(VgError::io(format!("read {link} link"), &path, source)),
        }
    }

    /// Reads every link. Paths that are not symlinks are recorded rather
    /// than failing, since a half-applied transition can leave them behind.
    pub fn snapshot(&self) -> Result<LinkSnapshot> {
        let mut states = Vec::with_capacity(ActivationLink::ALL.len());
        for link in ActivationLink::ALL {
            let state = match self.read(link) {
                Ok(Some(target)) => LinkState::Target(target),
                Ok(None) => LinkState::Missing,
                Err(VgError::BrokenLink { reason, .. }) => LinkState::Unreadable(reason),
                Err(err) => return Err(err),
            };
            states.push((link, state));
        }
        Ok(LinkSnapshot { states })
    }

    /// Points each link at its new target, in order, skipping links that
    /// already have the desired target.
    pub fn apply(&self, updates: &[(ActivationLink, PathBuf)]) -> Result<LinkTransition> {
        let mut transition = LinkTransition::default();
        for (link, target) in updates {
            let link_path = self.layout.link_path(*link);
            let current = match read_link_if_exists(&link_path) {
                Ok(current) => current,
                Err(err) => {
                    debug!(
                        link = link.file_name(),
                        error = %err,
                        "unreadable link will be replaced"
                    );
                    None
                }
            };
            if current.as_deref() == Some(target.as_path()) {
                transition.unchanged.push(*link);
                continue;
            }
            self.replace(*link, target)?;
            transition.changed.push(*link);
        }
        Ok(transition)
    }

    fn replace(&self, link: ActivationLink, target: &Path) -> Result<()> {
        let link_path = self.layout.link_path(link);
        let staged_path = self
            .layout
            .root()
            .join(format!(".{}.tmp-{}", link.file_name(), std::process::id()));
        let action = format!("replace {link} link");

        remove_link_if_exists(&staged_path)
            .map_err(|source| VgError::io(action.clone(), &staged_path, source))?;
        create_symlink(target, &staged_path, link.targets_file())
            .map_err(|source| VgError::io(action.clone(), &link_path, source))?;

        if cfg!(windows) {
            // rename cannot replace an existing directory link there
            if let Err(source) = remove_link_if_exists(&link_path) {
                let _ = remove_link_if_exists(&staged_path);
                return Err(VgError::io(action, &link_path, source));
            }
        }

        if let Err(source) = fs::rename(&staged_path, &link_path) {
            let _ = remove_link_if_exists(&staged_path);
            return Err(VgError::io(action, &link_path, source));
        }

        debug!(
            link = link.file_name(),
            target = %target.display(),
            "replaced activation link"
        );
        Ok(())
    }
}

fn remove_link_if_exists(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path).is_err() {
        return Ok(());
    }
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(_) if cfg!(windows) => fs::remove_dir(path),
        Err(err) => Err(err),
    }
}
