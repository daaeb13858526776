mod activation;
mod artifact;
mod environments;
mod fs_utils;
mod layout;
mod links;
mod provision;
mod versions;

pub use activation::{Activation, ActivationEngine};
pub use environments::{EnvironmentEntry, EnvironmentRegistry, Environments};
pub use layout::{
    default_root, RootLayout, REMARK_FILE_NAME, SETTINGS_EXTENSION, WORKSPACE_SUBDIRS,
};
pub use links::{LinkSet, LinkSnapshot, LinkState, LinkTransition};
pub use provision::ensure_version_aux;
pub use versions::{install_version, installed_versions, remove_version, VersionRemoval};
