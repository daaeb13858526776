use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIRROR: &str = "https://go.dev/dl/";

/// Contents of `<root>/config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VgConfig {
    #[serde(default)]
    pub install: InstallConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallConfig {
    #[serde(default)]
    pub auto_install: AutoInstallPolicy,
    #[serde(default = "default_mirror")]
    pub mirror: String,
    #[serde(default = "default_verify_checksum")]
    pub verify_checksum: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            auto_install: AutoInstallPolicy::default(),
            mirror: default_mirror(),
            verify_checksum: default_verify_checksum(),
        }
    }
}

/// What `vg use` does when the requested version is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoInstallPolicy {
    #[default]
    Prompt,
    Always,
    Never,
}

impl VgConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse vg config")?;
        if config.install.mirror.trim().is_empty() {
            anyhow::bail!("install.mirror must not be empty");
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("failed parsing config: {}", path.display()))
    }
}

fn default_mirror() -> String {
    DEFAULT_MIRROR.to_string()
}

fn default_verify_checksum() -> bool {
    true
}
