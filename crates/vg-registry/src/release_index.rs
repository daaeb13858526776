use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vg_core::{ArchiveType, VersionId};

/// One entry of the go.dev download index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoRelease {
    pub version: String,
    #[serde(default)]
    pub stable: bool,
    #[serde(default)]
    pub files: Vec<GoFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoFile {
    pub filename: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub sha256: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub kind: String,
}

impl GoFile {
    pub fn archive_type(&self) -> Option<ArchiveType> {
        ArchiveType::infer_from_filename(&self.filename)
    }
}

pub fn parse_release_index(raw: &str) -> Result<Vec<GoRelease>> {
    serde_json::from_str(raw).context("failed to parse go.dev release index")
}

/// The `kind == "archive"` file of `version` for the given platform.
pub fn select_archive<'a>(
    releases: &'a [GoRelease],
    version: &VersionId,
    os: &str,
    arch: &str,
) -> Result<&'a GoFile> {
    let tag = format!("go{version}");
    let release = releases
        .iter()
        .find(|release| release.version == tag)
        .with_context(|| format!("Go {version} is not listed in the release index"))?;

    release
        .files
        .iter()
        .find(|file| file.kind == "archive" && file.os == os && file.arch == arch)
        .with_context(|| format!("Go {version} has no archive for {os}/{arch}"))
}

/// go.dev file name for a platform archive, e.g. `go1.22.0.linux-amd64.tar.gz`.
pub fn archive_file_name(version: &VersionId, os: &str, arch: &str) -> String {
    format!(
        "go{version}.{os}-{arch}.{}",
        ArchiveType::for_goos(os).as_str()
    )
}

pub fn index_url(mirror: &str) -> String {
    format!("{}/?mode=json&include=all", mirror.trim_end_matches('/'))
}

/// `GOOS` value for the running platform.
pub fn go_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// `GOARCH` value for the running platform.
pub fn go_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "arm" => "armv6l",
        other => other,
    }
}
