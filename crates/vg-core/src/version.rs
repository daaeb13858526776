use std::cmp::Ordering;
use std::fmt;

use semver::Version;

use crate::error::{Result, VgError};

/// Normalized Go release identifier, without the `go` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionId(String);

impl VersionId {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let normalized = trimmed.strip_prefix("go").unwrap_or(trimmed);
        if !is_path_safe_segment(normalized) {
            return Err(VgError::InvalidVersion(raw.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Go release names mapped onto semver, e.g. `1.21rc2` -> `1.21.0-rc.2`.
    pub fn semver(&self) -> Option<Version> {
        go_version_to_semver(&self.0)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for VersionId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.semver(), other.semver()) {
            (Some(left), Some(right)) => left.cmp(&right).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for VersionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Name of an environment nested under one installed version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnvName(String);

impl EnvName {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        // dot-prefixed names are reserved for staging directories
        if !is_path_safe_segment(trimmed) || trimmed.starts_with('.') {
            return Err(VgError::InvalidEnvName(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_path_safe_segment(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_whitespace())
}

fn go_version_to_semver(raw: &str) -> Option<Version> {
    let split_at = raw
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(raw.len());
    let (numeric, suffix) = raw.split_at(split_at);

    let mut parts = numeric
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    parts.resize(3, 0);

    let mut rendered = format!("{}.{}.{}", parts[0], parts[1], parts[2]);
    if !suffix.is_empty() {
        let digits_at = suffix
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(suffix.len());
        let (label, number) = suffix.split_at(digits_at);
        if label.is_empty() || !label.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        rendered.push('-');
        rendered.push_str(label);
        if !number.is_empty() {
            rendered.push('.');
            rendered.push_str(number);
        }
    }

    Version::parse(&rendered).ok()
}
