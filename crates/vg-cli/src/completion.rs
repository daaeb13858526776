use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use vg_core::ActivationLink;
use vg_installer::RootLayout;

use crate::{Cli, CliShell};

/// Keys `init` exports itself; the settings file cannot override them.
const MANAGED_KEYS: [&str; 5] = ["GOROOT", "GOPATH", "GOMODCACHE", "GOCACHE", "GOENV"];

pub(crate) fn write_completions_script<W: Write>(shell: CliShell, writer: &mut W) -> Result<()> {
    let mut command = Cli::command();
    let generator: Shell = shell.into();
    let mut generated = Vec::new();
    clap_complete::generate(generator, &mut command, "vg", &mut generated);
    writer
        .write_all(&generated)
        .with_context(|| "failed writing generated completion script")
}

pub(crate) fn detect_shell_from_env(shell_env: Option<&str>) -> Option<CliShell> {
    let shell_value = shell_env?;
    let shell_token = Path::new(shell_value)
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or(shell_value)
        .to_ascii_lowercase();
    match shell_token.trim_end_matches(".exe") {
        "bash" => Some(CliShell::Bash),
        "zsh" => Some(CliShell::Zsh),
        "fish" => Some(CliShell::Fish),
        "powershell" | "pwsh" => Some(CliShell::Powershell),
        _ => None,
    }
}

pub(crate) fn resolve_init_shell(
    requested_shell: Option<CliShell>,
    shell_env: Option<&str>,
    is_windows: bool,
) -> CliShell {
    if let Some(shell) = requested_shell {
        return shell;
    }
    if let Some(shell) = detect_shell_from_env(shell_env) {
        return shell;
    }
    if is_windows {
        CliShell::Powershell
    } else {
        CliShell::Bash
    }
}

/// Shell lines exporting the link paths, PATH additions and the extra
/// `KEY=VALUE` entries of the active settings file.
pub(crate) fn format_init_snippet(layout: &RootLayout, shell: CliShell) -> Result<Vec<String>> {
    let current = layout.link_path(ActivationLink::Version);
    if fs::symlink_metadata(&current).is_err() {
        return Ok(vec![
            "# vg: No Go version is currently active".to_string(),
            "# Run 'vg use <version>' to activate a version".to_string(),
        ]);
    }

    let gomodcache = layout.gomodcache_dir();
    fs::create_dir_all(&gomodcache).with_context(|| {
        format!(
            "failed to create module cache directory: {}",
            gomodcache.display()
        )
    })?;

    let mut exports: Vec<(String, String)> = ActivationLink::ALL
        .iter()
        .map(|link| {
            (
                link.env_var().to_string(),
                layout.link_path(*link).display().to_string(),
            )
        })
        .collect();
    exports.push(("GOMODCACHE".to_string(), gomodcache.display().to_string()));

    let mut lines = exports
        .iter()
        .map(|(key, value)| export_line(shell, key, value))
        .collect::<Vec<_>>();

    let path_entries = [
        current.join("bin"),
        layout.link_path(ActivationLink::Workspace).join("bin"),
    ];
    lines.push(path_line(shell, &path_entries));

    let settings_path = layout.link_path(ActivationLink::Settings);
    match fs::read_to_string(&settings_path) {
        Ok(raw) => {
            for (key, value) in parse_settings_exports(&raw) {
                lines.push(export_line(shell, &key, &value));
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(
                path = %settings_path.display(),
                error = %err,
                "failed to read settings file"
            );
        }
    }

    Ok(lines)
}

/// `KEY=VALUE` pairs of a settings file, skipping comments, malformed lines
/// and the managed keys.
pub(crate) fn parse_settings_exports(raw: &str) -> Vec<(String, String)> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| is_env_key(key) && !MANAGED_KEYS.contains(key))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn is_env_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn export_line(shell: CliShell, key: &str, value: &str) -> String {
    match shell {
        CliShell::Bash | CliShell::Zsh => {
            format!("export {key}='{}'", escape_single_quote_shell(value))
        }
        CliShell::Fish => format!("set -gx {key} '{}'", escape_single_quote_shell(value)),
        CliShell::Powershell => format!("$env:{key} = '{}'", escape_ps_single_quote(value)),
    }
}

fn path_line(shell: CliShell, entries: &[PathBuf]) -> String {
    let rendered = entries
        .iter()
        .map(|entry| entry.display().to_string())
        .collect::<Vec<_>>();
    match shell {
        CliShell::Bash | CliShell::Zsh => {
            let joined = rendered
                .iter()
                .map(|entry| escape_single_quote_shell(entry))
                .collect::<Vec<_>>()
                .join(":");
            format!("export PATH='{joined}':\"$PATH\"")
        }
        CliShell::Fish => {
            let quoted = rendered
                .iter()
                .map(|entry| format!("'{}'", escape_single_quote_shell(entry)))
                .collect::<Vec<_>>()
                .join(" ");
            format!("set -gx PATH {quoted} $PATH")
        }
        CliShell::Powershell => {
            let separator = if cfg!(windows) { ";" } else { ":" };
            let joined = rendered
                .iter()
                .map(|entry| escape_ps_single_quote(entry))
                .collect::<Vec<_>>()
                .join(separator);
            format!("$env:PATH = '{joined}{separator}' + $env:PATH")
        }
    }
}

pub(crate) fn escape_single_quote_shell(value: &str) -> String {
    value.replace('\'', "'\"'\"'")
}

pub(crate) fn escape_ps_single_quote(value: &str) -> String {
    value.replace('\'', "''")
}
