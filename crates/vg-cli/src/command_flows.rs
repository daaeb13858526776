use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use vg_core::{ActiveContext, AutoInstallPolicy, EnvName, VersionId, VgConfig, VgError};
use vg_installer::{
    install_version, installed_versions, remove_version, ActivationEngine, EnvironmentRegistry,
    LinkState, RootLayout,
};
use vg_registry::GoDevFetcher;

use crate::render::{DownloadProgress, OutputStyle, TerminalRenderer};

pub(crate) fn run_install_command(
    layout: &RootLayout,
    config: &VgConfig,
    version: &VersionId,
    renderer: TerminalRenderer,
) -> Result<()> {
    renderer.print_status("step", &format!("installing Go {version}"));
    let fetcher = build_fetcher(config, renderer.style());
    let installed = install_version(layout, version, &fetcher)?;
    renderer.print_status(
        "ok",
        &format!("installed Go {version} at {}", installed.display()),
    );
    Ok(())
}

fn build_fetcher(config: &VgConfig, style: OutputStyle) -> GoDevFetcher {
    let fetcher = GoDevFetcher::new(
        config.install.mirror.clone(),
        config.install.verify_checksum,
    );
    match style {
        OutputStyle::Plain => fetcher,
        OutputStyle::Rich => fetcher.with_observer(Box::new(DownloadProgress::new())),
    }
}

/// Switches to `version`, installing it first when the auto-install policy
/// (or the user, for `prompt`) allows.
pub(crate) fn run_use_command(
    layout: &RootLayout,
    config: &VgConfig,
    version: &VersionId,
    renderer: TerminalRenderer,
    confirm_install: &mut dyn FnMut(&VersionId) -> Result<bool>,
) -> Result<()> {
    let engine = ActivationEngine::new(layout);
    if !engine.is_installed(version) {
        let install = match config.install.auto_install {
            AutoInstallPolicy::Always => true,
            AutoInstallPolicy::Never => false,
            AutoInstallPolicy::Prompt => confirm_install(version)?,
        };
        if !install {
            renderer.print_status(
                "step",
                &format!(
                    "run 'vg install {version}' to install this version, \
                     or 'vg list' to see installed versions"
                ),
            );
            return Err(VgError::NotInstalled {
                version: version.to_string(),
            }
            .into());
        }
        run_install_command(layout, config, version, renderer)?;
    }

    let activation = engine.switch_version(version)?;
    if activation.transition.is_noop() {
        renderer.print_status("ok", &format!("Go {version} is already active"));
    } else {
        renderer.print_status("ok", &format!("switched to Go {version}"));
    }
    Ok(())
}

/// Asks on the terminal whether a missing version should be installed.
/// A non-interactive stdin counts as "no".
pub(crate) fn prompt_install(version: &VersionId) -> Result<bool> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Ok(false);
    }

    print!("Go {version} is not installed. Do you want to install it? [y/N] ");
    io::stdout().flush().context("failed to flush prompt")?;
    let mut answer = String::new();
    stdin
        .lock()
        .read_line(&mut answer)
        .context("failed to read answer")?;
    Ok(parse_confirmation(&answer))
}

pub(crate) fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub(crate) fn run_remove_command(
    layout: &RootLayout,
    version: &VersionId,
    renderer: TerminalRenderer,
) -> Result<()> {
    renderer.print_status("step", &format!("removing Go {version}"));
    let spinner = renderer.start_spinner("Deleting files...");
    let removal = remove_version(layout, version);
    spinner.finish();

    let removal = removal?;
    for warning in &removal.warnings {
        renderer.print_status("warn", warning);
    }
    renderer.print_status(
        "ok",
        &format!("removed Go {version} (SDK, GOPATH, GOENV, GOCACHE and environments)"),
    );
    Ok(())
}

pub(crate) fn format_list_lines(layout: &RootLayout) -> Result<Vec<String>> {
    let versions = installed_versions(layout)?;
    if versions.is_empty() {
        return Ok(vec!["No Go versions installed yet.".to_string()]);
    }

    let active = ActivationEngine::new(layout)
        .active_version_if_any()
        .ok()
        .flatten();
    let registry = EnvironmentRegistry::new(layout);

    let mut lines = vec![format!("Installed Go versions ({}):", versions.len())];
    for version in &versions {
        if active.as_ref() == Some(version) {
            lines.push(format!("  - {version} (active)"));
        } else {
            lines.push(format!("  - {version}"));
        }

        for entry in registry.list(version)? {
            if entry.remark.is_empty() {
                lines.push(format!("      * {}", entry.name));
            } else {
                lines.push(format!("      * {} ({})", entry.name, entry.remark));
            }
        }
    }
    Ok(lines)
}

pub(crate) fn format_status_lines(layout: &RootLayout) -> Result<Vec<String>> {
    let engine = ActivationEngine::new(layout);
    let snapshot = engine.snapshot()?;
    let mut lines = Vec::new();

    match engine.current_context() {
        Ok(context) => {
            lines.push(format!("Go Version:  {}", context.version()));
            match &context {
                ActiveContext::Global { .. } => lines.push("Environment: (global)".to_string()),
                ActiveContext::Scoped { version, name } => {
                    lines.push(format!("Environment: {name}"));
                    let remark = EnvironmentRegistry::new(layout).describe(version, name)?;
                    if !remark.is_empty() {
                        lines.push(format!("Remark:      {remark}"));
                    }
                }
            }
        }
        Err(VgError::NoActiveVersion) => {
            lines.push("Go Version:  Not set (run 'vg use <version>')".to_string());
            lines.push("Environment: (global)".to_string());
        }
        Err(err) => {
            lines.push(format!("Go Version:  {err}"));
        }
    }

    if !snapshot.is_complete_or_empty() {
        let problems = snapshot
            .problems()
            .map(|(link, reason)| format!("{link}: {reason}"))
            .collect::<Vec<_>>();
        if problems.is_empty() {
            lines.push("Links:       incomplete (run 'vg use <version>' to repair)".to_string());
        } else {
            lines.push(format!(
                "Links:       incomplete; {} (run 'vg use <version>' to repair)",
                problems.join("; ")
            ));
        }
    }

    lines.push(String::new());
    for (link, state) in snapshot.iter() {
        let label = format!("{}:", link.env_var());
        let rendered = match state {
            LinkState::Target(target) => layout.root().join(target).display().to_string(),
            LinkState::Missing => String::new(),
            LinkState::Unreadable(_) => "(not a link)".to_string(),
        };
        lines.push(format!("{label:<13}{rendered}"));
    }
    Ok(lines)
}

pub(crate) fn run_env_new_command(
    layout: &RootLayout,
    name: &EnvName,
    message: Option<&str>,
    renderer: TerminalRenderer,
) -> Result<()> {
    let version = ActivationEngine::new(layout).active_version()?;
    renderer.print_status(
        "step",
        &format!("creating virtual environment '{name}' using Go {version}"),
    );
    EnvironmentRegistry::new(layout).create(&version, name, message)?;
    renderer.print_status("ok", &format!("created virtual environment '{name}'"));
    renderer.print_lines(&[format!("activate it with: vg env load {name}")]);
    Ok(())
}

pub(crate) fn run_env_load_command(
    layout: &RootLayout,
    name: &EnvName,
    renderer: TerminalRenderer,
) -> Result<()> {
    let activation = ActivationEngine::new(layout).enter_environment(name)?;
    renderer.print_status(
        "ok",
        &format!(
            "loaded environment '{name}' (Go {})",
            activation.context.version()
        ),
    );
    Ok(())
}

pub(crate) fn run_env_exit_command(layout: &RootLayout, renderer: TerminalRenderer) -> Result<()> {
    let activation = ActivationEngine::new(layout).exit_to_global()?;
    let version = activation.context.version();
    if activation.transition.is_noop() {
        renderer.print_status("ok", &format!("already using global Go {version} context"));
    } else {
        renderer.print_status(
            "ok",
            &format!("exited virtual environment; now using global Go {version} context"),
        );
    }
    Ok(())
}

pub(crate) fn run_env_rm_command(
    layout: &RootLayout,
    name: &EnvName,
    renderer: TerminalRenderer,
) -> Result<()> {
    let version = ActivationEngine::new(layout).active_version()?;
    EnvironmentRegistry::new(layout).remove(&version, name)?;
    renderer.print_status(
        "ok",
        &format!("removed environment '{name}' (Go {version})"),
    );
    Ok(())
}

pub(crate) fn format_env_list_lines(layout: &RootLayout) -> Result<Vec<String>> {
    let version = ActivationEngine::new(layout).active_version()?;
    let registry = EnvironmentRegistry::new(layout);
    let entries = registry.list(&version)?.collect::<Vec<_>>();

    let mut lines = vec![format!("Virtual environments for Go {version}:"), String::new()];
    if entries.is_empty() {
        lines.push("  (none)".to_string());
        return Ok(lines);
    }

    let width = entries
        .iter()
        .map(|entry| entry.name.as_str().len() + 2)
        .max()
        .unwrap_or(0)
        .max("NAME".len() + 2);
    lines.push(format!("  {:<width$}{}", "NAME", "REMARK").trim_end().to_string());
    for entry in entries {
        let marker = if registry.is_active(&version, &entry.name) {
            "*"
        } else {
            " "
        };
        lines.push(
            format!("{marker} {:<width$}{}", entry.name.as_str(), entry.remark)
                .trim_end()
                .to_string(),
        );
    }
    Ok(lines)
}

