use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;
use vg_core::{EnvName, VersionId, VgConfig};
use vg_installer::{default_root, RootLayout};

use crate::command_flows::{
    format_env_list_lines, format_list_lines, format_status_lines, prompt_install,
    run_env_exit_command, run_env_load_command, run_env_new_command, run_env_rm_command,
    run_install_command, run_remove_command, run_use_command,
};
use crate::completion::{format_init_snippet, resolve_init_shell, write_completions_script};
use crate::render::TerminalRenderer;
use crate::{Cli, Commands, EnvCommands};

pub(crate) fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(root) => Ok(root),
        None => default_root(),
    }
}

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let layout = RootLayout::new(resolve_root(cli.root)?);
    debug!(root = %layout.root().display(), "resolved vg root");
    let renderer = TerminalRenderer::current();

    match cli.command {
        Commands::Install { version } => {
            let version = VersionId::parse(&version)?;
            let config = VgConfig::load(&layout.config_path())?;
            run_install_command(&layout, &config, &version, renderer)?;
        }
        Commands::Use { version } => {
            let version = VersionId::parse(&version)?;
            let config = VgConfig::load(&layout.config_path())?;
            run_use_command(&layout, &config, &version, renderer, &mut prompt_install)?;
        }
        Commands::Rm { version } => {
            let version = VersionId::parse(&version)?;
            run_remove_command(&layout, &version, renderer)?;
        }
        Commands::List => {
            renderer.print_lines(&format_list_lines(&layout)?);
        }
        Commands::Status => {
            renderer.print_lines(&format_status_lines(&layout)?);
        }
        Commands::Init { shell } => {
            let shell_env = std::env::var("SHELL").ok();
            let shell = resolve_init_shell(shell, shell_env.as_deref(), cfg!(windows));
            for line in format_init_snippet(&layout, shell)? {
                println!("{line}");
            }
        }
        Commands::Env(command) => run_env_command(&layout, command, renderer)?,
        Commands::Completions { shell } => {
            let mut stdout = std::io::stdout();
            write_completions_script(shell, &mut stdout)?;
        }
        Commands::Version => {
            println!("vg {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn run_env_command(
    layout: &RootLayout,
    command: EnvCommands,
    renderer: TerminalRenderer,
) -> Result<()> {
    match command {
        EnvCommands::New { name, message } => {
            let name = EnvName::parse(&name)?;
            run_env_new_command(layout, &name, message.as_deref(), renderer)
        }
        EnvCommands::Load { name } => {
            let name = EnvName::parse(&name)?;
            run_env_load_command(layout, &name, renderer)
        }
        EnvCommands::Exit => run_env_exit_command(layout, renderer),
        EnvCommands::Rm { name } => {
            let name = EnvName::parse(&name)?;
            run_env_rm_command(layout, &name, renderer)
        }
        EnvCommands::List => {
            renderer.print_lines(&format_env_list_lines(layout)?);
            Ok(())
        }
    }
}
