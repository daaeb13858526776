use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

mod command_flows;
mod completion;
mod dispatch;
mod logging;
mod render;

#[derive(Parser, Debug)]
#[command(name = "vg")]
#[command(about = "Go version and virtual environment manager", long_about = None)]
struct Cli {
    /// Root directory for SDKs, environments and links (defaults to VG_HOME or ~/.vg).
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download and install a Go version.
    Install { version: String },
    /// Switch the active Go version.
    Use { version: String },
    /// Remove an installed Go version.
    Rm { version: String },
    /// List installed versions and their environments.
    List,
    /// Show the active version, environment and link targets.
    Status,
    /// Print shell configuration; add `eval "$(vg init)"` to your profile.
    Init {
        #[arg(long, value_enum)]
        shell: Option<CliShell>,
    },
    /// Manage virtual environments of the active version.
    #[command(subcommand)]
    Env(EnvCommands),
    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: CliShell,
    },
    /// Print the vg version.
    Version,
}

#[derive(Subcommand, Debug)]
enum EnvCommands {
    /// Create a virtual environment.
    New {
        name: String,
        #[arg(short = 'm', long)]
        message: Option<String>,
    },
    /// Load a virtual environment.
    Load { name: String },
    /// Return to the global context of the active version.
    Exit,
    /// Remove a virtual environment.
    Rm { name: String },
    /// List virtual environments.
    List,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CliShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl From<CliShell> for Shell {
    fn from(value: CliShell) -> Self {
        match value {
            CliShell::Bash => Shell::Bash,
            CliShell::Zsh => Shell::Zsh,
            CliShell::Fish => Shell::Fish,
            CliShell::Powershell => Shell::PowerShell,
        }
    }
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    if let Err(err) = dispatch::run_cli(cli) {
        let style = render::current_output_style();
        eprintln!("{}", render::render_status_line(style, "err", &format!("{err:#}")));
        std::process::exit(1);
    }
}
