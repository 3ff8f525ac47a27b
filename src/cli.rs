use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "langup",
    about = "Upgrade perl, ruby and python runtimes through their version managers",
    version
)]
pub struct Cli {
    /// Echo every external command and its output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file (defaults to $LANGUP_CONFIG when set)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upgrade perl through perlbrew
    Perl(UpgradeArgs),

    /// Upgrade ruby through rbenv
    Ruby(UpgradeArgs),

    /// Upgrade python through Homebrew and pip
    Python(UpgradeArgs),
}

#[derive(Args, Debug, Clone, Copy)]
pub struct UpgradeArgs {
    /// Remove superseded versions once the newest one is active
    #[arg(short, long)]
    pub cleanup: bool,

    /// Show what would happen without installing, switching or removing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Runtime family handled by one subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manager {
    Perl,
    Ruby,
    Python,
}

impl Manager {
    /// Stable identifier used for lock file names
    pub fn key(self) -> &'static str {
        match self {
            Manager::Perl => "perl",
            Manager::Ruby => "ruby",
            Manager::Python => "python",
        }
    }
}

impl Commands {
    pub fn split(self) -> (Manager, UpgradeArgs) {
        match self {
            Commands::Perl(args) => (Manager::Perl, args),
            Commands::Ruby(args) => (Manager::Ruby, args),
            Commands::Python(args) => (Manager::Python, args),
        }
    }
}
