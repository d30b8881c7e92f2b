//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// comcol - container-backed community software collections.
#[derive(Debug, Parser)]
#[command(name = "comcol")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Working root holding cc.yaml and generated files (defaults to current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Settings document (overrides <root>/cc.yaml)
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve dependencies and generate modulefiles (default if no command specified)
    Refresh(RefreshArgs),

    /// Remove generated files and locally built dependencies
    Clean(CleanArgs),

    /// Write staged shell-init lines to a profile script
    Profile(ProfileArgs),

    /// Print the internal cache
    Showcache,

    /// Check that the container runtime can run unprivileged
    Capable,

    /// Fix container runtime ownership and permissions (needs root)
    Enable,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `refresh` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RefreshArgs {
    /// Resolve dependencies and versions without writing modulefiles
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `clean` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CleanArgs {
    /// Delete without asking
    #[arg(long)]
    pub sure: bool,
}

/// Arguments for the `profile` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProfileArgs {
    /// Propose the staged lines themselves for ~/.bashrc instead of a `source` line
    #[arg(long)]
    pub explicit: bool,

    /// Only write the profile script
    #[arg(long)]
    pub no_bashrc: bool,

    /// Profile script to write (defaults to <root>/profile_cc.sh)
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::parse_from(["comcol", "--root", "/tmp/cc"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/cc")));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["comcol", "refresh", "--dry-run", "--debug"]);
        assert!(cli.debug);
        match cli.command {
            Some(Commands::Refresh(args)) => assert!(args.dry_run),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn profile_flags() {
        let cli = Cli::parse_from(["comcol", "profile", "--explicit", "--profile", "p.sh"]);
        match cli.command {
            Some(Commands::Profile(args)) => {
                assert!(args.explicit);
                assert!(!args.no_bashrc);
                assert_eq!(args.profile, Some(PathBuf::from("p.sh")));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
