//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// packtag asset bundler CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: packtag.toml)
    #[arg(short = 'C', long, global = true, default_value = "packtag.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render every configured bundle and print its tag
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Render, then re-render bundles whenever a dependent file changes
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Delete rendered bundle files
    #[command(visible_alias = "c")]
    Clean {
        /// Only list the files that would be deleted
        #[arg(short, long)]
        dry: bool,
    },
}

/// Shared arguments for Build and Watch commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Render one tag per source file, regardless of `engine.debug`
    #[arg(short, long, conflicts_with = "release")]
    pub debug: bool,

    /// Render minified, hashed bundles, regardless of `engine.debug`
    #[arg(short, long)]
    pub release: bool,

    /// Print the rendered bundles as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl BuildArgs {
    /// Debug override from the command line, if any.
    pub const fn debug_override(&self) -> Option<bool> {
        if self.debug {
            Some(true)
        } else if self.release {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_mode_override() {
        let cli = Cli::try_parse_from(["packtag", "build", "--release"]).unwrap();
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(build_args.debug_override(), Some(false));
        assert_eq!(BuildArgs::default().debug_override(), None);
    }

    #[test]
    fn test_debug_conflicts_with_release() {
        assert!(Cli::try_parse_from(["packtag", "build", "--debug", "--release"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["packtag", "clean", "--dry", "-C", "site/packtag.toml", "-V"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("site/packtag.toml"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Clean { dry: true }));
    }
}
