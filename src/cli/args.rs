//! CLI argument definitions using clap
//!
//! Commands:
//! - oem-minimize minimize --protocol <name> [--config <path>]
//! - oem-minimize maximize --protocol <name> [--config <path>]
//! - oem-minimize describe --protocol <name> [--config <path>]
//! - oem-minimize protocols [--config <path>]
//! - oem-minimize check --previous <path> --next <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// oem-minimize - schema-driven compaction of metadata records
#[derive(Parser, Debug)]
#[command(name = "oem-minimize")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a structured record from stdin and write its compact container
    Minimize {
        /// Registered protocol name
        #[arg(long)]
        protocol: String,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Read a compact container from stdin and write the structured record
    Maximize {
        /// Registered protocol name
        #[arg(long)]
        protocol: String,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the scopes, key codes and mounts of a protocol
    Describe {
        /// Registered protocol name
        #[arg(long)]
        protocol: String,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List registered protocols
    Protocols {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check that one protocol declaration is a valid evolution of another
    Check {
        /// Declaration currently deployed
        #[arg(long)]
        previous: PathBuf,

        /// Declaration about to replace it
        #[arg(long)]
        next: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimize() {
        let cli = Cli::try_parse_from(["oem-minimize", "minimize", "--protocol", "show"]).unwrap();
        match cli.command {
            Command::Minimize { protocol, config } => {
                assert_eq!(protocol, "show");
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "oem-minimize",
            "check",
            "--previous",
            "v1.json",
            "--next",
            "v2.json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Check { .. }));
    }

    #[test]
    fn test_protocol_is_required() {
        assert!(Cli::try_parse_from(["oem-minimize", "maximize"]).is_err());
    }
}
