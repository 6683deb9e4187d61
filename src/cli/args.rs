//! CLI argument parsing
//!
//! Uses clap for argument parsing with derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Read-only inspection of datacube snapshots
#[derive(Parser, Debug)]
#[command(name = "datacube")]
#[command(about = "Inspect and query datacube snapshot files")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the tree outline and its depths
    Inspect {
        /// Snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,
    },

    /// List column names down to a level
    Names {
        #[arg(long)]
        snapshot: PathBuf,

        /// Per level, only the names every node of that level has
        #[arg(long)]
        common: bool,

        /// Deepest level to include; negative counts back from the common depth
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        level: isize,
    },

    /// Find committed rows of the root node by column values
    Search {
        #[arg(long)]
        snapshot: PathBuf,

        /// Criterion as `column=value`, repeatable
        #[arg(long = "where", value_name = "COLUMN=VALUE")]
        criteria: Vec<String>,

        /// Absolute tolerance; the configured default when omitted
        #[arg(long)]
        tolerance: Option<f64>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_with_repeated_criteria() {
        let cli = Cli::try_parse_from([
            "datacube",
            "search",
            "--snapshot",
            "cube.json",
            "--where",
            "a=1",
            "--where",
            "b=2.5",
            "--config",
            "cfg.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        match cli.command {
            Command::Search {
                criteria,
                tolerance,
                ..
            } => {
                assert_eq!(criteria, vec!["a=1", "b=2.5"]);
                assert_eq!(tolerance, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_names_accepts_negative_level() {
        let cli =
            Cli::try_parse_from(["datacube", "names", "--snapshot", "c.json", "--level", "-2"])
                .unwrap();
        match cli.command {
            Command::Names { level, common, .. } => {
                assert_eq!(level, -2);
                assert!(!common);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_is_required() {
        assert!(Cli::try_parse_from(["datacube", "inspect"]).is_err());
    }
}
