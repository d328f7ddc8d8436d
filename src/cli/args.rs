//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// jdkmatrix - build a project corpus across JDK versions
///
/// Runs every project's own build script once per JDK version inside
/// throwaway containers, records the exit codes, and classifies the
/// failures from the captured logs.
#[derive(Parser, Debug)]
#[command(name = "jdkmatrix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "JDKMATRIX_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build every pending project with every JDK version
    Run(RunArgs),

    /// Classify the failed builds of a results directory
    Classify(ClassifyArgs),

    /// Merge results directories of a split dataset
    Join(JoinArgs),

    /// Sample failure logs of one error type
    Inspect(InspectArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Directory with one subdirectory per project, named owner_name
    pub dataset_dir: PathBuf,

    /// Directory receiving the ledger and the build logs
    pub results_dir: PathBuf,
}

/// Arguments for the classify command
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Results directory written by `run`
    pub results_dir: PathBuf,

    /// Directory with the project log directories [default: RESULTS_DIR]
    #[arg(long)]
    pub logs: Option<PathBuf>,

    /// Error type to category table [default: RESULTS_DIR/categories.csv]
    #[arg(long)]
    pub categories: Option<PathBuf>,

    /// Directory for the report files [default: RESULTS_DIR]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How to print the breakdown
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the join command
#[derive(Parser, Debug)]
pub struct JoinArgs {
    /// Source directories followed by the target directory
    #[arg(required = true, num_args = 2.., value_name = "DIR")]
    pub dirs: Vec<PathBuf>,
}

impl JoinArgs {
    /// Split into (sources, target)
    pub fn split(&self) -> Option<(&[PathBuf], &PathBuf)> {
        let (target, sources) = self.dirs.split_last()?;
        Some((sources, target))
    }
}

/// Arguments for the inspect command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Error type report written by `classify`
    pub error_types: PathBuf,

    /// Directory with the project log directories
    pub logs: PathBuf,

    /// Error type to sample, as spelled in the report
    pub error_type: String,

    /// Number of logs to sample
    #[arg(short = 'n', long, default_value_t = crate::classify::inspect::SAMPLE_SIZE)]
    pub count: usize,

    /// Seed for a repeatable sample
    #[arg(long)]
    pub seed: Option<u64>,

    /// Open each sampled log with this program (e.g. xdg-open)
    #[arg(long, value_name = "PROGRAM")]
    pub open: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show the configuration file path
    Path,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run() {
        let cli = Cli::try_parse_from(["jdkmatrix", "-v", "run", "data", "results"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.dataset_dir, PathBuf::from("data"));
                assert_eq!(args.results_dir, PathBuf::from("results"));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn run_needs_both_directories() {
        assert!(Cli::try_parse_from(["jdkmatrix", "run", "data"]).is_err());
    }

    #[test]
    fn parse_classify_defaults() {
        let cli = Cli::try_parse_from(["jdkmatrix", "classify", "results"]).unwrap();
        match cli.command {
            Commands::Classify(args) => {
                assert_eq!(args.format, OutputFormat::Table);
                assert!(args.logs.is_none());
                assert!(args.categories.is_none());
            }
            _ => panic!("expected classify"),
        }
    }

    #[test]
    fn parse_join() {
        let cli = Cli::try_parse_from(["jdkmatrix", "join", "a", "b", "all"]).unwrap();
        match cli.command {
            Commands::Join(args) => {
                let (sources, target) = args.split().unwrap();
                assert_eq!(sources, [PathBuf::from("a"), PathBuf::from("b")]);
                assert_eq!(target, &PathBuf::from("all"));
            }
            _ => panic!("expected join"),
        }
    }

    #[test]
    fn parse_inspect() {
        let cli = Cli::try_parse_from([
            "jdkmatrix",
            "inspect",
            "error-types.csv",
            "logs",
            "maven-compiler-plugin",
            "--open",
            "xdg-open",
        ])
        .unwrap();
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.error_type, "maven-compiler-plugin");
                assert_eq!(args.count, 3);
                assert_eq!(args.open.as_deref(), Some("xdg-open"));
                assert!(args.seed.is_none());
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn join_needs_source_and_target() {
        assert!(Cli::try_parse_from(["jdkmatrix", "join", "only"]).is_err());
    }
}
