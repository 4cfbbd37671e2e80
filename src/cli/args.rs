use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stepwise")]
#[command(version, about = "Run and debug teaching-language programs line by line", long_about = None)]
pub struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to config file (overrides STEPWISE_CONFIG and the per-user file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a bundled demo program
    Run(RunArgs),

    /// List the bundled demo programs
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Demo to run (see `stepwise list`)
    pub demo: String,

    /// Comma-separated breakpoint lines, e.g. `3,7`
    #[arg(short, long)]
    pub breakpoints: Option<String>,

    /// Pause before every line
    #[arg(long)]
    pub step: bool,

    /// Output format for the run result
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Directory relative paths are resolved against
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Arguments passed to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    /// Filter directive for this verbosity; `configured` applies at
    /// [`Verbosity::Normal`].
    pub fn to_log_level(self, configured: &str) -> String {
        match self {
            Verbosity::Quiet => "error".to_string(),
            Verbosity::Normal => configured.to_string(),
            Verbosity::Verbose => "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_parse() {
        let cli = Cli::parse_from([
            "stepwise", "-q", "run", "sum", "--breakpoints", "3,7", "--output", "json", "2", "-5",
        ]);
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.demo, "sum");
                assert_eq!(args.breakpoints.as_deref(), Some("3,7"));
                assert_eq!(args.output, OutputFormat::Json);
                assert_eq!(args.args, vec!["2", "-5"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Verbosity::Quiet.to_log_level("info"), "error");
        assert_eq!(Verbosity::Normal.to_log_level("info"), "info");
        assert_eq!(Verbosity::Verbose.to_log_level("info"), "debug");
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["stepwise", "-v", "-q", "list"]).is_err());
    }
}
