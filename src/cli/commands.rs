//! CLI flag definitions.
//!
//! The tool takes no positional arguments. Configuration comes from
//! `DINO_ENVIRONMENT` and `DINO_HOME`; flags only change how a run is
//! reported.

use clap::Parser;

/// Rolling deployment of the dino web, rest and app services.
#[derive(Parser, Debug)]
#[command(name = "dino-deploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Log line format (text, json).
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Final report format (text, json).
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,

    /// Evaluate every step and log its command without running it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// Log format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable log lines.
    #[default]
    Text,
    /// One JSON object per log line.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_uses_defaults() {
        let cli = Cli::try_parse_from(["dino-deploy"]).unwrap();
        assert!(!cli.verbose);
        assert!(!cli.dry_run);
        assert_eq!(cli.output, OutputFormat::Text);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "dino-deploy",
            "-v",
            "--dry-run",
            "--output",
            "json",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(cli.dry_run);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_positional_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["dino-deploy", "prod"]).is_err());
    }
}
