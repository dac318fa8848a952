//! # nxdc CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nxdc_cli::config::CliConfig;
use nxdc_cli::resolve_definitions_root;
use nxdc_cli::template::{run_template, TemplateArgs};
use nxdc_cli::validate::{run_validate, ValidateArgs};

/// Exit code for operational failures.
const EXIT_OPERATIONAL_ERROR: u8 = 2;

/// NeXus data converter CLI.
///
/// Validates data dictionaries against NXDL application definitions and
/// prints the templates those definitions declare.
#[derive(Parser, Debug)]
#[command(name = "nxdc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root of a NeXus definitions checkout.
    #[arg(long, global = true, env = "NEXUS_DEF_PATH")]
    definitions: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a data dictionary against an application definition.
    Validate(ValidateArgs),

    /// Print the paths an application definition declares.
    Template(TemplateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG, when set, overrides the verbosity flag.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("nxdc CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_OPERATIONAL_ERROR);
        }
    };
    let definitions = resolve_definitions_root(cli.definitions.as_deref(), &config);
    tracing::debug!(definitions = %definitions.display(), "resolved definitions root");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &definitions, &config),
        Commands::Template(args) => run_template(&args, &definitions, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_OPERATIONAL_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_validate() {
        let cli = Cli::try_parse_from(["nxdc", "validate", "--nxdl", "NXmpes", "data.json"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.nxdl.as_deref(), Some("NXmpes"));
            assert_eq!(args.data, PathBuf::from("data.json"));
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_requires_data() {
        assert!(Cli::try_parse_from(["nxdc", "validate", "--nxdl", "NXmpes"]).is_err());
    }

    #[test]
    fn cli_parse_validate_nxdl_optional() {
        let cli = Cli::try_parse_from(["nxdc", "validate", "data.yaml"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert!(args.nxdl.is_none());
        }
    }

    #[test]
    fn cli_parse_template() {
        let cli = Cli::try_parse_from(["nxdc", "template", "--nxdl", "NXmpes"]).unwrap();
        if let Commands::Template(args) = cli.command {
            assert_eq!(args.nxdl.as_deref(), Some("NXmpes"));
            assert!(!args.required_only);
        } else {
            panic!("expected template");
        }
    }

    #[test]
    fn cli_parse_template_required_only() {
        let cli = Cli::try_parse_from(["nxdc", "template", "--nxdl", "NXmpes", "--required-only"]).unwrap();
        if let Commands::Template(args) = cli.command {
            assert!(args.required_only);
        }
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nxdc",
            "validate",
            "data.json",
            "-vv",
            "--config",
            "nxdc.yaml",
            "--definitions",
            "/opt/nexus_definitions",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("nxdc.yaml")));
        assert_eq!(cli.definitions, Some(PathBuf::from("/opt/nexus_definitions")));
    }

    #[test]
    fn cli_parse_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["nxdc", "lock"]).is_err());
    }

    #[test]
    fn cli_verify_command() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
