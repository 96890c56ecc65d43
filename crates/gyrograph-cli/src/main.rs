//! gyrograph CLI
//!
//! Command-line front end of the gyrovector engine.
//!
//! # Commands
//!
//! - `compute <op> [args]`: run one operation, optionally cross-checked
//! - `verify <op> [args]`: run one operation and require an oracle answer
//! - `batch --input <file>`: run a JSON array of requests in parallel
//! - `operations`: list operations and their signatures
//!
//! Results are JSON on stdout; logs go to stderr.
//!
//! # Example
//!
//! ```text
//! gyrograph --curvature -2 compute distance p:0,0,0 p:0.5,0,0 --validate reference
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;
mod error;

/// gyrograph - hyperbolic gyrovector computations
#[derive(Parser)]
#[command(name = "gyrograph")]
#[command(version)]
#[command(about = "Gyrovector computations in the Poincare, Klein and hyperboloid models")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    space: config::SpaceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one operation
    Compute(commands::compute::ComputeArgs),
    /// Run one operation and cross-check it against an oracle
    Verify(commands::compute::VerifyArgs),
    /// Run a JSON array of requests
    Batch(commands::batch::BatchArgs),
    /// List operations and their signatures
    Operations(commands::operations::OperationsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch to command handlers
    let exit_code = match cli.command {
        Commands::Compute(args) => commands::compute::compute_command(&cli.space, args).await,
        Commands::Verify(args) => commands::compute::verify_command(&cli.space, args).await,
        Commands::Batch(args) => commands::batch::batch_command(&cli.space, args).await,
        Commands::Operations(args) => commands::operations::operations_command(args),
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_space_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gyrograph",
            "compute",
            "distance",
            "p:0,0",
            "p:-0.5,0",
            "--curvature",
            "-2",
            "--dimension",
            "2",
            "--backend",
            "multi_precision",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.space.curvature, Some(-2.0));
        assert_eq!(cli.space.dimension, Some(2));
        assert_eq!(
            cli.space.backend,
            Some(gyrograph_core::NumericBackend::MultiPrecision)
        );
        match cli.command {
            Commands::Compute(args) => {
                assert_eq!(args.operation, "distance");
                assert_eq!(args.args, vec!["p:0,0", "p:-0.5,0"]);
                assert_eq!(args.model, gyrograph_core::Model::Poincare);
                assert!(args.validate.is_none());
            }
            _ => panic!("expected compute"),
        }
    }

    #[test]
    fn test_require_validation_needs_validate() {
        let result = Cli::try_parse_from([
            "gyrograph",
            "compute",
            "add",
            "p:0,0",
            "p:0,0",
            "--require-validation",
        ]);
        assert!(result.is_err());
    }
}
