//! `compute` and `verify` commands.
//!
//! Arguments are typed by prefix:
//!
//! | prefix | argument | example |
//! |--------|----------|---------|
//! | `p:` | point in `--model` coordinates | `p:0.3,0.4,0` |
//! | `v:` | tangent vector | `v:1,0,0` |
//! | `s:` | scalar | `s:2.5` |
//! | `t:` | transformation `a,b,c,d` as re/im pairs | `t:1,0,0,0,0,0,1,0` |
//!
//! # Exit Codes
//! - 0: Computed (and confirmed, when validated)
//! - 1: Invalid input, domain error, or oracle unavailable when required
//! - 2: Oracle discrepancy

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::Args;
use gyrograph_core::{Argument, Computation, Engine, Model, Transformation};
use gyrograph_oracle::{ComputationalOracle, ReferenceOracle, ValidatedEngine, WolframAlphaOracle};
use tracing::{debug, info, warn};

use super::output::{render_computation, OutputFormat};
use super::{fail, log_warnings};
use crate::config::SpaceArgs;
use crate::error::CliExitCode;

/// Oracle backing a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OracleKind {
    /// In-process evaluation of the textbook formulas.
    Reference,
    /// Wolfram|Alpha v2 query API (needs an app id).
    Wolfram,
}

/// Wolfram|Alpha connection settings.
#[derive(Args, Debug, Default, Clone)]
pub struct WolframArgs {
    /// Wolfram|Alpha app id
    #[arg(long, env = "WOLFRAM_APP_ID", hide_env_values = true)]
    pub wolfram_app_id: Option<String>,

    /// Override the Wolfram|Alpha query endpoint
    #[arg(long, env = "WOLFRAM_ENDPOINT")]
    pub wolfram_endpoint: Option<String>,
}

/// Arguments for `compute`.
#[derive(Args, Debug)]
pub struct ComputeArgs {
    /// Operation name (see `gyrograph operations`)
    pub operation: String,

    /// Typed arguments: p:<coords>, v:<coords>, s:<scalar>, t:<8 numbers>
    pub args: Vec<String>,

    /// Model the point arguments and result are expressed in
    #[arg(short, long, default_value = "poincare")]
    pub model: Model,

    /// Cross-check the result against an oracle
    #[arg(long, value_enum)]
    pub validate: Option<OracleKind>,

    /// Exit 1 when the oracle cannot give an answer
    #[arg(long, requires = "validate")]
    pub require_validation: bool,

    #[command(flatten)]
    pub wolfram: WolframArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

/// Arguments for `verify`: compute, then always consult the oracle.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Operation name (see `gyrograph operations`)
    pub operation: String,

    /// Typed arguments: p:<coords>, v:<coords>, s:<scalar>, t:<8 numbers>
    pub args: Vec<String>,

    /// Model the point arguments and result are expressed in
    #[arg(short, long, default_value = "poincare")]
    pub model: Model,

    /// Oracle to consult
    #[arg(long = "oracle", value_enum, default_value = "reference")]
    pub oracle: OracleKind,

    #[command(flatten)]
    pub wolfram: WolframArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

/// Execute the compute command.
pub async fn compute_command(space_args: &SpaceArgs, args: ComputeArgs) -> i32 {
    debug!("compute_command: args={:?}", args);
    let result = run(
        space_args,
        &args.operation,
        args.model,
        &args.args,
        args.validate.map(|kind| (kind, &args.wolfram)),
    )
    .await;

    match result {
        Ok(computation) => emit(&computation, args.format, args.require_validation),
        Err(e) => fail(&e),
    }
}

/// Execute the verify command. An unavailable oracle is an error here.
pub async fn verify_command(space_args: &SpaceArgs, args: VerifyArgs) -> i32 {
    debug!("verify_command: args={:?}", args);
    let result = run(
        space_args,
        &args.operation,
        args.model,
        &args.args,
        Some((args.oracle, &args.wolfram)),
    )
    .await;

    match result {
        Ok(computation) => emit(&computation, args.format, true),
        Err(e) => fail(&e),
    }
}

async fn run(
    space_args: &SpaceArgs,
    operation: &str,
    model: Model,
    raw_args: &[String],
    validation: Option<(OracleKind, &WolframArgs)>,
) -> anyhow::Result<Computation> {
    let space = space_args.space()?;
    let arguments = parse_arguments(raw_args)?;
    let engine = Engine::new(space);

    let computation = match validation {
        None => engine.compute(operation, model, &arguments)?,
        Some((kind, wolfram)) => {
            let oracle = build_oracle(kind, wolfram)?;
            info!(oracle = oracle.name(), operation, "Validating computation");
            ValidatedEngine::new(engine, oracle)
                .compute_validated(operation, model, &arguments)
                .await?
        }
    };
    log_warnings(&computation);
    Ok(computation)
}

fn emit(computation: &Computation, format: OutputFormat, require_validation: bool) -> i32 {
    let rendered = match render_computation(computation, format) {
        Ok(text) => text,
        Err(e) => return fail(&anyhow::Error::new(e).context("Failed to render result")),
    };
    println!("{rendered}");

    let code = CliExitCode::for_validation(computation.validation.as_ref(), require_validation);
    if let Some(record) = &computation.validation {
        match code {
            CliExitCode::Blocking => eprintln!("Error: oracle discrepancy for {}", record.descriptor),
            CliExitCode::Warning => eprintln!(
                "Error: validation unavailable: {}",
                record.reason.as_deref().unwrap_or("unknown reason")
            ),
            CliExitCode::Success => {}
        }
    }
    code.into()
}

/// Oracle for `kind`.
///
/// # Errors
/// `wolfram` without an app id.
pub fn build_oracle(
    kind: OracleKind,
    wolfram: &WolframArgs,
) -> anyhow::Result<Arc<dyn ComputationalOracle>> {
    match kind {
        OracleKind::Reference => Ok(Arc::new(ReferenceOracle::new())),
        OracleKind::Wolfram => {
            let app_id = wolfram.wolfram_app_id.clone().ok_or_else(|| {
                anyhow!("Wolfram|Alpha validation needs --wolfram-app-id or WOLFRAM_APP_ID")
            })?;
            let mut oracle = WolframAlphaOracle::new(app_id)?;
            if let Some(endpoint) = &wolfram.wolfram_endpoint {
                oracle = oracle.with_endpoint(endpoint.clone());
            }
            Ok(Arc::new(oracle))
        }
    }
}

/// Parse prefixed command-line arguments.
///
/// # Errors
/// Unknown prefix, unparsable number, or a malformed transformation.
pub fn parse_arguments(raw: &[String]) -> anyhow::Result<Vec<Argument>> {
    raw.iter()
        .enumerate()
        .map(|(index, text)| {
            parse_argument(text).with_context(|| format!("Invalid argument {} '{}'", index + 1, text))
        })
        .collect()
}

fn parse_argument(text: &str) -> anyhow::Result<Argument> {
    let Some((prefix, body)) = text.split_once(':') else {
        bail!("expected a p:, v:, s: or t: prefix");
    };
    match prefix.trim() {
        "p" | "point" => Ok(Argument::Point(parse_numbers(body)?)),
        "v" | "vector" => Ok(Argument::Vector(parse_numbers(body)?)),
        "s" | "scalar" => {
            let value: f64 = body
                .trim()
                .parse()
                .with_context(|| format!("'{}' is not a number", body.trim()))?;
            Ok(Argument::Scalar(value))
        }
        "t" | "transformation" => {
            let values = parse_numbers(body)?;
            let transformation = Transformation::from_components(&values)?;
            Ok(Argument::Transformation(transformation))
        }
        other => {
            warn!(prefix = other, "Unknown argument prefix");
            bail!("unknown prefix '{other}:'")
        }
    }
}

fn parse_numbers(body: &str) -> anyhow::Result<Vec<f64>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    body.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .with_context(|| format!("'{part}' is not a number"))
        })
        .collect()
}
