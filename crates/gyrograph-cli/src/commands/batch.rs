//! `batch` command: many computations from a JSON file.
//!
//! Input is a JSON array of requests:
//!
//! ```json
//! [
//!   {"operation": "add", "model": "poincare",
//!    "args": [{"type": "point", "value": [0.1, 0.2]}, {"type": "point", "value": [0.3, 0.0]}]}
//! ]
//! ```
//!
//! Requests are computed in parallel; the output array keeps input order,
//! one entry per request. A failed request does not stop the others.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use futures::future::join_all;
use gyrograph_core::{Computation, ComputeCache, ComputeRequest, Engine, GyroError, GyroResult};
use gyrograph_oracle::ValidatedEngine;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::compute::{build_oracle, OracleKind, WolframArgs};
use super::output::{render_json, OutputFormat};
use super::{fail, log_warnings};
use crate::config::SpaceArgs;
use crate::error::CliExitCode;

/// Arguments for `batch`.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON file with an array of requests ("-" reads stdin)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Memoize results in an LRU cache of this many entries
    #[arg(long)]
    pub cache: Option<usize>,

    /// Cross-check every successful result against an oracle
    #[arg(long, value_enum)]
    pub validate: Option<OracleKind>,

    /// Exit 1 when the oracle cannot answer for some result
    #[arg(long, requires = "validate")]
    pub require_validation: bool,

    #[command(flatten)]
    pub wolfram: WolframArgs,

    /// Output format (text is rendered as JSON)
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

/// One output entry.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Ok(Computation),
    Error {
        index: usize,
        operation: String,
        message: String,
    },
}

/// Execute the batch command.
///
/// # Exit Codes
/// - 0: Every request computed (and confirmed, when validated)
/// - 1: Unreadable input, or at least one request failed
/// - 2: At least one oracle discrepancy
pub async fn batch_command(space_args: &SpaceArgs, args: BatchArgs) -> i32 {
    debug!("batch_command: args={:?}", args);
    match run(space_args, &args).await {
        Ok((entries, code)) => match render_json(&entries, args.format) {
            Ok(rendered) => {
                println!("{rendered}");
                code.into()
            }
            Err(e) => fail(&anyhow::Error::new(e).context("Failed to render results")),
        },
        Err(e) => fail(&e),
    }
}

async fn run(space_args: &SpaceArgs, args: &BatchArgs) -> anyhow::Result<(Vec<BatchEntry>, CliExitCode)> {
    let space = space_args.space()?;
    let requests = read_requests(&args.input)?;
    info!(requests = requests.len(), "Running batch");

    let mut engine = Engine::new(space);
    if let Some(capacity) = args.cache {
        engine = engine.with_cache(Arc::new(ComputeCache::new(capacity)?));
    }

    let results = engine.compute_batch(&requests);
    if let Some(cache) = engine.cache() {
        let stats = cache.stats();
        info!(hits = stats.hits, misses = stats.misses, entries = stats.entries, "Batch cache");
    }

    let results = match args.validate {
        None => results,
        Some(kind) => {
            let oracle = build_oracle(kind, &args.wolfram)?;
            validate_all(ValidatedEngine::new(engine, oracle), results).await
        }
    };

    let mut code = CliExitCode::Success;
    let entries = results
        .into_iter()
        .zip(&requests)
        .enumerate()
        .map(|(index, (result, request))| match result {
            Ok(computation) => {
                log_warnings(&computation);
                code = worst(
                    code,
                    CliExitCode::for_validation(computation.validation.as_ref(), args.require_validation),
                );
                BatchEntry::Ok(computation)
            }
            Err(e) => {
                warn!(index, operation = %request.operation, error = %e, "Batch request failed");
                code = worst(code, CliExitCode::from(&e));
                BatchEntry::Error {
                    index,
                    operation: request.operation.clone(),
                    message: e.to_string(),
                }
            }
        })
        .collect();
    Ok((entries, code))
}

/// Oracle checks of every successful result, run concurrently.
async fn validate_all(
    engine: ValidatedEngine,
    results: Vec<GyroResult<Computation>>,
) -> Vec<GyroResult<Computation>> {
    let checks = results.into_iter().map(|result| {
        let engine = &engine;
        async move {
            let mut computation = result?;
            computation.validation = Some(engine.validate(&computation).await);
            Ok::<_, GyroError>(computation)
        }
    });
    join_all(checks).await
}

fn worst(a: CliExitCode, b: CliExitCode) -> CliExitCode {
    if (b as u8) > (a as u8) {
        b
    } else {
        a
    }
}

fn read_requests(input: &Path) -> anyhow::Result<Vec<ComputeRequest>> {
    let text = if input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read requests from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read requests {}", input.display()))?
    };
    serde_json::from_str(&text).context("Requests must be a JSON array of {operation, model, args}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn requests_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write requests");
        file
    }

    fn batch_args(input: PathBuf) -> BatchArgs {
        BatchArgs {
            input,
            cache: Some(16),
            validate: None,
            require_validation: false,
            wolfram: WolframArgs::default(),
            format: OutputFormat::Compact,
        }
    }

    const REQUESTS: &str = r#"[
        {"operation": "distance", "model": "poincare",
         "args": [{"type": "point", "value": [0, 0, 0]}, {"type": "point", "value": [0.5, 0, 0]}]},
        {"operation": "add", "model": "poincare",
         "args": [{"type": "point", "value": [1.5, 0, 0]}, {"type": "point", "value": [0, 0, 0]}]},
        {"operation": "identity", "model": "klein"}
    ]"#;

    #[tokio::test]
    async fn test_failures_are_reported_in_place() {
        let file = requests_file(REQUESTS);
        let (entries, code) = run(&SpaceArgs::default(), &batch_args(file.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(code, CliExitCode::Warning);
        match &entries[0] {
            BatchEntry::Ok(c) => assert!((c.result.as_scalar().unwrap() - 0.5f64.atanh()).abs() < 1e-15),
            other => panic!("expected success, got {other:?}"),
        }
        match &entries[1] {
            BatchEntry::Error { index, operation, message } => {
                assert_eq!(*index, 1);
                assert_eq!(operation, "add");
                assert!(message.contains("Domain error"), "{message}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(matches!(entries[2], BatchEntry::Ok(_)));

        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[0]["status"], "ok");
        assert_eq!(json[1]["status"], "error");
    }

    #[tokio::test]
    async fn test_validated_batch() {
        let file = requests_file(
            r#"[
            {"operation": "distance", "model": "poincare",
             "args": [{"type": "point", "value": [0.1, 0.2, 0]}, {"type": "point", "value": [-0.3, 0, 0.4]}]},
            {"operation": "midpoint", "model": "klein",
             "args": [{"type": "point", "value": [0.1, 0, 0]}, {"type": "point", "value": [0, 0.1, 0]}]}
        ]"#,
        );
        let mut args = batch_args(file.path().to_path_buf());
        args.validate = Some(OracleKind::Reference);

        let (entries, code) = run(&SpaceArgs::default(), &args).await.unwrap();
        assert_eq!(code, CliExitCode::Success);

        args.require_validation = true;
        let (_, code) = run(&SpaceArgs::default(), &args).await.unwrap();
        assert_eq!(code, CliExitCode::Warning, "Klein midpoint has no oracle description");

        match &entries[0] {
            BatchEntry::Ok(c) => assert!(c.validation.as_ref().unwrap().is_confirmed()),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejects_non_array_input() {
        let file = requests_file(r#"{"operation": "add"}"#);
        let err = run(&SpaceArgs::default(), &batch_args(file.path().to_path_buf()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }

    #[test]
    fn test_worst_exit_code() {
        assert_eq!(worst(CliExitCode::Success, CliExitCode::Warning), CliExitCode::Warning);
        assert_eq!(worst(CliExitCode::Blocking, CliExitCode::Warning), CliExitCode::Blocking);
    }
}
