//! Space configuration for CLI commands.
//!
//! A TOML file (`--config`, or `GYROGRAPH_CONFIG`) provides the base
//! [`SpaceConfig`]; `--curvature`, `--dimension` and `--backend` override
//! individual fields. Missing fields keep their defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use gyrograph_core::{GyrovectorSpace, NumericBackend, SpaceConfig};
use tracing::{debug, info};

/// Arguments shared by every command that computes.
#[derive(Args, Debug, Default, Clone)]
pub struct SpaceArgs {
    /// TOML file with a space configuration
    #[arg(long, global = true, env = "GYROGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Curvature κ < 0 (overrides the config file)
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub curvature: Option<f64>,

    /// Dimension of the ball (overrides the config file)
    #[arg(long, global = true)]
    pub dimension: Option<usize>,

    /// Numeric backend: fast_float, multi_precision or exact_symbolic
    #[arg(long, global = true)]
    pub backend: Option<NumericBackend>,
}

impl SpaceArgs {
    /// Resolved configuration: file, then flag overrides.
    ///
    /// # Errors
    /// Unreadable or malformed config file.
    pub fn resolve(&self) -> anyhow::Result<SpaceConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SpaceConfig::default(),
        };

        if let Some(curvature) = self.curvature {
            config.curvature = curvature;
        }
        if let Some(dimension) = self.dimension {
            config.dimension = dimension;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        Ok(config)
    }

    /// Validated space for the resolved configuration.
    ///
    /// # Errors
    /// Unreadable config file or invalid parameters.
    pub fn space(&self) -> anyhow::Result<GyrovectorSpace> {
        let config = self.resolve()?;
        let space = GyrovectorSpace::new(config)?;
        info!(
            curvature = space.curvature(),
            dimension = space.dimension(),
            backend = space.backend().name(),
            "Space configured"
        );
        Ok(space)
    }
}

/// Read a [`SpaceConfig`] from a TOML file.
///
/// # Errors
/// I/O or TOML parse failure, with the path as context.
pub fn load_config(path: &Path) -> anyhow::Result<SpaceConfig> {
    debug!(path = ?path, "Loading space config");
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: SpaceConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    Ok(config)
}
