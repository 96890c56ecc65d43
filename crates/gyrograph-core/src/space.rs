//! The gyrovector space: validated, immutable configuration shared by every
//! operation.
//!
//! A [`GyrovectorSpace`] owns no points. It hands out lightweight component
//! views borrowing it:
//!
//! ```
//! use gyrograph_core::{GyrovectorSpace, Point};
//!
//! let space = GyrovectorSpace::default();
//! let a = Point::poincare(vec![0.3, 0.4, 0.0]);
//! let b = Point::poincare(vec![0.1, 0.2, 0.5]);
//!
//! let sum = space.algebra().add(&a, &b).unwrap();
//! let d = space.solver().distance(&a, &b).unwrap();
//! assert!(sum.euclidean_norm() < 1.0);
//! assert!(d > 0.0);
//! ```

use crate::algebra::GyrovectorAlgebra;
use crate::backend::Kernel;
use crate::config::{NumericBackend, OracleSettings, SpaceConfig};
use crate::convert::ModelConverter;
use crate::error::{Diagnostics, GyroResult};
use crate::geodesic::GeodesicSolver;
use crate::guard::StabilityGuard;
use crate::point::{Model, Point};

/// Immutable gyrovector space of curvature κ < 0 and dimension n.
#[derive(Debug, Clone, PartialEq)]
pub struct GyrovectorSpace {
    config: SpaceConfig,
    /// c = -κ
    c: f64,
    sqrt_c: f64,
}

impl Default for GyrovectorSpace {
    fn default() -> Self {
        let config = SpaceConfig::default();
        Self {
            config,
            c: 1.0,
            sqrt_c: 1.0,
        }
    }
}

impl GyrovectorSpace {
    /// Create a space from a full configuration.
    ///
    /// # Errors
    /// Any validation failure of [`SpaceConfig::validate`].
    pub fn new(config: SpaceConfig) -> GyroResult<Self> {
        config.validate()?;
        let c = -config.curvature;
        Ok(Self {
            config,
            c,
            sqrt_c: c.sqrt(),
        })
    }

    /// Create a space from curvature and dimension, defaults elsewhere.
    pub fn with_curvature(curvature: f64, dimension: usize) -> GyroResult<Self> {
        Self::new(SpaceConfig {
            curvature,
            dimension,
            ..SpaceConfig::default()
        })
    }

    pub fn config(&self) -> &SpaceConfig {
        &self.config
    }

    /// Curvature κ.
    #[inline]
    pub fn curvature(&self) -> f64 {
        self.config.curvature
    }

    /// c = -κ > 0.
    #[inline]
    pub fn c(&self) -> f64 {
        self.c
    }

    #[inline]
    pub fn sqrt_c(&self) -> f64 {
        self.sqrt_c
    }

    /// Ball radius 1/sqrt(c).
    #[inline]
    pub fn radius(&self) -> f64 {
        1.0 / self.sqrt_c
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.config.epsilon
    }

    #[inline]
    pub fn backend(&self) -> NumericBackend {
        self.config.backend
    }

    pub fn oracle_settings(&self) -> &OracleSettings {
        &self.config.oracle
    }

    /// Kernel of the configured backend.
    pub fn kernel(&self) -> &'static dyn Kernel {
        self.config.backend.kernel()
    }

    /// Kernel used when inputs are near the boundary.
    pub fn extended_kernel(&self) -> &'static dyn Kernel {
        self.config.backend.extended().kernel()
    }

    /// Origin of the given model.
    pub fn origin(&self, model: Model) -> Point {
        match model {
            Model::Hyperboloid => {
                let mut coords = vec![0.0; self.dimension() + 1];
                coords[0] = 1.0 / self.sqrt_c;
                Point::hyperboloid(coords)
            }
            ball => Point::ball_origin(ball, self.dimension()),
        }
    }

    pub fn guard(&self) -> StabilityGuard<'_> {
        StabilityGuard::new(self)
    }

    pub fn algebra(&self) -> GyrovectorAlgebra<'_> {
        GyrovectorAlgebra::new(self, None)
    }

    pub fn converter(&self) -> ModelConverter<'_> {
        ModelConverter::new(self, None)
    }

    pub fn solver(&self) -> GeodesicSolver<'_> {
        GeodesicSolver::new(self, None)
    }

    /// Algebra view recording instability warnings into `diagnostics`.
    pub fn algebra_with<'a>(&'a self, diagnostics: &'a Diagnostics) -> GyrovectorAlgebra<'a> {
        GyrovectorAlgebra::new(self, Some(diagnostics))
    }

    pub fn converter_with<'a>(&'a self, diagnostics: &'a Diagnostics) -> ModelConverter<'a> {
        ModelConverter::new(self, Some(diagnostics))
    }

    pub fn solver_with<'a>(&'a self, diagnostics: &'a Diagnostics) -> GeodesicSolver<'a> {
        GeodesicSolver::new(self, Some(diagnostics))
    }
}
