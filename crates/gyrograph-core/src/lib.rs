//! Hyperbolic gyrovector computation engine.
//!
//! Gyroaddition, gyroscalar multiplication and gyration in the Poincare
//! ball, conversions between the Poincare, Klein and hyperboloid models,
//! distances, geodesics and parallel transport, plus the record types of
//! the oracle validation layer.
//!
//! # Architecture
//!
//! - **config**: `SpaceConfig`, `NumericBackend`, `OracleSettings`
//! - **error**: `GyroError` taxonomy and non-fatal instability warnings
//! - **point**: `Point` and `Model`
//! - **space**: `GyrovectorSpace`, the immutable parameter set of every call
//! - **backend**: fast, compensated (double-double) and exact rational kernels
//! - **guard**: domain validation and near-boundary detection
//! - **algebra**: Mobius addition, scaling, gyration, inverse, identity
//! - **convert**: model bijections
//! - **geodesic**: distances, geodesics, parallel transport
//! - **transform**: 2-D Mobius transformations
//! - **cache**: optional LRU memoization for the facade
//! - **compute**: `Engine`, the name-addressed facade
//! - **validation**: `ValidationRecord` state machine
//!
//! All geometry is synchronous and pure: components borrow an immutable
//! space and return new values.
//!
//! # Example
//!
//! ```
//! use gyrograph_core::{GyroResult, GyrovectorSpace, Point};
//!
//! fn example() -> GyroResult<()> {
//!     let space = GyrovectorSpace::default();
//!     let a = Point::poincare(vec![0.3, 0.4, 0.0]);
//!     let b = Point::poincare(vec![0.1, 0.2, 0.5]);
//!
//!     let gyr = space.algebra().gyration(&a, &b)?;
//!     let ab = space.algebra().add(&a, &b)?;
//!     let ba = space.algebra().add(&b, &a)?;
//!     assert!(ab.approx_eq(&gyr.apply(&ba)?, 1e-9));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod algebra;
pub mod backend;
pub mod cache;
pub mod compute;
pub mod config;
pub mod convert;
pub mod error;
pub mod geodesic;
pub mod guard;
pub mod point;
pub mod space;
pub mod transform;
pub mod validation;

// Re-exports for convenience
pub use algebra::{Gyration, GyrovectorAlgebra};
pub use cache::{CacheKey, CacheStats, ComputeCache};
pub use compute::{Argument, Computation, ComputeRequest, ComputeValue, Engine, Operation};
pub use config::{NumericBackend, OracleSettings, SpaceConfig};
pub use convert::ModelConverter;
pub use error::{Diagnostics, GyroError, GyroResult, InstabilityKind, NumericalInstabilityWarning};
pub use geodesic::GeodesicSolver;
pub use guard::{Stability, StabilityGuard};
pub use point::{Model, Point};
pub use space::GyrovectorSpace;
pub use transform::Transformation;
pub use validation::{ComponentCheck, OracleDiscrepancy, ValidationRecord, ValidationStatus};
