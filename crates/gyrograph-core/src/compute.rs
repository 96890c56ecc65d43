//! Consumer facade: name-addressed operations over typed arguments.
//!
//! ```
//! use gyrograph_core::{Argument, ComputeValue, Engine, GyrovectorSpace, Model};
//!
//! let engine = Engine::new(GyrovectorSpace::default());
//! let computation = engine
//!     .compute(
//!         "distance",
//!         Model::Poincare,
//!         &[Argument::Point(vec![0.0, 0.0, 0.0]), Argument::Point(vec![0.5, 0.0, 0.0])],
//!     )
//!     .unwrap();
//!
//! match computation.result {
//!     ComputeValue::Scalar(d) => assert!((d - 0.5f64.atanh()).abs() < 1e-15),
//!     other => panic!("unexpected result {other:?}"),
//! }
//! ```
//!
//! Ball-model operations on Klein or hyperboloid coordinates are evaluated
//! in the Poincare ball and the resulting point is converted back to the
//! caller's model. Distances use the native formula of the model.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::cache::{CacheKey, CachedResult, ComputeCache};
use crate::error::{Diagnostics, GyroError, GyroResult, NumericalInstabilityWarning};
use crate::point::{Model, Point};
use crate::space::GyrovectorSpace;
use crate::transform::Transformation;
use crate::validation::ValidationRecord;

/// Operations reachable through the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Scale,
    Gyration,
    Inverse,
    Identity,
    Distance,
    Geodesic,
    Midpoint,
    ParallelTransport,
    ToKlein,
    ToPoincare,
    ToHyperboloid,
    MobiusTransform,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::Add,
        Operation::Scale,
        Operation::Gyration,
        Operation::Inverse,
        Operation::Identity,
        Operation::Distance,
        Operation::Geodesic,
        Operation::Midpoint,
        Operation::ParallelTransport,
        Operation::ToKlein,
        Operation::ToPoincare,
        Operation::ToHyperboloid,
        Operation::MobiusTransform,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Scale => "scale",
            Operation::Gyration => "gyration",
            Operation::Inverse => "inverse",
            Operation::Identity => "identity",
            Operation::Distance => "distance",
            Operation::Geodesic => "geodesic",
            Operation::Midpoint => "midpoint",
            Operation::ParallelTransport => "parallel_transport",
            Operation::ToKlein => "to_klein",
            Operation::ToPoincare => "to_poincare",
            Operation::ToHyperboloid => "to_hyperboloid",
            Operation::MobiusTransform => "mobius_transform",
        }
    }

    /// Accepted argument list, for usage messages.
    pub fn signature(self) -> &'static str {
        match self {
            Operation::Add => "add(point a, point b) -> point",
            Operation::Scale => "scale(scalar r, point a) -> point",
            Operation::Gyration => "gyration(point a, point b, point|vector w) -> point|vector",
            Operation::Inverse => "inverse(point a) -> point",
            Operation::Identity => "identity() -> point",
            Operation::Distance => "distance(point a, point b) -> scalar",
            Operation::Geodesic => "geodesic(point a, point b, scalar t) -> point",
            Operation::Midpoint => "midpoint(point a, point b) -> point",
            Operation::ParallelTransport => {
                "parallel_transport(vector w, point a, point b) -> vector"
            }
            Operation::ToKlein => "to_klein(point p) -> point",
            Operation::ToPoincare => "to_poincare(point p) -> point",
            Operation::ToHyperboloid => "to_hyperboloid(point p) -> point",
            Operation::MobiusTransform => "mobius_transform(transformation t, point z) -> point",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = GyroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == normalized)
            .ok_or_else(|| GyroError::UnknownOperation(s.to_string()))
    }
}

/// Facade argument. Point coordinates are read in the model passed to
/// [`Engine::compute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Argument {
    Point(Vec<f64>),
    /// Tangent vector (parallel transport, gyration of vectors).
    Vector(Vec<f64>),
    Scalar(f64),
    Transformation(Transformation),
}

impl Argument {
    fn kind(&self) -> &'static str {
        match self {
            Argument::Point(_) => "point",
            Argument::Vector(_) => "vector",
            Argument::Scalar(_) => "scalar",
            Argument::Transformation(_) => "transformation",
        }
    }
}

/// Facade result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ComputeValue {
    Point(Point),
    Tangent(Vec<f64>),
    Scalar(f64),
    Transformation(Transformation),
}

impl ComputeValue {
    pub fn as_point(&self) -> Option<&Point> {
        match self {
            ComputeValue::Point(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ComputeValue::Scalar(x) => Some(*x),
            _ => None,
        }
    }

    /// Numeric components in a fixed order, as compared by the oracle.
    pub fn components(&self) -> Vec<f64> {
        match self {
            ComputeValue::Point(p) => p.coords().to_vec(),
            ComputeValue::Tangent(v) => v.clone(),
            ComputeValue::Scalar(x) => vec![*x],
            ComputeValue::Transformation(t) => t.components().to_vec(),
        }
    }
}

impl fmt::Display for ComputeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeValue::Point(p) => write!(f, "{p}"),
            ComputeValue::Tangent(v) => write!(f, "vector{v:?}"),
            ComputeValue::Scalar(x) => write!(f, "{x}"),
            ComputeValue::Transformation(t) => write!(f, "transformation{:?}", t.components()),
        }
    }
}

/// A successful facade call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Computation {
    pub operation: Operation,
    pub model: Model,
    pub inputs: Vec<Argument>,
    pub result: ComputeValue,
    /// Every instability warning raised while computing.
    pub warnings: Vec<NumericalInstabilityWarning>,
    /// Always `None` from [`Engine`]; filled in by an oracle-backed facade.
    pub validation: Option<ValidationRecord>,
}

/// One entry of a batch, as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeRequest {
    pub operation: String,
    pub model: Model,
    #[serde(default)]
    pub args: Vec<Argument>,
}

/// Stateless entry point over a [`GyrovectorSpace`], with an optional
/// caller-owned cache.
#[derive(Debug, Clone)]
pub struct Engine {
    space: Arc<GyrovectorSpace>,
    cache: Option<Arc<ComputeCache>>,
}

impl Engine {
    pub fn new(space: GyrovectorSpace) -> Self {
        Self {
            space: Arc::new(space),
            cache: None,
        }
    }

    /// Memoize results in `cache`.
    pub fn with_cache(mut self, cache: Arc<ComputeCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn space(&self) -> &GyrovectorSpace {
        &self.space
    }

    pub fn cache(&self) -> Option<&Arc<ComputeCache>> {
        self.cache.as_ref()
    }

    /// Compute `operation` by name.
    ///
    /// # Errors
    /// `UnknownOperation` for unrecognized names, otherwise as
    /// [`compute_op`](Self::compute_op).
    pub fn compute(&self, operation: &str, model: Model, args: &[Argument]) -> GyroResult<Computation> {
        let operation = operation.parse::<Operation>()?;
        self.compute_op(operation, model, args)
    }

    /// # Errors
    /// - `InvalidArguments` for wrong arity or argument kinds
    /// - any error of the underlying operation
    #[instrument(skip_all, fields(operation = %operation, model = %model))]
    pub fn compute_op(&self, operation: Operation, model: Model, args: &[Argument]) -> GyroResult<Computation> {
        let key = self
            .cache
            .as_ref()
            .map(|_| CacheKey::new(&self.space, operation, model, args));

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                return Ok(Computation {
                    operation,
                    model,
                    inputs: args.to_vec(),
                    result: hit.result,
                    warnings: hit.warnings,
                    validation: None,
                });
            }
        }

        let diagnostics = Diagnostics::new();
        let result = Evaluator {
            space: &self.space,
            diagnostics: &diagnostics,
            operation,
            model,
        }
        .evaluate(args)?;
        let warnings = diagnostics.into_warnings();
        debug!(warnings = warnings.len(), "Computed");

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(
                key,
                CachedResult {
                    result: result.clone(),
                    warnings: warnings.clone(),
                },
            );
        }

        Ok(Computation {
            operation,
            model,
            inputs: args.to_vec(),
            result,
            warnings,
            validation: None,
        })
    }

    /// Compute independent requests in parallel. Results keep request order.
    pub fn compute_batch(&self, requests: &[ComputeRequest]) -> Vec<GyroResult<Computation>> {
        requests
            .par_iter()
            .map(|request| self.compute(&request.operation, request.model, &request.args))
            .collect()
    }
}

/// Argument dispatch for one facade call.
struct Evaluator<'a> {
    space: &'a GyrovectorSpace,
    diagnostics: &'a Diagnostics,
    operation: Operation,
    model: Model,
}

impl<'a> Evaluator<'a> {
    fn evaluate(&self, args: &[Argument]) -> GyroResult<ComputeValue> {
        let algebra = self.space.algebra_with(self.diagnostics);
        let solver = self.space.solver_with(self.diagnostics);
        let converter = self.space.converter_with(self.diagnostics);

        match (self.operation, args) {
            (Operation::Identity, []) => Ok(ComputeValue::Point(self.space.origin(self.model))),
            (Operation::Add, [Argument::Point(a), Argument::Point(b)]) => {
                self.in_ball(&[a, b], |p| algebra.add(&p[0], &p[1]))
            }
            (Operation::Scale, [Argument::Scalar(r), Argument::Point(a)]) => {
                self.in_ball(&[a], |p| algebra.scale(*r, &p[0]))
            }
            (Operation::Inverse, [Argument::Point(a)]) => {
                self.in_ball(&[a], |p| algebra.inverse(&p[0]))
            }
            (Operation::Gyration, [Argument::Point(a), Argument::Point(b), Argument::Point(w)]) => {
                self.in_ball(&[a, b, w], |p| algebra.gyration(&p[0], &p[1])?.apply(&p[2]))
            }
            (Operation::Gyration, [Argument::Point(a), Argument::Point(b), Argument::Vector(w)]) => {
                self.require_poincare()?;
                let gyration = algebra.gyration(&self.point(a), &self.point(b))?;
                Ok(ComputeValue::Tangent(gyration.apply_vector(w)?))
            }
            (Operation::Distance, [Argument::Point(a), Argument::Point(b)]) => Ok(ComputeValue::Scalar(
                solver.native_distance(&self.point(a), &self.point(b))?,
            )),
            (Operation::Geodesic, [Argument::Point(a), Argument::Point(b), Argument::Scalar(t)]) => {
                let result = self.in_ball(&[a, b], |p| solver.geodesic(&p[0], &p[1], *t))?;
                // endpoints come back as given, without a round trip through the ball
                Ok(match *t {
                    t if t == 0.0 => ComputeValue::Point(self.point(a)),
                    t if t == 1.0 => ComputeValue::Point(self.point(b)),
                    _ => result,
                })
            }
            (Operation::Midpoint, [Argument::Point(a), Argument::Point(b)]) => {
                self.in_ball(&[a, b], |p| solver.midpoint(&p[0], &p[1]))
            }
            (
                Operation::ParallelTransport,
                [Argument::Vector(w), Argument::Point(a), Argument::Point(b)],
            ) => {
                self.require_poincare()?;
                Ok(ComputeValue::Tangent(solver.parallel_transport(
                    w,
                    &self.point(a),
                    &self.point(b),
                )?))
            }
            (Operation::ToKlein, [Argument::Point(p)]) => Ok(ComputeValue::Point(
                converter.to_klein(&self.point(p))?,
            )),
            (Operation::ToPoincare, [Argument::Point(p)]) => Ok(ComputeValue::Point(
                converter.to_poincare(&self.point(p))?,
            )),
            (Operation::ToHyperboloid, [Argument::Point(p)]) => Ok(ComputeValue::Point(
                converter.to_hyperboloid(&self.point(p))?,
            )),
            (Operation::MobiusTransform, [Argument::Transformation(t), Argument::Point(z)]) => {
                self.in_ball(&[z], |p| t.apply_point(self.space, &p[0]))
            }
            (operation, args) => Err(GyroError::invalid_arguments(
                operation.name(),
                format!(
                    "got ({}); expected {}",
                    args.iter().map(Argument::kind).collect::<Vec<_>>().join(", "),
                    operation.signature()
                ),
            )),
        }
    }

    fn point(&self, coords: &[f64]) -> Point {
        Point::new(self.model, coords.to_vec())
    }

    fn require_poincare(&self) -> GyroResult<()> {
        if self.model == Model::Poincare {
            Ok(())
        } else {
            Err(GyroError::ModelMismatch {
                expected: Model::Poincare,
                actual: self.model,
            })
        }
    }

    /// Run a ball operation on Poincare images of the inputs and express the
    /// resulting point in the caller's model.
    fn in_ball<F>(&self, inputs: &[&Vec<f64>], f: F) -> GyroResult<ComputeValue>
    where
        F: FnOnce(&[Point]) -> GyroResult<Point>,
    {
        if self.model == Model::Poincare {
            let points: Vec<Point> = inputs.iter().map(|coords| self.point(coords)).collect();
            return Ok(ComputeValue::Point(f(&points)?));
        }
        let converter = self.space.converter_with(self.diagnostics);
        let points = inputs
            .iter()
            .map(|coords| converter.to_poincare(&self.point(coords)))
            .collect::<GyroResult<Vec<_>>>()?;
        let result = f(&points)?;
        Ok(ComputeValue::Point(converter.convert(&result, self.model)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InstabilityKind;

    fn engine() -> Engine {
        Engine::new(GyrovectorSpace::default())
    }

    fn point(computation: &Computation) -> &Point {
        computation.result.as_point().expect("point result")
    }

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
        assert_eq!("Parallel-Transport".parse::<Operation>().unwrap(), Operation::ParallelTransport);
    }

    #[test]
    fn test_unknown_operation() {
        let err = engine().compute("cross_ratio", Model::Poincare, &[]).unwrap_err();
        assert_eq!(err, GyroError::UnknownOperation("cross_ratio".to_string()));
    }

    #[test]
    fn test_add_through_facade() {
        let computation = engine()
            .compute(
                "add",
                Model::Poincare,
                &[Argument::Point(vec![0.3, 0.4, 0.0]), Argument::Point(vec![0.1, 0.2, 0.5])],
            )
            .unwrap();
        let expected = [0.531 / 1.295, 0.758 / 1.295, 0.375 / 1.295];
        assert!(point(&computation).approx_eq(&Point::poincare(expected.to_vec()), 1e-10));
        assert!(computation.warnings.is_empty());
        assert!(computation.validation.is_none());
    }

    #[test]
    fn test_wrong_arguments() {
        let err = engine()
            .compute("scale", Model::Poincare, &[Argument::Point(vec![0.1, 0.0, 0.0])])
            .unwrap_err();
        match err {
            GyroError::InvalidArguments { operation, reason } => {
                assert_eq!(operation, "scale");
                assert!(reason.contains("got (point)"));
                assert!(reason.contains("scalar r"));
            }
            other => panic!("expected InvalidArguments, got {other:?}"),
        }
    }

    #[test]
    fn test_klein_inputs_return_klein_result() {
        let engine = engine();
        let space = engine.space();
        let a = Point::poincare(vec![0.3, 0.4, 0.0]);
        let b = Point::poincare(vec![0.1, 0.2, 0.5]);
        let ka = space.converter().to_klein(&a).unwrap();
        let kb = space.converter().to_klein(&b).unwrap();

        let computation = engine
            .compute(
                "add",
                Model::Klein,
                &[Argument::Point(ka.into_coords()), Argument::Point(kb.into_coords())],
            )
            .unwrap();

        let expected = space
            .converter()
            .to_klein(&space.algebra().add(&a, &b).unwrap())
            .unwrap();
        assert_eq!(point(&computation).model(), Model::Klein);
        assert!(point(&computation).approx_eq(&expected, 1e-12));
    }

    #[test]
    fn test_hyperboloid_distance_through_facade() {
        let engine = engine();
        let space = engine.space();
        let h = space
            .converter()
            .to_hyperboloid(&Point::poincare(vec![0.5, 0.0, 0.0]))
            .unwrap();

        let computation = engine
            .compute(
                "distance",
                Model::Hyperboloid,
                &[
                    Argument::Point(space.origin(Model::Hyperboloid).into_coords()),
                    Argument::Point(h.into_coords()),
                ],
            )
            .unwrap();
        let d = computation.result.as_scalar().unwrap();
        assert!((d - 0.5f64.atanh()).abs() < 1e-12);
    }

    #[test]
    fn test_identity_in_each_model() {
        let engine = engine();
        for model in Model::ALL {
            let computation = engine.compute("identity", model, &[]).unwrap();
            assert_eq!(point(&computation), &engine.space().origin(model));
        }
    }

    #[test]
    fn test_parallel_transport_requires_poincare() {
        let err = engine()
            .compute(
                "parallel_transport",
                Model::Klein,
                &[
                    Argument::Vector(vec![1.0, 0.0, 0.0]),
                    Argument::Point(vec![0.1, 0.0, 0.0]),
                    Argument::Point(vec![0.0, 0.1, 0.0]),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, GyroError::ModelMismatch { .. }));
    }

    #[test]
    fn test_gyration_of_vector() {
        let computation = engine()
            .compute(
                "gyration",
                Model::Poincare,
                &[
                    Argument::Point(vec![0.3, 0.4, 0.0]),
                    Argument::Point(vec![-0.1, 0.2, 0.5]),
                    Argument::Vector(vec![1.0, 0.0, 0.0]),
                ],
            )
            .unwrap();
        match computation.result {
            ComputeValue::Tangent(v) => {
                let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
                assert!((norm - 1.0).abs() < 1e-12);
            }
            other => panic!("expected tangent, got {other:?}"),
        }
    }

    #[test]
    fn test_mobius_transform_in_plane() {
        let engine = Engine::new(GyrovectorSpace::with_curvature(-1.0, 2).unwrap());
        let t = Transformation::identity();
        let computation = engine
            .compute(
                "mobius_transform",
                Model::Poincare,
                &[Argument::Transformation(t), Argument::Point(vec![0.25, -0.5])],
            )
            .unwrap();
        assert!(point(&computation).approx_eq(&Point::poincare(vec![0.25, -0.5]), 1e-15));
    }

    #[test]
    fn test_domain_error_propagates() {
        let err = engine()
            .compute(
                "add",
                Model::Poincare,
                &[Argument::Point(vec![1.5, 0.0, 0.0]), Argument::Point(vec![0.0; 3])],
            )
            .unwrap_err();
        assert!(err.is_domain_violation());
    }

    #[test]
    fn test_warnings_are_collected() {
        let computation = engine()
            .compute(
                "add",
                Model::Poincare,
                &[
                    Argument::Point(vec![1.0 - 1e-14, 0.0, 0.0]),
                    Argument::Point(vec![0.0, 0.1, 0.0]),
                ],
            )
            .unwrap();
        assert!(computation
            .warnings
            .iter()
            .any(|w| matches!(w.kind, InstabilityKind::NearBoundary { .. })));
    }

    #[test]
    fn test_cache_hit_returns_identical_result() {
        let cache = Arc::new(ComputeCache::new(16).unwrap());
        let engine = engine().with_cache(Arc::clone(&cache));
        let args = [Argument::Scalar(2.0), Argument::Point(vec![0.1, 0.2, 0.3])];

        let first = engine.compute("scale", Model::Poincare, &args).unwrap();
        let second = engine.compute("scale", Model::Poincare, &args).unwrap();

        assert_eq!(first, second);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_batch_keeps_order() {
        let engine = engine();
        let requests: Vec<ComputeRequest> = (1..=8)
            .map(|i| ComputeRequest {
                operation: "distance".to_string(),
                model: Model::Poincare,
                args: vec![
                    Argument::Point(vec![0.0; 3]),
                    Argument::Point(vec![i as f64 / 10.0, 0.0, 0.0]),
                ],
            })
            .collect();

        let results = engine.compute_batch(&requests);
        assert_eq!(results.len(), 8);
        for (i, result) in results.iter().enumerate() {
            let d = result.as_ref().unwrap().result.as_scalar().unwrap();
            assert!((d - ((i + 1) as f64 / 10.0).atanh()).abs() < 1e-14);
        }
    }

    #[test]
    fn test_request_deserializes() {
        let json = r#"{
            "operation": "scale",
            "model": "poincare",
            "args": [
                {"type": "scalar", "value": 2.0},
                {"type": "point", "value": [0.1, 0.2, 0.3]}
            ]
        }"#;
        let request: ComputeRequest = serde_json::from_str(json).expect("deserialize");
        assert_eq!(request.args[0], Argument::Scalar(2.0));
        assert_eq!(request.model, Model::Poincare);
    }

    #[test]
    fn test_request_with_degenerate_transformation_is_rejected() {
        let json = r#"{
            "operation": "mobius_transform",
            "model": "poincare",
            "args": [
                {"type": "transformation", "value": {"a": [1, 0], "b": [0.5, 0], "c": [2, 0], "d": [1, 0]}},
                {"type": "point", "value": [0.25, 0.0]}
            ]
        }"#;
        let err = serde_json::from_str::<ComputeRequest>(json).unwrap_err();
        assert!(err.to_string().contains("Degenerate"), "{err}");
    }

    #[test]
    fn test_geodesic_endpoints_are_exact_in_every_model() {
        let engine = engine();
        let space = engine.space();
        let a = Point::poincare(vec![0.3, 0.4, 0.0]);
        let b = Point::poincare(vec![0.1, 0.2, 0.5]);

        for model in [Model::Klein, Model::Hyperboloid] {
            let ea = space.converter().convert(&a, model).unwrap().into_coords();
            let eb = space.converter().convert(&b, model).unwrap().into_coords();
            for (t, expected) in [(0.0, &ea), (1.0, &eb)] {
                let computation = engine
                    .compute(
                        "geodesic",
                        model,
                        &[
                            Argument::Point(ea.clone()),
                            Argument::Point(eb.clone()),
                            Argument::Scalar(t),
                        ],
                    )
                    .unwrap();
                assert_eq!(point(&computation).model(), model);
                assert_eq!(point(&computation).coords(), expected.as_slice(), "{model} t={t}");
            }
        }

        // endpoints are still validated
        let err = engine
            .compute(
                "geodesic",
                Model::Klein,
                &[
                    Argument::Point(vec![1.5, 0.0, 0.0]),
                    Argument::Point(vec![0.0; 3]),
                    Argument::Scalar(0.0),
                ],
            )
            .unwrap_err();
        assert!(err.is_domain_violation());
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
