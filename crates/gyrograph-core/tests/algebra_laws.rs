//! Gyrogroup laws and geometric invariants, sampled with a seeded RNG.
//!
//! Every test draws its points from `ChaCha8Rng` so failures reproduce.

use gyrograph_core::{GyrovectorSpace, Model, NumericBackend, Point, SpaceConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SAMPLES: usize = 100;

fn make_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Uniform direction, radius in `[0, max_fraction)` of the ball radius.
fn random_point(rng: &mut ChaCha8Rng, space: &GyrovectorSpace, max_fraction: f64) -> Point {
    let direction: Vec<f64> = (0..space.dimension())
        .map(|_| rng.gen_range(-1.0..1.0))
        .collect();
    let len = direction.iter().map(|x| x * x).sum::<f64>().sqrt().max(1e-12);
    let radius = rng.gen_range(0.0..max_fraction) * space.radius();
    Point::poincare(direction.iter().map(|x| x * radius / len).collect::<Vec<_>>())
}

fn spaces() -> Vec<GyrovectorSpace> {
    vec![
        GyrovectorSpace::default(),
        GyrovectorSpace::with_curvature(-0.5, 2).unwrap(),
        GyrovectorSpace::with_curvature(-3.0, 5).unwrap(),
    ]
}

fn max_diff(a: &Point, b: &Point) -> f64 {
    a.max_abs_diff(b).expect("same model and dimension")
}

#[test]
fn test_identity_law() {
    for space in spaces() {
        let algebra = space.algebra();
        let mut rng = make_rng(1);
        for _ in 0..SAMPLES {
            let a = random_point(&mut rng, &space, 0.99);
            let sum = algebra.add(&a, &algebra.identity()).unwrap();
            assert!(max_diff(&sum, &a) < 1e-12, "a ⊕ 0 != a for {a}");
        }
    }
}

#[test]
fn test_inverse_law() {
    for space in spaces() {
        let algebra = space.algebra();
        let mut rng = make_rng(2);
        for _ in 0..SAMPLES {
            let a = random_point(&mut rng, &space, 0.99);
            let sum = algebra.add(&a, &algebra.inverse(&a).unwrap()).unwrap();
            assert!(sum.euclidean_norm() < 1e-12, "a ⊕ ⊖a = {sum}");
        }
    }
}

#[test]
fn test_gyrocommutativity() {
    for space in spaces() {
        let algebra = space.algebra();
        let mut rng = make_rng(3);
        for _ in 0..SAMPLES {
            let a = random_point(&mut rng, &space, 0.95);
            let b = random_point(&mut rng, &space, 0.95);

            let ab = algebra.add(&a, &b).unwrap();
            let ba = algebra.add(&b, &a).unwrap();
            let rotated = algebra.gyration(&a, &b).unwrap().apply(&ba).unwrap();
            assert!(max_diff(&ab, &rotated) < 1e-9, "a = {a}, b = {b}");
        }
    }
}

#[test]
fn test_left_gyroassociativity() {
    for space in spaces() {
        let algebra = space.algebra();
        let mut rng = make_rng(4);
        for _ in 0..SAMPLES {
            let a = random_point(&mut rng, &space, 0.9);
            let b = random_point(&mut rng, &space, 0.9);
            let c = random_point(&mut rng, &space, 0.9);

            let lhs = algebra.add(&a, &algebra.add(&b, &c).unwrap()).unwrap();
            let gyr_c = algebra.gyration(&a, &b).unwrap().apply(&c).unwrap();
            let rhs = algebra.add(&algebra.add(&a, &b).unwrap(), &gyr_c).unwrap();
            assert!(max_diff(&lhs, &rhs) < 1e-9);
        }
    }
}

#[test]
fn test_gyration_preserves_norm_and_inner_product() {
    for space in spaces() {
        let algebra = space.algebra();
        let mut rng = make_rng(5);
        for _ in 0..SAMPLES {
            let a = random_point(&mut rng, &space, 0.95);
            let b = random_point(&mut rng, &space, 0.95);
            let u: Vec<f64> = (0..space.dimension()).map(|_| rng.gen_range(-2.0..2.0)).collect();
            let v: Vec<f64> = (0..space.dimension()).map(|_| rng.gen_range(-2.0..2.0)).collect();

            let gyr = algebra.gyration(&a, &b).unwrap();
            let gu = gyr.apply_vector(&u).unwrap();
            let gv = gyr.apply_vector(&v).unwrap();

            let dot = |x: &[f64], y: &[f64]| x.iter().zip(y).map(|(p, q)| p * q).sum::<f64>();
            assert!((dot(&gu, &gv) - dot(&u, &v)).abs() < 1e-9);
            assert!((dot(&gu, &gu).sqrt() - dot(&u, &u).sqrt()).abs() < 1e-9);
        }
    }
}

#[test]
fn test_round_trip_conversions() {
    for space in spaces() {
        let converter = space.converter();
        let mut rng = make_rng(6);
        for _ in 0..SAMPLES {
            let p = random_point(&mut rng, &space, 0.99);

            let via_klein = converter.to_poincare(&converter.to_klein(&p).unwrap()).unwrap();
            assert!(max_diff(&via_klein, &p) < 1e-9);

            let via_sheet = converter
                .to_poincare(&converter.to_hyperboloid(&p).unwrap())
                .unwrap();
            assert!(max_diff(&via_sheet, &p) < 1e-9);
        }
    }
}

#[test]
fn test_distance_symmetry_and_triangle_inequality() {
    for space in spaces() {
        let solver = space.solver();
        let mut rng = make_rng(7);
        for _ in 0..SAMPLES {
            let a = random_point(&mut rng, &space, 0.95);
            let b = random_point(&mut rng, &space, 0.95);
            let c = random_point(&mut rng, &space, 0.95);

            let ab = solver.distance(&a, &b).unwrap();
            let ba = solver.distance(&b, &a).unwrap();
            let bc = solver.distance(&b, &c).unwrap();
            let ac = solver.distance(&a, &c).unwrap();

            assert!((ab - ba).abs() < 1e-12);
            assert!(ab >= 0.0);
            assert!(ac <= ab + bc + 1e-12, "d(a,c) = {ac} > {ab} + {bc}");
        }
    }
}

#[test]
fn test_cross_model_distance_agreement() {
    for space in spaces() {
        let converter = space.converter();
        let solver = space.solver();
        let mut rng = make_rng(8);
        for _ in 0..SAMPLES {
            let a = random_point(&mut rng, &space, 0.95);
            let b = random_point(&mut rng, &space, 0.95);

            let poincare = solver.distance(&a, &b).unwrap();
            let klein = solver
                .klein_distance(&converter.to_klein(&a).unwrap(), &converter.to_klein(&b).unwrap())
                .unwrap();
            let sheet = solver
                .hyperboloid_distance(
                    &converter.to_hyperboloid(&a).unwrap(),
                    &converter.to_hyperboloid(&b).unwrap(),
                )
                .unwrap();

            let tolerance = 1e-8 * poincare.max(1.0);
            assert!((poincare - klein).abs() < tolerance, "{poincare} vs klein {klein}");
            assert!((poincare - sheet).abs() < tolerance, "{poincare} vs hyperboloid {sheet}");
        }
    }
}

#[test]
fn test_parallel_transport_preserves_inner_product() {
    for space in spaces() {
        let solver = space.solver();
        let mut rng = make_rng(9);
        for _ in 0..SAMPLES {
            let a = random_point(&mut rng, &space, 0.9);
            let b = random_point(&mut rng, &space, 0.9);
            let u: Vec<f64> = (0..space.dimension()).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let v: Vec<f64> = (0..space.dimension()).map(|_| rng.gen_range(-1.0..1.0)).collect();

            let before = solver.inner_product_at(&a, &u, &v).unwrap();
            let tu = solver.parallel_transport(&u, &a, &b).unwrap();
            let tv = solver.parallel_transport(&v, &a, &b).unwrap();
            let after = solver.inner_product_at(&b, &tu, &tv).unwrap();

            let scale = solver.inner_product_at(&a, &u, &u).unwrap()
                + solver.inner_product_at(&a, &v, &v).unwrap();
            assert!((before - after).abs() <= 1e-9 * scale.max(1.0), "{before} vs {after}");
        }
    }
}

#[test]
fn test_boundary_distance_monotone_and_finite() {
    let space = GyrovectorSpace::default();
    let solver = space.solver();
    let origin = space.origin(Model::Poincare);

    let mut previous = 0.0;
    for k in 1..=15 {
        let r = 1.0 - 10f64.powi(-k);
        let d = solver.distance(&origin, &Point::poincare(vec![r, 0.0, 0.0])).unwrap();
        assert!(d.is_finite(), "distance NaN/inf at r = 1 - 1e-{k}");
        assert!(d > previous, "distance not increasing at r = 1 - 1e-{k}");
        previous = d;
    }
}

#[test]
fn test_backends_agree_on_interior_points() {
    let mut rng = make_rng(10);
    let fast = GyrovectorSpace::default();
    let others: Vec<GyrovectorSpace> = [NumericBackend::MultiPrecision, NumericBackend::ExactSymbolic]
        .into_iter()
        .map(|backend| {
            GyrovectorSpace::new(SpaceConfig {
                backend,
                ..SpaceConfig::default()
            })
            .unwrap()
        })
        .collect();

    for _ in 0..SAMPLES {
        let a = random_point(&mut rng, &fast, 0.9);
        let b = random_point(&mut rng, &fast, 0.9);
        let reference = fast.algebra().add(&a, &b).unwrap();
        let reference_scale = fast.algebra().scale(1.7, &a).unwrap();

        for space in &others {
            assert!(max_diff(&space.algebra().add(&a, &b).unwrap(), &reference) < 1e-12);
            assert!(max_diff(&space.algebra().scale(1.7, &a).unwrap(), &reference_scale) < 1e-12);
        }
    }
}
