//! Symbolic descriptions of facade operations.
//!
//! [`describe`] builds one closed-form expression per result component with
//! the inputs substituted as literals. The expressions are the textbook
//! formulas, not the numerically stabilized forms the engine evaluates, so
//! an oracle answer is an independent check. Geodesic points are built from
//! the Gram quantities (`<a,b>`, `|a|²`, `|b|²`) of each Mobius sum so the
//! expressions stay linear in the dimension, and gyrations use Ungar's
//! closed form. Ball operations on Klein or hyperboloid coordinates return
//! `None`.

use gyrograph_core::{Argument, GyrovectorSpace, Model, Operation};

use crate::expr::{Expr, Function};
use crate::query::ExpectedType;

/// Per-component expressions for one computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    pub components: Vec<Expr>,
    pub expected: ExpectedType,
}

/// Human-readable call descriptor, e.g. `distance(poincare(0, 0, 0), poincare(0.5, 0, 0))`.
pub fn descriptor(operation: Operation, model: Model, inputs: &[Argument]) -> String {
    let arguments: Vec<String> = inputs
        .iter()
        .map(|arg| match arg {
            Argument::Point(coords) => format!("{model}({})", join(coords)),
            Argument::Vector(coords) => format!("vector({})", join(coords)),
            Argument::Scalar(x) => x.to_string(),
            Argument::Transformation(t) => format!("mobius({})", join(&t.components())),
        })
        .collect();
    format!("{operation}({})", arguments.join(", "))
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn describe(
    space: &GyrovectorSpace,
    operation: Operation,
    model: Model,
    inputs: &[Argument],
) -> Option<Description> {
    let c = space.c();
    let mut expected = ExpectedType::Real;
    if model == Model::Hyperboloid
        && inputs
            .iter()
            .any(|arg| matches!(arg, Argument::Point(coords) if coords.is_empty()))
    {
        return None;
    }

    let components = match (operation, model, inputs) {
        (Operation::Identity, _, []) => origin(c, model, space.dimension()),
        (Operation::Add, Model::Poincare, [Argument::Point(a), Argument::Point(b)]) => {
            mobius_add(c, &literals(a), &literals(b), Gram::of(a, b))
        }
        (Operation::Inverse, Model::Poincare, [Argument::Point(a)]) => inverse(a),
        (
            Operation::Gyration,
            Model::Poincare,
            [Argument::Point(a), Argument::Point(b), Argument::Point(w) | Argument::Vector(w)],
        ) => gyration(c, &literals(a), &literals(b), w),
        (
            Operation::Geodesic,
            Model::Poincare,
            [Argument::Point(a), Argument::Point(b), Argument::Scalar(t)],
        ) => geodesic(c, a, b, *t),
        (Operation::Midpoint, Model::Poincare, [Argument::Point(a), Argument::Point(b)]) => {
            geodesic(c, a, b, 0.5)
        }
        (
            Operation::ParallelTransport,
            Model::Poincare,
            [Argument::Vector(w), Argument::Point(a), Argument::Point(b)],
        ) => parallel_transport(c, w, a, b),
        (
            Operation::MobiusTransform,
            Model::Poincare,
            [Argument::Transformation(t), Argument::Point(z)],
        ) if z.len() == 2 => mobius_transform(&t.components(), z[0], z[1]),
        (Operation::Scale, Model::Poincare, [Argument::Scalar(r), Argument::Point(a)]) => {
            scale(c, *r, a)
        }
        (Operation::Distance, _, [Argument::Point(a), Argument::Point(b)]) => {
            expected = ExpectedType::NonNegativeReal;
            vec![match model {
                Model::Poincare => poincare_distance(c, a, b),
                Model::Klein => klein_distance(c, a, b),
                Model::Hyperboloid => hyperboloid_distance(c, a, b),
            }]
        }
        (Operation::ToKlein, _, [Argument::Point(x)]) => to_klein(c, model, x),
        (Operation::ToPoincare, _, [Argument::Point(x)]) => to_poincare(c, model, x),
        (Operation::ToHyperboloid, _, [Argument::Point(x)]) => to_hyperboloid(c, model, x),
        _ => return None,
    };

    Some(Description {
        components,
        expected,
    })
}

fn one() -> Expr {
    Expr::num(1.0)
}

fn sqrt_c(c: f64) -> Expr {
    Expr::sqrt(Expr::num(c))
}

fn literals(x: &[f64]) -> Vec<Expr> {
    x.iter().map(|xi| Expr::num(*xi)).collect()
}

fn origin(c: f64, model: Model, dimension: usize) -> Vec<Expr> {
    let mut components = Vec::with_capacity(dimension + 1);
    if model == Model::Hyperboloid {
        components.push(Expr::div(one(), sqrt_c(c)));
    }
    components.extend((0..dimension).map(|_| Expr::num(0.0)));
    components
}

fn inverse(a: &[f64]) -> Vec<Expr> {
    a.iter().map(|x| Expr::neg(Expr::num(*x))).collect()
}

/// Inner products of the two operands of a Mobius sum.
struct Gram {
    ab: Expr,
    aa: Expr,
    bb: Expr,
}

impl Gram {
    fn of(a: &[f64], b: &[f64]) -> Self {
        Self {
            ab: Expr::dot(a, b),
            aa: Expr::squared_norm(a),
            bb: Expr::squared_norm(b),
        }
    }
}

/// `((1 + 2c<a,b> + c|b|²)a + (1 - c|a|²)b) / (1 + 2c<a,b> + c²|a|²|b|²)`.
fn mobius_add(c: f64, a: &[Expr], b: &[Expr], gram: Gram) -> Vec<Expr> {
    let Gram { ab, aa, bb } = gram;
    let cn = Expr::num(c);
    let two_c_dot = Expr::product([Expr::num(2.0), cn.clone(), ab]);
    let left = Expr::sum([one(), two_c_dot.clone(), Expr::product([cn.clone(), bb.clone()])]);
    let right = Expr::sub(one(), Expr::product([cn.clone(), aa.clone()]));
    let denominator = Expr::sum([one(), two_c_dot, Expr::product([Expr::pow(cn, 2), aa, bb])]);

    a.iter()
        .zip(b)
        .map(|(ai, bi)| {
            Expr::div(
                Expr::sum([
                    Expr::product([left.clone(), ai.clone()]),
                    Expr::product([right.clone(), bi.clone()]),
                ]),
                denominator.clone(),
            )
        })
        .collect()
}

/// `tanh(r·atanh(sqrt(c)|a|))·a / (sqrt(c)|a|)`.
fn scale(c: f64, r: f64, a: &[f64]) -> Vec<Expr> {
    if a.iter().all(|x| *x == 0.0) {
        return a.iter().map(|_| Expr::num(0.0)).collect();
    }
    let scaled_norm = Expr::product([sqrt_c(c), Expr::sqrt(Expr::squared_norm(a))]);
    let factor = Expr::call(
        Function::Tanh,
        Expr::product([
            Expr::num(r),
            Expr::call(Function::ArcTanh, scaled_norm.clone()),
        ]),
    );
    a.iter()
        .map(|ai| {
            Expr::product([
                factor.clone(),
                Expr::div(Expr::num(*ai), scaled_norm.clone()),
            ])
        })
        .collect()
}

/// `1 - 2c<a,b> + c²|a|²|b|²`, the denominator of `⊖a ⊕ b`.
fn gyro_gap(c: f64, a: &[f64], b: &[f64]) -> Expr {
    let cn = Expr::num(c);
    Expr::sum([
        one(),
        Expr::neg(Expr::product([Expr::num(2.0), cn.clone(), Expr::dot(a, b)])),
        Expr::product([Expr::pow(cn, 2), Expr::squared_norm(a), Expr::squared_norm(b)]),
    ])
}

/// `a ⊕ t⊗(⊖a ⊕ b)`.
///
/// With `u = ⊖a ⊕ b`, `|u|² = |a - b|² / D` and
/// `<a,u> = (-(1 - 2c<a,b> + c|b|²)|a|² + (1 - c|a|²)<a,b>) / D`, where
/// `D` is [`gyro_gap`]. Scaling by `f = tanh(t·atanh(sqrt(c)|u|)) / (sqrt(c)|u|)`
/// multiplies `<a,u>` by `f` and sets `|t⊗u|² = tanh(..)² / c`.
fn geodesic(c: f64, a: &[f64], b: &[f64], t: f64) -> Vec<Expr> {
    if t == 0.0 || a == b {
        return literals(a);
    }
    if t == 1.0 {
        return literals(b);
    }
    let cn = Expr::num(c);
    let gap = gyro_gap(c, a, b);
    let left = Expr::sum([
        one(),
        Expr::neg(Expr::product([Expr::num(2.0), cn.clone(), Expr::dot(a, b)])),
        Expr::product([cn.clone(), Expr::squared_norm(b)]),
    ]);
    let right = Expr::sub(one(), Expr::product([cn, Expr::squared_norm(a)]));

    let direction = mobius_add(
        c,
        &inverse(a),
        &literals(b),
        Gram {
            ab: Expr::neg(Expr::dot(a, b)),
            aa: Expr::squared_norm(a),
            bb: Expr::squared_norm(b),
        },
    );
    let direction_norm = Expr::sqrt(Expr::div(squared_difference(a, b), gap.clone()));
    let a_dot_direction = Expr::div(
        Expr::sum([
            Expr::neg(Expr::product([left, Expr::squared_norm(a)])),
            Expr::product([right, Expr::dot(a, b)]),
        ]),
        gap,
    );

    let scaled_norm = Expr::product([sqrt_c(c), direction_norm]);
    let tanh = Expr::call(
        Function::Tanh,
        Expr::product([
            Expr::num(t),
            Expr::call(Function::ArcTanh, scaled_norm.clone()),
        ]),
    );
    let factor = Expr::div(tanh.clone(), scaled_norm);
    let step: Vec<Expr> = direction
        .into_iter()
        .map(|ui| Expr::product([factor.clone(), ui]))
        .collect();

    mobius_add(
        c,
        &literals(a),
        &step,
        Gram {
            ab: Expr::product([factor, a_dot_direction]),
            aa: Expr::squared_norm(a),
            bb: Expr::div(Expr::pow(tanh, 2), Expr::num(c)),
        },
    )
}

/// Ungar's closed form `gyr[u,v]w = w + 2(A·u + B·v)/D` with
/// `A = -c²<u,w>|v|² + c<v,w> + 2c²<u,v><v,w>`,
/// `B = -c²<v,w>|u|² - c<u,w>`, `D = 1 + 2c<u,v> + c²|u|²|v|²`.
fn gyration(c: f64, u: &[Expr], v: &[Expr], w: &[f64]) -> Vec<Expr> {
    let inner = |x: &[Expr], y: &[Expr]| {
        Expr::sum(
            x.iter()
                .zip(y)
                .map(|(a, b)| Expr::product([a.clone(), b.clone()])),
        )
    };
    let w_exprs = literals(w);
    let (uu, vv, uv) = (inner(u, u), inner(v, v), inner(u, v));
    let (uw, vw) = (inner(u, &w_exprs), inner(v, &w_exprs));
    let cn = Expr::num(c);
    let c2 = Expr::pow(cn.clone(), 2);

    let coeff_u = Expr::sum([
        Expr::neg(Expr::product([c2.clone(), uw.clone(), vv.clone()])),
        Expr::product([cn.clone(), vw.clone()]),
        Expr::product([Expr::num(2.0), c2.clone(), uv.clone(), vw.clone()]),
    ]);
    let coeff_v = Expr::sub(
        Expr::neg(Expr::product([c2.clone(), vw, uu.clone()])),
        Expr::product([cn.clone(), uw]),
    );
    let denominator = Expr::sum([
        one(),
        Expr::product([Expr::num(2.0), cn, uv]),
        Expr::product([c2, uu, vv]),
    ]);

    w_exprs
        .into_iter()
        .zip(u.iter().zip(v))
        .map(|(wi, (ui, vi))| {
            Expr::sum([
                wi,
                Expr::div(
                    Expr::product([
                        Expr::num(2.0),
                        Expr::sum([
                            Expr::product([coeff_u.clone(), ui.clone()]),
                            Expr::product([coeff_v.clone(), vi.clone()]),
                        ]),
                    ]),
                    denominator.clone(),
                ),
            ])
        })
        .collect()
}

/// `(λ_a/λ_b)·gyr[b, ⊖a]w` with `λ_a/λ_b = (1 - c|b|²) / (1 - c|a|²)`.
fn parallel_transport(c: f64, w: &[f64], a: &[f64], b: &[f64]) -> Vec<Expr> {
    let gap = |x: &[f64]| Expr::sub(one(), Expr::product([Expr::num(c), Expr::squared_norm(x)]));
    let ratio = Expr::div(gap(b), gap(a));
    gyration(c, &literals(b), &inverse(a), w)
        .into_iter()
        .map(|component| Expr::product([ratio.clone(), component]))
        .collect()
}

/// Real and imaginary parts of `(αz + β) / (γz + δ)` at `z = x + iy`, from
/// `[α.re, α.im, β.re, β.im, γ.re, γ.im, δ.re, δ.im]`.
fn mobius_transform(coefficients: &[f64; 8], x: f64, y: f64) -> Vec<Expr> {
    let [ar, ai, br, bi, cr, ci, dr, di] = *coefficients;
    let affine = |re: f64, im: f64, shift_re: f64, shift_im: f64| {
        let real = Expr::sum([
            Expr::product([Expr::num(re), Expr::num(x)]),
            Expr::neg(Expr::product([Expr::num(im), Expr::num(y)])),
            Expr::num(shift_re),
        ]);
        let imaginary = Expr::sum([
            Expr::product([Expr::num(re), Expr::num(y)]),
            Expr::product([Expr::num(im), Expr::num(x)]),
            Expr::num(shift_im),
        ]);
        (real, imaginary)
    };
    let (nr, ni) = affine(ar, ai, br, bi);
    let (mr, mi) = affine(cr, ci, dr, di);
    let modulus = Expr::sum([Expr::pow(mr.clone(), 2), Expr::pow(mi.clone(), 2)]);

    vec![
        Expr::div(
            Expr::sum([
                Expr::product([nr.clone(), mr.clone()]),
                Expr::product([ni.clone(), mi.clone()]),
            ]),
            modulus.clone(),
        ),
        Expr::div(
            Expr::sub(Expr::product([ni, mr]), Expr::product([nr, mi])),
            modulus,
        ),
    ]
}

fn squared_difference(x: &[f64], y: &[f64]) -> Expr {
    Expr::sum(
        x.iter()
            .zip(y)
            .map(|(a, b)| Expr::pow(Expr::sub(Expr::num(*a), Expr::num(*b)), 2)),
    )
}

/// `atanh(sqrt(c)·|⊖a ⊕ b|) / sqrt(c)` with
/// `|⊖a ⊕ b|² = |a - b|² / (1 - 2c<a,b> + c²|a|²|b|²)`.
fn poincare_distance(c: f64, a: &[f64], b: &[f64]) -> Expr {
    let x = Expr::sqrt(Expr::div(
        Expr::product([Expr::num(c), squared_difference(a, b)]),
        gyro_gap(c, a, b),
    ));
    Expr::div(Expr::call(Function::ArcTanh, x), sqrt_c(c))
}

/// `acosh((1 - c<u,v>) / sqrt((1 - c|u|²)(1 - c|v|²))) / (2 sqrt(c))`.
fn klein_distance(c: f64, u: &[f64], v: &[f64]) -> Expr {
    let cn = Expr::num(c);
    let gap = |x: &[f64]| Expr::sub(one(), Expr::product([cn.clone(), Expr::squared_norm(x)]));
    let argument = Expr::div(
        Expr::sub(one(), Expr::product([cn.clone(), Expr::dot(u, v)])),
        Expr::sqrt(Expr::product([gap(u), gap(v)])),
    );
    Expr::div(
        Expr::call(Function::ArcCosh, argument),
        Expr::product([Expr::num(2.0), sqrt_c(c)]),
    )
}

/// `asinh(sqrt(c)·s/2) / sqrt(c)` with the Minkowski chord
/// `s² = Σ(xi - yi)² - (x0 - y0)²`.
fn hyperboloid_distance(c: f64, x: &[f64], y: &[f64]) -> Expr {
    let chord = Expr::sqrt(Expr::sub(
        squared_difference(&x[1..], &y[1..]),
        Expr::pow(Expr::sub(Expr::num(x[0]), Expr::num(y[0])), 2),
    ));
    Expr::div(
        Expr::call(
            Function::ArcSinh,
            Expr::div(Expr::product([sqrt_c(c), chord]), Expr::num(2.0)),
        ),
        sqrt_c(c),
    )
}

fn to_klein(c: f64, model: Model, x: &[f64]) -> Vec<Expr> {
    match model {
        Model::Klein => literals(x),
        Model::Poincare => {
            let denominator =
                Expr::sum([one(), Expr::product([Expr::num(c), Expr::squared_norm(x)])]);
            x.iter()
                .map(|xi| Expr::div(Expr::num(2.0 * xi), denominator.clone()))
                .collect()
        }
        Model::Hyperboloid => {
            let denominator = Expr::product([sqrt_c(c), Expr::num(x[0])]);
            x[1..]
                .iter()
                .map(|xi| Expr::div(Expr::num(*xi), denominator.clone()))
                .collect()
        }
    }
}

fn to_poincare(c: f64, model: Model, x: &[f64]) -> Vec<Expr> {
    let denominator = match model {
        Model::Poincare => return literals(x),
        Model::Klein => Expr::sum([
            one(),
            Expr::sqrt(Expr::sub(
                one(),
                Expr::product([Expr::num(c), Expr::squared_norm(x)]),
            )),
        ]),
        Model::Hyperboloid => Expr::sum([one(), Expr::product([sqrt_c(c), Expr::num(x[0])])]),
    };
    let spatial = if model == Model::Hyperboloid { &x[1..] } else { x };
    spatial
        .iter()
        .map(|xi| Expr::div(Expr::num(*xi), denominator.clone()))
        .collect()
}

fn to_hyperboloid(c: f64, model: Model, x: &[f64]) -> Vec<Expr> {
    let gap = Expr::sub(one(), Expr::product([Expr::num(c), Expr::squared_norm(x)]));
    match model {
        Model::Hyperboloid => literals(x),
        Model::Poincare => {
            let mut components = vec![Expr::div(
                Expr::sum([one(), Expr::product([Expr::num(c), Expr::squared_norm(x)])]),
                Expr::product([sqrt_c(c), gap.clone()]),
            )];
            components.extend(
                x.iter()
                    .map(|xi| Expr::div(Expr::num(2.0 * xi), gap.clone())),
            );
            components
        }
        Model::Klein => {
            let root = Expr::sqrt(gap);
            let mut components = vec![Expr::div(one(), Expr::product([sqrt_c(c), root.clone()]))];
            components.extend(x.iter().map(|xi| Expr::div(Expr::num(*xi), root.clone())));
            components
        }
    }
}
