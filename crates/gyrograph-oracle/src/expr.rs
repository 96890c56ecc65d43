//! Expression trees sent to oracles.
//!
//! An [`Expr`] renders to Wolfram Language input (`ArcTanh[x]`, `Sqrt[x]`,
//! `a*b`, `(a)/(b)`) and evaluates in `f64` for the in-process reference
//! oracle. Inputs are embedded as numeric literals.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Function {
    Sqrt,
    Tanh,
    ArcTanh,
    ArcSinh,
    ArcCosh,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "Sqrt",
            Function::Tanh => "Tanh",
            Function::ArcTanh => "ArcTanh",
            Function::ArcSinh => "ArcSinh",
            Function::ArcCosh => "ArcCosh",
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Function::Sqrt => x.sqrt(),
            Function::Tanh => x.tanh(),
            Function::ArcTanh => x.atanh(),
            Function::ArcSinh => x.asinh(),
            Function::ArcCosh => x.acosh(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Num(f64),
    Sum(Vec<Expr>),
    Product(Vec<Expr>),
    Neg(Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, i32),
    Call(Function, Box<Expr>),
}

impl Expr {
    pub fn num(x: f64) -> Self {
        Expr::Num(x)
    }

    pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Sum(terms.into_iter().collect())
    }

    pub fn product(factors: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Product(factors.into_iter().collect())
    }

    pub fn sub(a: Expr, b: Expr) -> Self {
        Expr::Sum(vec![a, Expr::Neg(Box::new(b))])
    }

    pub fn div(numerator: Expr, denominator: Expr) -> Self {
        Expr::Div(Box::new(numerator), Box::new(denominator))
    }

    pub fn neg(e: Expr) -> Self {
        Expr::Neg(Box::new(e))
    }

    pub fn pow(base: Expr, exponent: i32) -> Self {
        Expr::Pow(Box::new(base), exponent)
    }

    pub fn call(function: Function, argument: Expr) -> Self {
        Expr::Call(function, Box::new(argument))
    }

    pub fn sqrt(argument: Expr) -> Self {
        Self::call(Function::Sqrt, argument)
    }

    /// `Σ xi·yi` over literal coordinates.
    pub fn dot(x: &[f64], y: &[f64]) -> Self {
        Expr::sum(
            x.iter()
                .zip(y)
                .map(|(a, b)| Expr::product([Expr::num(*a), Expr::num(*b)])),
        )
    }

    /// `Σ xi²` over literal coordinates.
    pub fn squared_norm(x: &[f64]) -> Self {
        Expr::sum(x.iter().map(|a| Expr::pow(Expr::num(*a), 2)))
    }

    /// Numeric value in `f64`. Non-finite intermediate values propagate.
    pub fn eval(&self) -> f64 {
        match self {
            Expr::Num(x) => *x,
            Expr::Sum(terms) => terms.iter().map(Expr::eval).sum(),
            Expr::Product(factors) => factors.iter().map(Expr::eval).product(),
            Expr::Neg(e) => -e.eval(),
            Expr::Div(a, b) => a.eval() / b.eval(),
            Expr::Pow(base, exponent) => base.eval().powi(*exponent),
            Expr::Call(function, argument) => function.apply(argument.eval()),
        }
    }

    /// Wolfram Language rendering.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// Literal in a form Wolfram parses: plain decimals in the usual range,
/// `m*10^e` outside it.
fn write_number(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    let magnitude = x.abs();
    let body = if x == 0.0 {
        "0".to_string()
    } else if (1e-6..1e16).contains(&magnitude) {
        format!("{magnitude}")
    } else {
        format!("{magnitude:e}").replace('e', "*10^")
    };
    if x.is_sign_negative() && x != 0.0 {
        write!(f, "(-{body})")
    } else if body.contains('^') {
        write!(f, "({body})")
    } else {
        f.write_str(&body)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Expr], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(x) => write_number(f, *x),
            Expr::Sum(terms) if terms.is_empty() => f.write_str("0"),
            Expr::Sum(terms) => {
                f.write_str("(")?;
                write_joined(f, terms, " + ")?;
                f.write_str(")")
            }
            Expr::Product(factors) if factors.is_empty() => f.write_str("1"),
            Expr::Product(factors) => write_joined(f, factors, "*"),
            Expr::Neg(e) => write!(f, "(-{e})"),
            Expr::Div(a, b) => write!(f, "({a})/({b})"),
            Expr::Pow(base, exponent) if *exponent < 0 => write!(f, "({base})^({exponent})"),
            Expr::Pow(base, exponent) => write!(f, "({base})^{exponent}"),
            Expr::Call(function, argument) => write!(f, "{}[{argument}]", function.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_wolfram_syntax() {
        let e = Expr::div(
            Expr::call(Function::ArcTanh, Expr::num(0.5)),
            Expr::sqrt(Expr::num(2.0)),
        );
        assert_eq!(e.render(), "(ArcTanh[0.5])/(Sqrt[2])");

        let s = Expr::sub(Expr::num(1.0), Expr::product([Expr::num(2.0), Expr::num(-0.25)]));
        assert_eq!(s.render(), "(1 + (-2*(-0.25)))");
    }

    #[test]
    fn test_render_numbers() {
        assert_eq!(Expr::num(0.0).render(), "0");
        assert_eq!(Expr::num(1e-20).render(), "(1*10^-20)");
        assert_eq!(Expr::num(-1.5e300).render(), "(-1.5*10^300)");
        assert_eq!(Expr::pow(Expr::num(0.3), 2).render(), "(0.3)^2");
        assert_eq!(Expr::pow(Expr::num(3.0), -1).render(), "(3)^(-1)");
    }

    #[test]
    fn test_eval() {
        let e = Expr::div(
            Expr::call(Function::ArcTanh, Expr::num(0.5)),
            Expr::sqrt(Expr::num(4.0)),
        );
        assert!((e.eval() - 0.5f64.atanh() / 2.0).abs() < 1e-16);

        assert_eq!(Expr::dot(&[1.0, 2.0], &[3.0, 4.0]).eval(), 11.0);
        assert_eq!(Expr::squared_norm(&[3.0, 4.0]).eval(), 25.0);
        assert_eq!(Expr::sum([]).eval(), 0.0);
        assert_eq!(Expr::product([]).eval(), 1.0);
    }
}
