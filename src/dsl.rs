use num::Float;

use crate::ops::{AndOp, OrOp};

/// A single `variable IS label` proposition, referenced by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Proposition {
    pub variable: String,
    pub label: String,
}

/// Antecedent expression tree. `P` is the leaf type: [`Proposition`] while a
/// rule is being written, a resolved key once the rule base has compiled it.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr<P> {
    Is(P),
    And(Vec<Expr<P>>),
    Or(Vec<Expr<P>>),
    Not(Box<Expr<P>>),
}

/// `variable IS label`
pub fn is(variable: impl Into<String>, label: impl Into<String>) -> Expr<Proposition> {
    Expr::Is(Proposition {
        variable: variable.into(),
        label: label.into(),
    })
}

impl<P> Expr<P> {
    pub fn or(self, rhs: Expr<P>) -> Self {
        Expr::Or(vec![self, rhs])
    }

    pub fn and(self, rhs: Expr<P>) -> Self {
        Expr::And(vec![self, rhs])
    }

    pub fn and2(self, rhs: Expr<P>, rhs2: Expr<P>) -> Self {
        Expr::And(vec![self, rhs, rhs2])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Leaves in left-to-right order.
    pub fn propositions(&self) -> Vec<&P> {
        let mut props = Vec::new();

        fn parse<'p, P>(expr: &'p Expr<P>, out: &mut Vec<&'p P>) {
            match expr {
                Expr::Is(prop) => out.push(prop),
                Expr::And(exprs) | Expr::Or(exprs) => {
                    for expr in exprs {
                        parse(expr, out);
                    }
                },
                Expr::Not(expr) => parse(expr, out),
            }
        }

        parse(self, &mut props);

        props
    }

    /// Rebuilds the tree with every leaf converted by `f`, stopping at the
    /// first failure.
    pub fn try_map<Q, E>(&self, f: &mut impl FnMut(&P) -> Result<Q, E>) -> Result<Expr<Q>, E> {
        Ok(match self {
            Expr::Is(prop) => Expr::Is(f(prop)?),
            Expr::And(exprs) => Expr::And(exprs.iter().map(|e| e.try_map(&mut *f)).collect::<Result<_, _>>()?),
            Expr::Or(exprs) => Expr::Or(exprs.iter().map(|e| e.try_map(&mut *f)).collect::<Result<_, _>>()?),
            Expr::Not(expr) => Expr::Not(Box::new(expr.try_map(&mut *f)?)),
        })
    }

    /// Degree to which the expression holds, given the degree of each leaf.
    ///
    /// An empty `And` holds fully and an empty `Or` not at all.
    pub fn eval<F: Float>(&self, and_op: AndOp, or_op: OrOp, degree: &impl Fn(&P) -> F) -> F {
        match self {
            Expr::Is(prop) => degree(prop),
            Expr::And(exprs) => exprs
                .iter()
                .map(|e| e.eval(and_op, or_op, degree))
                .fold(F::one(), |acc, d| and_op.apply(acc, d)),
            Expr::Or(exprs) => exprs
                .iter()
                .map(|e| e.eval(and_op, or_op, degree))
                .fold(F::zero(), |acc, d| or_op.apply(acc, d)),
            Expr::Not(expr) => F::one() - expr.eval(and_op, or_op, degree),
        }
    }
}

#[test]
fn test_propositions_order() {
    let expr = is("battery", "low").and(is("distance", "long").or(is("urgency", "high").not()));
    let props: Vec<_> = expr.propositions().into_iter().map(|p| p.variable.as_str()).collect();

    assert_eq!(props, ["battery", "distance", "urgency"]);
}

#[test]
fn test_eval_min_max_not() {
    let expr = is("a", "x").and(is("b", "x").or(is("c", "x").not()));
    let degree = |p: &Proposition| match p.variable.as_str() {
        "a" => 0.8,
        "b" => 0.3,
        _ => 0.4,
    };

    // min(0.8, max(0.3, 1 - 0.4))
    let got: f64 = expr.eval(AndOp::Min, OrOp::Max, &degree);
    assert!((got - 0.6).abs() < 1e-12);

    let got: f64 = expr.eval(AndOp::Prod, OrOp::ProbOr, &degree);
    // 0.8 * (0.3 + 0.6 - 0.18)
    assert!((got - 0.576).abs() < 1e-12);
}

#[test]
fn test_try_map_stops_on_error() {
    let expr = is("a", "x").and2(is("b", "y"), is("c", "z"));
    let mut seen = Vec::new();
    let mapped: Result<Expr<usize>, String> = expr.try_map(&mut |p: &Proposition| {
        seen.push(p.variable.clone());
        if p.variable == "b" {
            Err(p.label.clone())
        } else {
            Ok(seen.len())
        }
    });

    assert_eq!(mapped, Err("y".to_string()));
    assert_eq!(seen, ["a", "b"]);
}
