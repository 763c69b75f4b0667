use std::iter::Sum;

use num::Float;
use serde::{Deserialize, Serialize};

use crate::math::interp;

/// And operator method for combining the propositions of a rule premise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AndOp {
    #[default]
    Min,
    Prod,
    BoundedProd,
    DrasticProd,
}

impl AndOp {
    pub fn apply<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Min => F::min(u, v),
            Self::Prod => u * v,
            Self::BoundedProd => F::max(F::zero(), u + v - F::one()),
            Self::DrasticProd => {
                if u == F::one() {
                    v
                } else if v == F::one() {
                    u
                } else {
                    F::zero()
                }
            },
        }
    }
}

/// Or operator method for combining the propositions of a rule premise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrOp {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
    DrasticSum,
}

impl OrOp {
    pub fn apply<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Max => F::max(u, v),
            Self::ProbOr => u + v - u * v,
            Self::BoundedSum => F::min(F::one(), u + v),
            Self::DrasticSum => {
                if u == F::zero() {
                    v
                } else if v == F::zero() {
                    u
                } else {
                    F::one()
                }
            },
        }
    }
}

/// How a rule's firing strength shapes its consequence term.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicationOp {
    /// Mamdani: `min(strength, membership)`
    #[default]
    Clip,
    /// Larsen: `strength * membership`
    Scale,
}

impl ImplicationOp {
    pub fn call<F: Float>(self, strength: F, membership: impl IntoIterator<Item = F>) -> impl Iterator<Item = F> {
        membership.into_iter().map(move |m| match self {
            Self::Clip => F::min(strength, m),
            Self::Scale => strength * m,
        })
    }
}

/// Method for accumulating the implied consequences of all rules that
/// target the same output variable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationOp {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
}

impl AggregationOp {
    /// Folds `curve` into `acc` pointwise.
    pub fn accumulate<F: Float>(self, acc: &mut [F], curve: impl IntoIterator<Item = F>) {
        let op = match self {
            Self::Max => OrOp::Max,
            Self::ProbOr => OrOp::ProbOr,
            Self::BoundedSum => OrOp::BoundedSum,
        };

        for (a, c) in acc.iter_mut().zip(curve) {
            *a = op.apply(*a, c);
        }
    }
}

/// Method for defuzzificating the aggregated membership function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefuzzificationOp {
    /// Center of area over the sampled points: `sum(x * mu) / sum(mu)`
    #[default]
    Centroid,
    /// Bisector of area
    Bisector,
    /// Mean of the values for which the membership function is maximum
    Mom,
    /// Largest value for which the membership function is maximum
    Lom,
    /// Smallest value for which the membership function is maximum
    Som,
}

impl DefuzzificationOp {
    /// Returns `None` when the membership is identically zero, since no
    /// crisp value is meaningful then.
    pub fn call<F: Float + Sum>(self, universe: &[F], membership: &[F]) -> Option<F> {
        debug_assert_eq!(universe.len(), membership.len());

        let total = membership.iter().copied().sum::<F>();

        if universe.is_empty() || total <= F::zero() {
            return None;
        }

        let value = match self {
            Self::Centroid => {
                let num = universe
                    .iter()
                    .zip(membership)
                    .map(|(&x, &m)| x * m)
                    .sum::<F>();

                num / total
            },
            Self::Bisector => {
                let n_areas = universe.len() - 1;

                if n_areas == 0 {
                    return Some(universe[0]);
                }

                let two = F::one() + F::one();
                let areas: Vec<F> = (0..n_areas)
                    .map(|i| (membership[i] + membership[i + 1]) * (universe[i + 1] - universe[i]) / two)
                    .collect();
                let target = areas.iter().copied().sum::<F>() / two;
                let mut cum_area = F::zero();
                let mut i_area = 0;

                for (i, area) in areas.iter().enumerate() {
                    cum_area = cum_area + *area;
                    i_area = i;
                    if cum_area >= target {
                        break;
                    }
                }

                let xp = [cum_area - areas[i_area], cum_area];
                let fp = [universe[i_area], universe[i_area + 1]];

                interp(Some(target), xp.into_iter().zip(fp)).pop()?
            },
            Self::Mom | Self::Lom | Self::Som => {
                let maximum = membership.iter().copied().fold(F::zero(), F::max);
                let peaks = universe
                    .iter()
                    .zip(membership)
                    .filter_map(|(&u, &m)| if m == maximum { Some(u) } else { None });

                match self {
                    Self::Lom => peaks.fold(F::neg_infinity(), F::max),
                    Self::Som => peaks.fold(F::infinity(), F::min),
                    _ => {
                        let (len, sum) = peaks.fold((0usize, F::zero()), |(n, acc), u| (n + 1, acc + u));

                        sum / F::from(len)?
                    },
                }
            },
        };

        Some(value)
    }
}

#[test]
fn test_and_or_ops() {
    assert_eq!(AndOp::Min.apply(0.2, 0.7), 0.2);
    assert_eq!(AndOp::Prod.apply(0.5, 0.5), 0.25);
    assert_eq!(AndOp::BoundedProd.apply(0.5, 0.25), 0.);
    assert_eq!(AndOp::DrasticProd.apply(1., 0.3), 0.3);
    assert_eq!(AndOp::DrasticProd.apply(0.9, 0.3), 0.);

    assert_eq!(OrOp::Max.apply(0.2, 0.7), 0.7);
    assert_eq!(OrOp::ProbOr.apply(0.5, 0.5), 0.75);
    assert_eq!(OrOp::BoundedSum.apply(0.5, 0.75), 1.);
    assert_eq!(OrOp::DrasticSum.apply(0., 0.3), 0.3);
    assert_eq!(OrOp::DrasticSum.apply(0.1, 0.3), 1.);
}

#[test]
fn test_implication_and_aggregation() {
    let clipped: Vec<f64> = ImplicationOp::Clip.call(0.5, [0., 0.25, 1., 0.5]).collect();
    assert_eq!(clipped, vec![0., 0.25, 0.5, 0.5]);

    let scaled: Vec<f64> = ImplicationOp::Scale.call(0.5, [0., 0.25, 1., 0.5]).collect();
    assert_eq!(scaled, vec![0., 0.125, 0.5, 0.25]);

    let mut acc = vec![0., 0.3, 0.1];
    AggregationOp::Max.accumulate(&mut acc, [0.2, 0.1, 0.1]);
    assert_eq!(acc, vec![0.2, 0.3, 0.1]);
}

#[test]
fn test_defuzzification() {
    let universe = [0., 1., 2., 3., 4.];
    let symmetric = [0., 0.5, 1., 0.5, 0.];

    assert_eq!(DefuzzificationOp::Centroid.call(&universe, &symmetric), Some(2.));
    assert_eq!(DefuzzificationOp::Bisector.call(&universe, &symmetric), Some(2.));
    assert_eq!(DefuzzificationOp::Mom.call(&universe, &symmetric), Some(2.));

    let plateau = [0., 1., 1., 0.5, 0.];
    assert_eq!(DefuzzificationOp::Som.call(&universe, &plateau), Some(1.));
    assert_eq!(DefuzzificationOp::Lom.call(&universe, &plateau), Some(2.));
    assert_eq!(DefuzzificationOp::Mom.call(&universe, &plateau), Some(1.5));

    // 0.25 at x=1, 0.75 at x=3
    let skewed = [0., 0.25, 0., 0.75, 0.];
    assert_eq!(DefuzzificationOp::Centroid.call(&universe, &skewed), Some(2.5));
}

#[test]
fn test_defuzzification_of_empty_membership() {
    let universe = [0., 1., 2.];

    assert_eq!(DefuzzificationOp::Centroid.call(&universe, &[0., 0., 0.]), None);
    assert_eq!(DefuzzificationOp::Bisector.call(&universe, &[0., 0., 0.]), None);
    assert_eq!(DefuzzificationOp::Som.call::<f64>(&[], &[]), None);
}
