use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::error::BuildError;
use crate::linspace::Linspace;
use crate::membership::Triangle;

/// A named numeric universe described by a closed set of labeled terms.
///
/// Built once through [`LinguisticVariable::builder`] and never mutated
/// afterwards, so it can be shared freely between threads.
#[derive(Clone, Debug)]
pub struct LinguisticVariable {
    name: String,
    min_u: f64,
    max_u: f64,
    step: f64,
    // Declaration order is kept so term indices are stable
    terms: Vec<(String, Triangle)>,
}

impl LinguisticVariable {
    /// If the step value is not provided, it defaults to 1.0
    pub fn builder(name: impl Into<String>, universe_range: RangeInclusive<f64>) -> LinguisticVariableBuilder {
        LinguisticVariableBuilder {
            name: name.into(),
            universe_range,
            step: 1.,
            terms: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> RangeInclusive<f64> {
        self.min_u..=self.max_u
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().map(|(label, _)| label.as_str())
    }

    pub fn term(&self, label: &str) -> Option<&Triangle> {
        self.terms.iter().find(|(l, _)| l == label).map(|(_, tri)| tri)
    }

    pub(crate) fn term_index(&self, label: &str) -> Option<usize> {
        self.terms.iter().position(|(l, _)| l == label)
    }

    pub(crate) fn term_at(&self, index: usize) -> &Triangle {
        &self.terms[index].1
    }

    /// Sampled points of the universe, `min..=max` spaced by the step.
    pub fn universe(&self) -> Linspace {
        Linspace::with_step(self.min_u, self.max_u, self.step)
    }

    /// Degrees per label, in declaration order.
    ///
    /// Values outside the universe are evaluated like any other value.
    pub fn degrees(&self, value: f64) -> Vec<f64> {
        self.terms.iter().map(|(_, tri)| tri.evaluate(value)).collect()
    }

    /// Fuzzifies `value` into one entry per declared label, zeros included.
    pub fn fuzzify(&self, value: f64) -> HashMap<String, f64> {
        self.terms
            .iter()
            .map(|(label, tri)| (label.clone(), tri.evaluate(value)))
            .collect()
    }
}

pub struct LinguisticVariableBuilder {
    name: String,
    universe_range: RangeInclusive<f64>,
    step: f64,
    terms: Vec<(String, Triangle)>,
}

impl LinguisticVariableBuilder {
    pub fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn term(mut self, label: impl Into<String>, shape: Triangle) -> Self {
        self.terms.push((label.into(), shape));
        self
    }

    pub fn build(self) -> Result<LinguisticVariable, BuildError> {
        let min_u = *self.universe_range.start();
        let max_u = *self.universe_range.end();
        let valid_universe = min_u.is_finite() && max_u.is_finite() && min_u <= max_u;

        if !valid_universe || !self.step.is_finite() || self.step <= 0. {
            return Err(BuildError::InvalidUniverse {
                variable: self.name,
                min: min_u,
                max: max_u,
                step: self.step,
            });
        }

        if self.terms.is_empty() {
            return Err(BuildError::EmptyVariable { variable: self.name });
        }

        for (i, (label, _)) in self.terms.iter().enumerate() {
            if self.terms[..i].iter().any(|(seen, _)| seen == label) {
                return Err(BuildError::DuplicateTerm {
                    variable: self.name,
                    label: label.clone(),
                });
            }
        }

        Ok(LinguisticVariable {
            name: self.name,
            min_u,
            max_u,
            step: self.step,
            terms: self.terms,
        })
    }
}

#[cfg(test)]
fn battery() -> LinguisticVariable {
    LinguisticVariable::builder("battery", 0. ..=100.)
        .term("low", Triangle::new(0., 0., 30.).unwrap())
        .term("medium", Triangle::new(20., 50., 80.).unwrap())
        .term("high", Triangle::new(70., 100., 100.).unwrap())
        .build()
        .unwrap()
}

#[test]
fn test_fuzzify_has_every_label() {
    let var = battery();
    let degrees = var.fuzzify(25.);

    assert_eq!(degrees.len(), 3);
    assert!((degrees["low"] - 5. / 30.).abs() < 1e-12);
    assert!((degrees["medium"] - 5. / 30.).abs() < 1e-12);
    assert_eq!(degrees["high"], 0.);
    assert_eq!(var.labels().collect::<Vec<_>>(), ["low", "medium", "high"]);
}

#[test]
fn test_fuzzify_out_of_universe() {
    let var = battery();

    assert_eq!(var.degrees(150.), vec![0., 0., 0.]);
    assert_eq!(var.degrees(-10.), vec![0., 0., 0.]);
}

#[test]
fn test_universe_sampling() {
    let var = battery();
    let universe: Vec<f64> = var.universe().collect();

    assert_eq!(universe.len(), 101);
    assert_eq!(universe.last(), Some(&100.));
}

#[test]
fn test_builder_rejects_duplicates_and_bad_universe() {
    let tri = Triangle::new(0., 1., 2.).unwrap();
    let dup = LinguisticVariable::builder("x", 0. ..=2.)
        .term("a", tri)
        .term("a", tri)
        .build();

    assert_eq!(
        dup.unwrap_err(),
        BuildError::DuplicateTerm {
            variable: "x".into(),
            label: "a".into()
        }
    );

    let empty = LinguisticVariable::builder("x", 0. ..=2.).build();
    assert_eq!(empty.unwrap_err(), BuildError::EmptyVariable { variable: "x".into() });

    let step = LinguisticVariable::builder("x", 0. ..=2.).step(0.).term("a", tri).build();
    assert!(matches!(step, Err(BuildError::InvalidUniverse { .. })));

    let inverted = LinguisticVariable::builder("x", 2. ..=0.).term("a", tri).build();
    assert!(matches!(inverted, Err(BuildError::InvalidUniverse { .. })));
}
