use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use slotmap::SecondaryMap;
use tracing::trace;

use crate::config::EngineConfig;
use crate::error::InferenceError;
use crate::inputs::Inputs;
use crate::outputs::Outputs;
use crate::rule_base::{RuleBase, TermRef, VariableKey};
use crate::variable::LinguisticVariable;

/// Degrees of one input variable, in label declaration order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FuzzifiedInput {
    pub variable: String,
    pub degrees: Vec<(String, f64)>,
}

/// Intermediate values of one inference call, for diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trace {
    pub fuzzified: Vec<FuzzifiedInput>,
    /// Firing strength of each rule, in rule base order, before weighting
    pub rule_strengths: Vec<f64>,
}

/// Stateless Mamdani inference over a shared [`RuleBase`].
///
/// Every call owns its working buffers, so one engine (or clones of it) may
/// serve any number of threads at once.
#[derive(Clone, Debug)]
pub struct InferenceEngine {
    rule_base: Arc<RuleBase>,
    config: EngineConfig,
}

impl InferenceEngine {
    pub fn new(rule_base: impl Into<Arc<RuleBase>>) -> Self {
        Self::with_config(rule_base, EngineConfig::default())
    }

    pub fn with_config(rule_base: impl Into<Arc<RuleBase>>, config: EngineConfig) -> Self {
        Self {
            rule_base: rule_base.into(),
            config,
        }
    }

    pub fn rule_base(&self) -> &RuleBase {
        &self.rule_base
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn infer(&self, inputs: &Inputs) -> Result<Outputs, InferenceError> {
        let (outputs, _) = self.eval(inputs)?;

        Ok(outputs)
    }

    /// Like [`infer`](Self::infer), also returning the fuzzified inputs and
    /// every rule's firing strength.
    pub fn infer_traced(&self, inputs: &Inputs) -> Result<(Outputs, Trace), InferenceError> {
        let (outputs, (fact_values, rule_strengths)) = self.eval(inputs)?;
        let rb = &self.rule_base;

        let fuzzified = rb
            .input_keys()
            .iter()
            .map(|key| {
                let var = rb.variable(*key);

                FuzzifiedInput {
                    variable: var.name().to_string(),
                    degrees: var.labels().map(str::to_string).zip(fact_values[*key].iter().copied()).collect(),
                }
            })
            .collect();

        Ok((
            outputs,
            Trace {
                fuzzified,
                rule_strengths,
            },
        ))
    }

    /// Fuzzifies every input variable, keyed by variable then label.
    ///
    /// Feeds [`Rule::strength`](crate::Rule::strength) with the same degrees
    /// the engine uses internally.
    pub fn fuzzify(&self, inputs: &Inputs) -> Result<HashMap<String, HashMap<String, f64>>, InferenceError> {
        let rb = &self.rule_base;

        rb.input_keys()
            .iter()
            .map(|key| {
                let var = rb.variable(*key);
                let value = crisp_value(var, inputs)?;

                Ok((var.name().to_string(), var.fuzzify(value)))
            })
            .collect()
    }

    #[allow(clippy::type_complexity)]
    fn eval(&self, inputs: &Inputs) -> Result<(Outputs, (SecondaryMap<VariableKey, Vec<f64>>, Vec<f64>)), InferenceError> {
        let rb = &self.rule_base;

        // Fuzzificate Facts
        let mut fact_values = SecondaryMap::with_capacity(rb.input_keys().len());

        for key in rb.input_keys() {
            let var = rb.variable(*key);
            let value = crisp_value(var, inputs)?;

            fact_values.insert(*key, var.degrees(value));
        }

        // Compute Rule Firing Strengths
        let degree = |t: &TermRef| fact_values[t.var][t.term];
        let rule_strengths: Vec<f64> = rb
            .compiled()
            .iter()
            .map(|rule| rule.premise.eval(self.config.and_op, self.config.or_op, &degree))
            .collect();

        for (i, strength) in rule_strengths.iter().enumerate() {
            trace!(rule = i, strength, "rule fired");
        }

        // Implicate, Aggregate and Defuzzificate per output
        let mut defuzzificated = HashMap::with_capacity(rb.output_keys().len());

        for key in rb.output_keys() {
            let var = rb.variable(*key);
            let universe: Vec<f64> = var.universe().collect();
            let mut aggregated = vec![0.; universe.len()];

            for (rule, strength) in rb.compiled().iter().zip(&rule_strengths) {
                for consequence in rule.consequences.iter().filter(|c| c.target.var == *key) {
                    let level = strength * consequence.weight;

                    if level <= 0. {
                        continue;
                    }

                    let term = var.term_at(consequence.target.term);
                    let membership = universe.iter().map(|x| term.evaluate(*x));

                    self.config
                        .aggregation
                        .accumulate(&mut aggregated, self.config.implication.call(level, membership));
                }
            }

            let value = self
                .config
                .defuzzification
                .call(&universe, &aggregated)
                .ok_or_else(|| InferenceError::NoRuleFired {
                    variable: var.name().to_string(),
                })?;

            trace!(output = var.name(), value, "defuzzificated");
            defuzzificated.insert(var.name().to_string(), value);
        }

        Ok((Outputs::new(defuzzificated), (fact_values, rule_strengths)))
    }
}

fn crisp_value(var: &LinguisticVariable, inputs: &Inputs) -> Result<f64, InferenceError> {
    let value = inputs.get(var.name()).ok_or_else(|| InferenceError::MissingInput {
        variable: var.name().to_string(),
    })?;

    if !value.is_finite() {
        return Err(InferenceError::NonFiniteInput {
            variable: var.name().to_string(),
            value,
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::is;
    use crate::membership::Triangle;
    use crate::ops::DefuzzificationOp;
    use crate::ops::{AndOp, OrOp};
    use crate::rules::Rule;

    fn x() -> LinguisticVariable {
        LinguisticVariable::builder("x", 0. ..=10.)
            .term("low", Triangle::new(0., 0., 10.).unwrap())
            .term("high", Triangle::new(0., 10., 10.).unwrap())
            .build()
            .unwrap()
    }

    // samples at 0..=4: lo [1, .5, 0, 0, 0], mid [0, .5, 1, .5, 0], hi [0, 0, 0, .5, 1]
    fn y() -> LinguisticVariable {
        LinguisticVariable::builder("y", 0. ..=4.)
            .term("lo", Triangle::new(0., 0., 2.).unwrap())
            .term("mid", Triangle::new(0., 2., 4.).unwrap())
            .term("hi", Triangle::new(2., 4., 4.).unwrap())
            .build()
            .unwrap()
    }

    fn engine(rules: Vec<Rule>) -> InferenceEngine {
        InferenceEngine::new(RuleBase::builder().input(x()).output(y()).rules(rules).build().unwrap())
    }

    #[test]
    fn test_single_rule_clipped_centroid() {
        let engine = engine(vec![Rule::new(is("x", "high")).then("y", "mid")]);
        let outputs = engine.infer(&Inputs::new().with("x", 5.)).unwrap();

        // [0, .5, .5, .5, 0]
        assert_eq!(outputs.get("y"), Some(2.));
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn test_aggregates_labels_of_same_output() {
        let engine = engine(vec![
            Rule::new(is("x", "low")).then("y", "lo"),
            Rule::new(is("x", "high")).then("y", "hi"),
        ]);
        let (outputs, trace) = engine.infer_traced(&Inputs::new().with("x", 2.5)).unwrap();

        // [.75, .5, 0, .25, .25] -> 2.25 / 1.75
        let y = outputs.get("y").unwrap();
        assert!((y - 9. / 7.).abs() < 1e-12);
        assert_eq!(trace.rule_strengths, vec![0.75, 0.25]);
        assert_eq!(trace.fuzzified[0].variable, "x");
        assert_eq!(
            trace.fuzzified[0].degrees,
            vec![("low".to_string(), 0.75), ("high".to_string(), 0.25)]
        );
    }

    #[test]
    fn test_weight_scales_before_clipping() {
        let engine = engine(vec![Rule::new(is("x", "high")).then("y", "mid").with_weight(0.5)]);
        let (outputs, trace) = engine.infer_traced(&Inputs::new().with("x", 10.)).unwrap();

        assert_eq!(outputs.get("y"), Some(2.));
        assert_eq!(trace.rule_strengths, vec![1.]);
    }

    #[test]
    fn test_no_rule_fired() {
        let engine = engine(vec![Rule::new(is("x", "high")).then("y", "mid")]);

        assert_eq!(
            engine.infer(&Inputs::new().with("x", 0.)),
            Err(InferenceError::NoRuleFired { variable: "y".into() })
        );
        // outside the universe is not an error in itself
        assert_eq!(
            engine.infer(&Inputs::new().with("x", -3.)),
            Err(InferenceError::NoRuleFired { variable: "y".into() })
        );
    }

    #[test]
    fn test_bad_inputs() {
        let engine = engine(vec![Rule::new(is("x", "high")).then("y", "mid")]);

        assert_eq!(
            engine.infer(&Inputs::new().with("z", 1.)),
            Err(InferenceError::MissingInput { variable: "x".into() })
        );
        assert!(matches!(
            engine.infer(&Inputs::new().with("x", f64::NAN)),
            Err(InferenceError::NonFiniteInput { .. })
        ));
    }

    #[test]
    fn test_rule_strength_matches_engine() {
        let rules = vec![
            Rule::new(is("x", "low").and(is("x", "high"))).then("y", "lo"),
            Rule::new(is("x", "low").or(is("x", "high").not())).then("y", "hi"),
        ];

        for (and_op, or_op) in [(AndOp::Min, OrOp::Max), (AndOp::Prod, OrOp::ProbOr)] {
            let config = EngineConfig {
                and_op,
                or_op,
                ..EngineConfig::default()
            };
            let rb = RuleBase::builder().input(x()).output(y()).rules(rules.clone()).build().unwrap();
            let engine = InferenceEngine::with_config(rb, config);

            for i in 0..=10 {
                let inputs = Inputs::new().with("x", i as f64);
                let fuzzified = engine.fuzzify(&inputs).unwrap();
                let (_, trace) = engine.infer_traced(&inputs).unwrap();
                let by_name: Vec<f64> = engine
                    .rule_base()
                    .rules()
                    .iter()
                    .map(|rule| rule.strength(&fuzzified, and_op, or_op).unwrap())
                    .collect();

                assert_eq!(by_name, trace.rule_strengths);
            }
        }
    }

    #[test]
    fn test_fuzzify_rejects_bad_inputs() {
        let engine = engine(vec![Rule::new(is("x", "high")).then("y", "mid")]);

        assert_eq!(
            engine.fuzzify(&Inputs::new()),
            Err(InferenceError::MissingInput { variable: "x".into() })
        );
        assert_eq!(
            engine.fuzzify(&Inputs::new().with("x", 2.5)).unwrap()["x"],
            HashMap::from([("low".to_string(), 0.75), ("high".to_string(), 0.25)])
        );
    }

    #[test]
    fn test_alternative_defuzzification() {
        let rb = RuleBase::builder()
            .input(x())
            .output(y())
            .rule(Rule::new(is("x", "high")).then("y", "mid"))
            .build()
            .unwrap();
        let config = EngineConfig {
            defuzzification: DefuzzificationOp::Som,
            ..EngineConfig::default()
        };
        let engine = InferenceEngine::with_config(rb, config);

        // plateau of [0, .5, .5, .5, 0] starts at 1
        assert_eq!(engine.infer(&Inputs::new().with("x", 5.)).unwrap().get("y"), Some(1.));
    }

    #[test]
    fn test_shared_across_threads() {
        let engine = engine(vec![
            Rule::new(is("x", "low")).then("y", "lo"),
            Rule::new(is("x", "high")).then("y", "hi"),
        ]);
        let expected: Vec<_> = (0..=10)
            .map(|i| engine.infer(&Inputs::new().with("x", i as f64)).unwrap().get("y"))
            .collect();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let got: Vec<_> = (0..=10)
                        .map(|i| engine.infer(&Inputs::new().with("x", i as f64)).unwrap().get("y"))
                        .collect();

                    assert_eq!(got, expected);
                });
            }
        });
    }
}
