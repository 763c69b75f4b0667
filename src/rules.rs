use std::collections::HashMap;

use crate::dsl::{Expr, Proposition};
use crate::error::InferenceError;
use crate::ops::{AndOp, OrOp};

/// One `output IS label` assignment produced by a rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Consequence {
    pub variable: String,
    pub label: String,
    /// Multiplies the rule's firing strength before implication
    pub weight: f64,
}

/// `IF premise THEN consequences`, referenced by variable and label name.
///
/// Nothing is checked here; a [`RuleBase`](crate::RuleBase) validates every
/// reference when it is built.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    premise: Expr<Proposition>,
    consequences: Vec<Consequence>,
}

impl Rule {
    pub fn new(premise: Expr<Proposition>) -> Self {
        Rule {
            premise,
            consequences: Vec::new(),
        }
    }

    pub fn then(mut self, variable: impl Into<String>, label: impl Into<String>) -> Self {
        self.consequences.push(Consequence {
            variable: variable.into(),
            label: label.into(),
            weight: 1.,
        });
        self
    }

    /// Sets the weight of every consequence added so far.
    pub fn with_weight(mut self, weight: f64) -> Self {
        for consequence in &mut self.consequences {
            consequence.weight = weight;
        }
        self
    }

    pub fn premise(&self) -> &Expr<Proposition> {
        &self.premise
    }

    pub fn consequences(&self) -> &[Consequence] {
        &self.consequences
    }

    /// Firing strength under the given connectives, from fuzzified inputs
    /// keyed by variable then label.
    ///
    /// A variable or label absent from `fuzzified` is an error, never a
    /// silent degree of 0.
    pub fn strength(
        &self,
        fuzzified: &HashMap<String, HashMap<String, f64>>,
        and_op: AndOp,
        or_op: OrOp,
    ) -> Result<f64, InferenceError> {
        for prop in self.premise.propositions() {
            let labels = fuzzified.get(&prop.variable).ok_or_else(|| InferenceError::MissingInput {
                variable: prop.variable.clone(),
            })?;

            if !labels.contains_key(&prop.label) {
                return Err(InferenceError::UnknownLabel {
                    variable: prop.variable.clone(),
                    label: prop.label.clone(),
                });
            }
        }

        // every leaf was checked above
        let degree = |prop: &Proposition| fuzzified[&prop.variable][&prop.label];

        Ok(self.premise.eval(and_op, or_op, &degree))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Rules(pub(crate) Vec<Rule>);

impl Rules {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn add(&mut self, rule: Rule) {
        self.0.push(rule);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.0.iter()
    }
}

#[test]
fn test_rule_strength() {
    use crate::dsl::is;

    let rule = Rule::new(is("battery", "medium").and(is("distance", "long"))).then("charge_time", "long");
    let mut fuzzified = HashMap::new();
    fuzzified.insert(
        "battery".to_string(),
        HashMap::from([("medium".to_string(), 0.6), ("low".to_string(), 0.2)]),
    );
    fuzzified.insert("distance".to_string(), HashMap::from([("long".to_string(), 0.4)]));

    assert_eq!(rule.strength(&fuzzified, AndOp::Min, OrOp::Max), Ok(0.4));
    assert_eq!(rule.strength(&fuzzified, AndOp::Prod, OrOp::Max), Ok(0.6 * 0.4));

    let negated = Rule::new(is("distance", "long").not()).then("charge_time", "short");
    assert_eq!(negated.strength(&fuzzified, AndOp::Min, OrOp::Max), Ok(0.6));
}

#[test]
fn test_rule_strength_missing_variable() {
    use crate::dsl::is;

    let rule = Rule::new(is("urgency", "high")).then("priority", "high");

    assert_eq!(
        rule.strength(&HashMap::new(), AndOp::Min, OrOp::Max),
        Err(InferenceError::MissingInput {
            variable: "urgency".into()
        })
    );
}

#[test]
fn test_rule_strength_unknown_label_is_not_zero() {
    use crate::dsl::is;

    let rule = Rule::new(is("battery", "hgih").or(is("battery", "low"))).then("priority", "low");
    let fuzzified = HashMap::from([(
        "battery".to_string(),
        HashMap::from([("low".to_string(), 0.7), ("high".to_string(), 0.)]),
    )]);

    assert_eq!(
        rule.strength(&fuzzified, AndOp::Min, OrOp::Max),
        Err(InferenceError::UnknownLabel {
            variable: "battery".into(),
            label: "hgih".into()
        })
    );
}

#[test]
fn test_consequences_carry_weight() {
    use crate::dsl::is;

    let rule = Rule::new(is("battery", "low"))
        .then("charge_time", "long")
        .then("priority", "high")
        .with_weight(0.5);

    let weights: Vec<_> = rule.consequences().iter().map(|c| (c.variable.as_str(), c.weight)).collect();
    assert_eq!(weights, [("charge_time", 0.5), ("priority", 0.5)]);
}
