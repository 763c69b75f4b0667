use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::dsl::{Expr, Proposition};
use crate::error::BuildError;
use crate::rules::{Rule, Rules};
use crate::variable::LinguisticVariable;

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// A proposition resolved against the registry: variable key plus term index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TermRef {
    pub(crate) var: VariableKey,
    pub(crate) term: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct CompiledConsequence {
    pub(crate) target: TermRef,
    pub(crate) weight: f64,
}

#[derive(Clone, Debug)]
pub(crate) struct CompiledRule {
    pub(crate) premise: Expr<TermRef>,
    pub(crate) consequences: Vec<CompiledConsequence>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Input,
    Output,
}

/// Validated, immutable set of input variables, output variables and rules.
///
/// Every `(variable, label)` pair a rule mentions has been resolved by the
/// time a `RuleBase` exists, so inference never meets an unknown name.
#[derive(Clone, Debug)]
pub struct RuleBase {
    variables: SlotMap<VariableKey, LinguisticVariable>,
    by_name: HashMap<String, (VariableKey, Role)>,
    inputs: Vec<VariableKey>,
    outputs: Vec<VariableKey>,
    rules: Rules,
    compiled: Vec<CompiledRule>,
}

impl RuleBase {
    pub fn builder() -> RuleBaseBuilder {
        RuleBaseBuilder::default()
    }

    /// Input variables in registration order.
    pub fn inputs(&self) -> impl Iterator<Item = &LinguisticVariable> + '_ {
        self.inputs.iter().map(|key| &self.variables[*key])
    }

    /// Output variables in registration order.
    pub fn outputs(&self) -> impl Iterator<Item = &LinguisticVariable> + '_ {
        self.outputs.iter().map(|key| &self.variables[*key])
    }

    pub fn input(&self, name: &str) -> Option<&LinguisticVariable> {
        self.lookup(name, Role::Input)
    }

    pub fn output(&self, name: &str) -> Option<&LinguisticVariable> {
        self.lookup(name, Role::Output)
    }

    /// Rules in the order they were added.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    fn lookup(&self, name: &str, role: Role) -> Option<&LinguisticVariable> {
        match self.by_name.get(name) {
            Some((key, r)) if *r == role => Some(&self.variables[*key]),
            _ => None,
        }
    }

    pub(crate) fn input_keys(&self) -> &[VariableKey] {
        &self.inputs
    }

    pub(crate) fn output_keys(&self) -> &[VariableKey] {
        &self.outputs
    }

    pub(crate) fn variable(&self, key: VariableKey) -> &LinguisticVariable {
        &self.variables[key]
    }

    pub(crate) fn compiled(&self) -> &[CompiledRule] {
        &self.compiled
    }
}

#[derive(Default)]
pub struct RuleBaseBuilder {
    inputs: Vec<LinguisticVariable>,
    outputs: Vec<LinguisticVariable>,
    rules: Rules,
}

impl RuleBaseBuilder {
    pub fn input(mut self, var: LinguisticVariable) -> Self {
        self.inputs.push(var);
        self
    }

    pub fn output(mut self, var: LinguisticVariable) -> Self {
        self.outputs.push(var);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.add(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        for rule in rules {
            self.rules.add(rule);
        }
        self
    }

    /// Registers the variables and resolves every rule against them. The
    /// whole rule set is rejected on the first bad rule.
    pub fn build(self) -> Result<RuleBase, BuildError> {
        let mut variables = SlotMap::with_key();
        let mut by_name = HashMap::with_capacity(self.inputs.len() + self.outputs.len());
        let mut inputs = Vec::with_capacity(self.inputs.len());
        let mut outputs = Vec::with_capacity(self.outputs.len());

        let registrations = self
            .inputs
            .into_iter()
            .map(|var| (var, Role::Input))
            .chain(self.outputs.into_iter().map(|var| (var, Role::Output)));

        for (var, role) in registrations {
            if by_name.contains_key(var.name()) {
                return Err(BuildError::DuplicateVariable {
                    variable: var.name().to_string(),
                });
            }

            let name = var.name().to_string();
            let key = variables.insert(var);

            by_name.insert(name, (key, role));
            match role {
                Role::Input => inputs.push(key),
                Role::Output => outputs.push(key),
            }
        }

        let mut compiled = Vec::with_capacity(self.rules.len());

        for (rule_index, rule) in self.rules.iter().enumerate() {
            compiled.push(compile(rule_index, rule, &variables, &by_name)?);
        }

        debug!(
            inputs = inputs.len(),
            outputs = outputs.len(),
            rules = compiled.len(),
            "compiled rule base"
        );

        Ok(RuleBase {
            variables,
            by_name,
            inputs,
            outputs,
            rules: self.rules,
            compiled,
        })
    }
}

fn compile(
    rule_index: usize,
    rule: &Rule,
    variables: &SlotMap<VariableKey, LinguisticVariable>,
    by_name: &HashMap<String, (VariableKey, Role)>,
) -> Result<CompiledRule, BuildError> {
    if rule.consequences().is_empty() {
        return Err(BuildError::EmptyConsequence { rule_index });
    }

    let resolve = |variable: &str, label: &str, role: Role| {
        by_name
            .get(variable)
            .filter(|(_, r)| *r == role)
            .and_then(|(key, _)| {
                variables[*key]
                    .term_index(label)
                    .map(|term| TermRef { var: *key, term })
            })
            .ok_or_else(|| BuildError::UndefinedReference {
                rule_index,
                variable: variable.to_string(),
                label: label.to_string(),
            })
    };

    let premise = rule
        .premise()
        .try_map(&mut |prop: &Proposition| resolve(&prop.variable, &prop.label, Role::Input))?;

    let consequences = rule
        .consequences()
        .iter()
        .map(|c| {
            if !c.weight.is_finite() || !(0. ..=1.).contains(&c.weight) {
                return Err(BuildError::InvalidWeight {
                    rule_index,
                    weight: c.weight,
                });
            }

            Ok(CompiledConsequence {
                target: resolve(&c.variable, &c.label, Role::Output)?,
                weight: c.weight,
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(CompiledRule { premise, consequences })
}
