use std::collections::HashMap;

use serde::Serialize;

/// Crisp values of every output variable, produced fresh by each call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Outputs(HashMap<String, f64>);

impl Outputs {
    pub(crate) fn new(defuzzificated: HashMap<String, f64>) -> Self {
        Outputs(defuzzificated)
    }

    pub fn get(&self, var: &str) -> Option<f64> {
        self.0.get(var).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
