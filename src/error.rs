use thiserror::Error;

/// Failures detected while assembling variables, rules and rule bases.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Invalid triangle: expected finite a <= b <= c, got ({a}, {b}, {c})")]
    InvalidShape { a: f64, b: f64, c: f64 },

    #[error("Invalid universe for {variable}: [{min}, {max}] with step {step}")]
    InvalidUniverse {
        variable: String,
        min: f64,
        max: f64,
        step: f64,
    },

    #[error("Duplicate term {label} on variable {variable}")]
    DuplicateTerm { variable: String, label: String },

    #[error("Variable {variable} has no terms")]
    EmptyVariable { variable: String },

    #[error("Duplicate variable {variable}")]
    DuplicateVariable { variable: String },

    #[error("Rule {rule_index} has no consequences")]
    EmptyConsequence { rule_index: usize },

    #[error("Rule {rule_index} has invalid weight {weight}")]
    InvalidWeight { rule_index: usize, weight: f64 },

    #[error("Rule {rule_index} references undefined {variable}.{label}")]
    UndefinedReference {
        rule_index: usize,
        variable: String,
        label: String,
    },
}

/// Per-call inference failures. A caller receiving one of these has no result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Missing input for {variable}")]
    MissingInput { variable: String },

    #[error("Non-finite input for {variable}: {value}")]
    NonFiniteInput { variable: String, value: f64 },

    #[error("Unknown label {label} on {variable}")]
    UnknownLabel { variable: String, label: String },

    #[error("No rule fired for output {variable}")]
    NoRuleFired { variable: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
