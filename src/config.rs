use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ops::{AggregationOp, AndOp, DefuzzificationOp, ImplicationOp, OrOp};

/// Operator selection for an [`InferenceEngine`](crate::InferenceEngine).
///
/// The default is classic Mamdani: min/max connectives, clipping, max
/// aggregation and centroid defuzzification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub and_op: AndOp,
    pub or_op: OrOp,
    pub implication: ImplicationOp,
    pub aggregation: AggregationOp,
    pub defuzzification: DefuzzificationOp,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_json_str(&contents)
    }
}

#[test]
fn test_partial_config_uses_defaults() {
    let config = EngineConfig::from_json_str(r#"{ "defuzzification": "bisector", "and_op": "prod" }"#).unwrap();

    assert_eq!(config.defuzzification, DefuzzificationOp::Bisector);
    assert_eq!(config.and_op, AndOp::Prod);
    assert_eq!(config.or_op, OrOp::Max);
    assert_eq!(config.implication, ImplicationOp::Clip);
    assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
}

#[test]
fn test_config_rejects_unknown_fields() {
    assert!(matches!(
        EngineConfig::from_json_str(r#"{ "defuzz": "centroid" }"#),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(
        EngineConfig::from_json_str(r#"{ "aggregation": "average" }"#),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn test_config_missing_file() {
    assert!(matches!(
        EngineConfig::from_path("/nonexistent/engine.json"),
        Err(ConfigError::Io(_))
    ));
}
