//! Mamdani fuzzy inference with triangular terms, plus the EV charging
//! rule tables built on top of it.
//!
//! A [`RuleBase`] is assembled once from [`LinguisticVariable`]s and
//! [`Rule`]s, validated, and then shared read-only by any number of
//! [`InferenceEngine`] calls:
//!
//! ```
//! use ev_charge_fuzzy::{is, Inputs, InferenceEngine, LinguisticVariable, Rule, RuleBase, Triangle};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let battery = LinguisticVariable::builder("battery", 0. ..=100.)
//!     .term("low", Triangle::new(0., 0., 30.)?)
//!     .term("high", Triangle::new(70., 100., 100.)?)
//!     .build()?;
//! let charge_time = LinguisticVariable::builder("charge_time", 0. ..=120.)
//!     .term("short", Triangle::new(0., 0., 40.)?)
//!     .term("long", Triangle::new(80., 120., 120.)?)
//!     .build()?;
//!
//! let rule_base = RuleBase::builder()
//!     .input(battery)
//!     .output(charge_time)
//!     .rule(Rule::new(is("battery", "low")).then("charge_time", "long"))
//!     .rule(Rule::new(is("battery", "high")).then("charge_time", "short"))
//!     .build()?;
//!
//! let engine = InferenceEngine::new(rule_base);
//! let outputs = engine.infer(&Inputs::new().with("battery", 10.))?;
//! assert!(outputs.get("charge_time").unwrap() > 80.);
//! # Ok(())
//! # }
//! ```

mod config;
mod dsl;
mod error;
pub mod ev;
mod inference;
mod inputs;
mod linspace;
mod math;
mod membership;
mod ops;
mod outputs;
mod rule_base;
mod rules;
mod variable;

pub mod logging;

pub use config::EngineConfig;
pub use dsl::{is, Expr, Proposition};
pub use error::{BuildError, ConfigError, InferenceError};
pub use inference::{FuzzifiedInput, InferenceEngine, Trace};
pub use inputs::Inputs;
pub use linspace::Linspace;
pub use membership::Triangle;
pub use ops::{AggregationOp, AndOp, DefuzzificationOp, ImplicationOp, OrOp};
pub use outputs::Outputs;
pub use rule_base::{RuleBase, RuleBaseBuilder};
pub use rules::{Consequence, Rule, Rules};
pub use variable::{LinguisticVariable, LinguisticVariableBuilder};
