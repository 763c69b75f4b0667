//! EV charging advice: five situational inputs in, a recommended charge time
//! (minutes) and a queueing priority out.
//!
//! Vehicle class is fed to the engine as a continuous coordinate (city = 0,
//! highway = 1, premium = 2) with a triangular term peaking on each integer.
//! Only the exact integers give a class degree of 1.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dsl::{is, Expr, Proposition};
use crate::error::{BuildError, InferenceError};
use crate::inference::{InferenceEngine, Trace};
use crate::inputs::Inputs;
use crate::membership::Triangle;
use crate::rule_base::RuleBase;
use crate::rules::Rule;
use crate::variable::LinguisticVariable;
use crate::EngineConfig;

pub const BATTERY: &str = "battery";
pub const DISTANCE: &str = "distance";
pub const STATION_LOAD: &str = "station_load";
pub const URGENCY: &str = "urgency";
pub const CAR_TYPE: &str = "car_type";
pub const CHARGE_TIME: &str = "charge_time";
pub const PRIORITY: &str = "priority";

struct VariableSpec {
    name: &'static str,
    range: (f64, f64),
    terms: &'static [(&'static str, [f64; 3])],
}

const INPUTS: &[VariableSpec] = &[
    VariableSpec {
        name: BATTERY,
        range: (0., 100.),
        terms: &[("low", [0., 0., 30.]), ("medium", [20., 50., 80.]), ("high", [70., 100., 100.])],
    },
    VariableSpec {
        name: DISTANCE,
        range: (0., 200.),
        terms: &[("short", [0., 0., 40.]), ("medium", [30., 100., 170.]), ("long", [150., 200., 200.])],
    },
    VariableSpec {
        name: STATION_LOAD,
        range: (0., 100.),
        terms: &[("low", [0., 0., 40.]), ("medium", [30., 50., 70.]), ("high", [60., 100., 100.])],
    },
    VariableSpec {
        name: URGENCY,
        range: (0., 10.),
        terms: &[("low", [0., 0., 3.]), ("medium", [2., 5., 8.]), ("high", [7., 10., 10.])],
    },
    VariableSpec {
        name: CAR_TYPE,
        range: (0., 2.),
        terms: &[("city", [-0.5, 0., 0.5]), ("highway", [0.5, 1., 1.5]), ("premium", [1.5, 2., 2.5])],
    },
];

const OUTPUTS: &[VariableSpec] = &[
    VariableSpec {
        name: CHARGE_TIME,
        range: (0., 120.),
        terms: &[("short", [0., 0., 40.]), ("medium", [30., 60., 90.]), ("long", [80., 120., 120.])],
    },
    VariableSpec {
        name: PRIORITY,
        range: (0., 100.),
        terms: &[("low", [0., 0., 40.]), ("medium", [30., 50., 70.]), ("high", [60., 100., 100.])],
    },
];

/// Conjunction of `when` terms implying every `then` term.
struct RuleRow {
    when: &'static [(&'static str, &'static str)],
    then: &'static [(&'static str, &'static str)],
}

/// The battery/distance charge-time rules with a priority attached to each,
/// plus urgency overrides. Priority is not taken from any shipped table: the
/// last row covers a high battery at medium urgency, so every in-universe
/// input fires at least one rule per output.
const BASE_RULES: &[RuleRow] = &[
    RuleRow {
        when: &[(BATTERY, "low")],
        then: &[(CHARGE_TIME, "long"), (PRIORITY, "high")],
    },
    RuleRow {
        when: &[(BATTERY, "medium"), (DISTANCE, "long")],
        then: &[(CHARGE_TIME, "long"), (PRIORITY, "high")],
    },
    RuleRow {
        when: &[(BATTERY, "medium"), (DISTANCE, "medium")],
        then: &[(CHARGE_TIME, "medium"), (PRIORITY, "medium")],
    },
    RuleRow {
        when: &[(BATTERY, "medium"), (DISTANCE, "short")],
        then: &[(CHARGE_TIME, "short"), (PRIORITY, "low")],
    },
    RuleRow {
        when: &[(BATTERY, "high")],
        then: &[(CHARGE_TIME, "short")],
    },
    RuleRow {
        when: &[(URGENCY, "high")],
        then: &[(PRIORITY, "high")],
    },
    RuleRow {
        when: &[(BATTERY, "high"), (URGENCY, "low")],
        then: &[(PRIORITY, "low")],
    },
    RuleRow {
        when: &[(BATTERY, "high"), (URGENCY, "medium")],
        then: &[(PRIORITY, "low")],
    },
];

const EXTENDED_RULES: &[RuleRow] = &[
    // charge time
    RuleRow { when: &[(BATTERY, "low")], then: &[(CHARGE_TIME, "long")] },
    RuleRow { when: &[(BATTERY, "medium"), (DISTANCE, "long")], then: &[(CHARGE_TIME, "long")] },
    RuleRow { when: &[(BATTERY, "medium"), (DISTANCE, "medium")], then: &[(CHARGE_TIME, "medium")] },
    RuleRow { when: &[(BATTERY, "medium"), (DISTANCE, "short")], then: &[(CHARGE_TIME, "short")] },
    RuleRow { when: &[(BATTERY, "high")], then: &[(CHARGE_TIME, "short")] },
    RuleRow { when: &[(URGENCY, "high"), (BATTERY, "low")], then: &[(CHARGE_TIME, "long")] },
    RuleRow { when: &[(URGENCY, "high"), (BATTERY, "medium")], then: &[(CHARGE_TIME, "short")] },
    RuleRow { when: &[(CAR_TYPE, "premium"), (BATTERY, "low")], then: &[(CHARGE_TIME, "medium")] },
    RuleRow { when: &[(STATION_LOAD, "high"), (BATTERY, "low")], then: &[(CHARGE_TIME, "long")] },
    RuleRow { when: &[(STATION_LOAD, "low"), (BATTERY, "medium")], then: &[(CHARGE_TIME, "short")] },
    // priority
    RuleRow { when: &[(BATTERY, "low")], then: &[(PRIORITY, "high")] },
    RuleRow { when: &[(DISTANCE, "long")], then: &[(PRIORITY, "high")] },
    RuleRow { when: &[(URGENCY, "high")], then: &[(PRIORITY, "high")] },
    RuleRow { when: &[(CAR_TYPE, "premium")], then: &[(PRIORITY, "high")] },
    RuleRow { when: &[(CAR_TYPE, "highway")], then: &[(PRIORITY, "medium")] },
    RuleRow { when: &[(CAR_TYPE, "city")], then: &[(PRIORITY, "low")] },
    RuleRow { when: &[(CAR_TYPE, "city"), (URGENCY, "high")], then: &[(PRIORITY, "medium")] },
    RuleRow { when: &[(BATTERY, "medium"), (DISTANCE, "long")], then: &[(PRIORITY, "high")] },
    RuleRow { when: &[(BATTERY, "high"), (URGENCY, "low")], then: &[(PRIORITY, "low")] },
    RuleRow { when: &[(URGENCY, "medium"), (STATION_LOAD, "high")], then: &[(PRIORITY, "high")] },
    RuleRow {
        when: &[(CAR_TYPE, "city"), (BATTERY, "high"), (URGENCY, "low")],
        then: &[(PRIORITY, "low")],
    },
    RuleRow {
        when: &[(BATTERY, "low"), (STATION_LOAD, "high"), (URGENCY, "medium")],
        then: &[(PRIORITY, "high")],
    },
];

/// The versioned rule tables shipped with the crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    /// Eight rules driven by battery, distance and urgency
    #[default]
    Base,
    /// Twenty-two rules that also weigh station load and vehicle class
    Extended,
}

impl RuleSet {
    pub fn version(self) -> &'static str {
        match self {
            Self::Base => "base-1",
            Self::Extended => "extended-1",
        }
    }

    fn rows(self) -> &'static [RuleRow] {
        match self {
            Self::Base => BASE_RULES,
            Self::Extended => EXTENDED_RULES,
        }
    }

    pub fn rule_base(self) -> Result<RuleBase, BuildError> {
        build_rule_base(self.rows())
    }
}

impl FromStr for RuleSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Self::Base),
            "extended" => Ok(Self::Extended),
            _ => Err(format!("unknown rule set {s:?}, expected base or extended")),
        }
    }
}

fn variable(spec: &VariableSpec) -> Result<LinguisticVariable, BuildError> {
    let (min, max) = spec.range;

    spec.terms
        .iter()
        .try_fold(LinguisticVariable::builder(spec.name, min..=max), |builder, (label, [a, b, c])| {
            Ok::<_, BuildError>(builder.term(*label, Triangle::new(*a, *b, *c)?))
        })?
        .build()
}

fn rule(row: &RuleRow) -> Rule {
    let mut premise: Vec<Expr<Proposition>> = row.when.iter().map(|(var, label)| is(*var, *label)).collect();
    let premise = if premise.len() == 1 { premise.remove(0) } else { Expr::And(premise) };

    row.then
        .iter()
        .fold(Rule::new(premise), |rule, (var, label)| rule.then(*var, *label))
}

fn build_rule_base(rows: &[RuleRow]) -> Result<RuleBase, BuildError> {
    let mut builder = RuleBase::builder();

    for spec in INPUTS {
        builder = builder.input(variable(spec)?);
    }
    for spec in OUTPUTS {
        builder = builder.output(variable(spec)?);
    }

    builder.rules(rows.iter().map(rule)).build()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    City,
    Highway,
    Premium,
}

impl VehicleClass {
    pub fn coordinate(self) -> f64 {
        match self {
            Self::City => 0.,
            Self::Highway => 1.,
            Self::Premium => 2.,
        }
    }
}

impl FromStr for VehicleClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "city" | "0" => Ok(Self::City),
            "highway" | "1" => Ok(Self::Highway),
            "premium" | "2" => Ok(Self::Premium),
            _ => Err(format!("unknown vehicle class {s:?}, expected city, highway or premium")),
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::City => "city",
            Self::Highway => "highway",
            Self::Premium => "premium",
        };

        f.write_str(name)
    }
}

/// Battery in percent, distance in km, station load in percent, urgency on
/// 0..=10 and the vehicle class coordinate on 0..=2.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChargingRequest {
    pub battery: f64,
    pub distance: f64,
    pub station_load: f64,
    pub urgency: f64,
    pub car_type: f64,
}

impl ChargingRequest {
    pub fn new(battery: f64, distance: f64, station_load: f64, urgency: f64, class: VehicleClass) -> Self {
        ChargingRequest {
            battery,
            distance,
            station_load,
            urgency,
            car_type: class.coordinate(),
        }
    }

    fn inputs(&self) -> Inputs {
        Inputs::new()
            .with(BATTERY, self.battery)
            .with(DISTANCE, self.distance)
            .with(STATION_LOAD, self.station_load)
            .with(URGENCY, self.urgency)
            .with(CAR_TYPE, self.car_type)
    }
}

/// Charge time in minutes (0..=120) and priority (0..=100).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChargingAdvice {
    pub charge_time: f64,
    pub priority: f64,
}

/// An inference engine bound to one of the shipped rule sets.
#[derive(Clone, Debug)]
pub struct ChargingAdvisor {
    engine: InferenceEngine,
    rule_set: RuleSet,
}

impl ChargingAdvisor {
    pub fn new(rule_set: RuleSet) -> Result<Self, BuildError> {
        Self::with_config(rule_set, EngineConfig::default())
    }

    pub fn with_config(rule_set: RuleSet, config: EngineConfig) -> Result<Self, BuildError> {
        Ok(ChargingAdvisor {
            engine: InferenceEngine::with_config(rule_set.rule_base()?, config),
            rule_set,
        })
    }

    pub fn rule_set(&self) -> RuleSet {
        self.rule_set
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    pub fn advise(&self, request: &ChargingRequest) -> Result<ChargingAdvice, InferenceError> {
        self.advise_traced(request).map(|(advice, _)| advice)
    }

    pub fn advise_traced(&self, request: &ChargingRequest) -> Result<(ChargingAdvice, Trace), InferenceError> {
        let (outputs, trace) = self.engine.infer_traced(&request.inputs())?;
        let get = |variable: &str| {
            outputs.get(variable).ok_or_else(|| InferenceError::NoRuleFired {
                variable: variable.to_string(),
            })
        };

        let advice = ChargingAdvice {
            charge_time: get(CHARGE_TIME)?,
            priority: get(PRIORITY)?,
        };

        Ok((advice, trace))
    }
}

#[test]
fn test_shipped_rule_sets_compile() {
    let base = RuleSet::Base.rule_base().unwrap();
    let extended = RuleSet::Extended.rule_base().unwrap();

    assert_eq!(base.rules().len(), 8);
    assert_eq!(extended.rules().len(), 22);
    assert_eq!(base.inputs().count(), 5);
    assert_eq!(
        extended.outputs().map(|v| v.name()).collect::<Vec<_>>(),
        [CHARGE_TIME, PRIORITY]
    );
}

#[test]
fn test_mislabeled_row_rejects_whole_table() {
    const ROWS: &[RuleRow] = &[
        RuleRow { when: &[(BATTERY, "low")], then: &[(CHARGE_TIME, "long")] },
        RuleRow { when: &[(URGENCY, "high")], then: &[(PRIORITY, "very_high")] },
    ];

    assert_eq!(
        build_rule_base(ROWS).unwrap_err(),
        BuildError::UndefinedReference {
            rule_index: 1,
            variable: PRIORITY.into(),
            label: "very_high".into(),
        }
    );
}

#[test]
fn test_vehicle_class_parsing() {
    assert_eq!("premium".parse(), Ok(VehicleClass::Premium));
    assert_eq!("1".parse(), Ok(VehicleClass::Highway));
    assert!("truck".parse::<VehicleClass>().is_err());
    assert_eq!(VehicleClass::City.to_string(), "city");
    assert_eq!("extended".parse(), Ok(RuleSet::Extended));
}
