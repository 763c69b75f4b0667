use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, error};

use ev_charge_fuzzy::ev::{ChargingAdvice, ChargingAdvisor, ChargingRequest, RuleSet, VehicleClass};
use ev_charge_fuzzy::{logging, EngineConfig, Trace};

/// Recommend an EV charge time and queue priority.
#[derive(Parser, Debug)]
#[command(name = "ev-charge-advisor", version, about)]
struct Cli {
    /// Battery level in percent (0-100)
    #[arg(long)]
    battery: f64,

    /// Remaining distance in km (0-200)
    #[arg(long)]
    distance: f64,

    /// Station load in percent (0-100)
    #[arg(long)]
    station_load: f64,

    /// Urgency (0-10)
    #[arg(long)]
    urgency: f64,

    /// city, highway or premium
    #[arg(long, default_value = "city")]
    car_type: VehicleClass,

    /// base or extended
    #[arg(long, default_value = "base")]
    rule_set: RuleSet,

    /// JSON file selecting the inference operators
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Include fuzzified inputs and rule strengths
    #[arg(long)]
    explain: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    rule_set: &'a str,
    #[serde(flatten)]
    advice: ChargingAdvice,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<Trace>,
}

fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match EngineConfig::from_path(path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path.display(), "{e}");
                return ExitCode::from(2);
            },
        },
        None => EngineConfig::default(),
    };

    let advisor = match ChargingAdvisor::with_config(cli.rule_set, config) {
        Ok(advisor) => advisor,
        Err(e) => {
            error!(rule_set = cli.rule_set.version(), "invalid rule set: {e}");
            return ExitCode::from(2);
        },
    };

    let request = ChargingRequest::new(cli.battery, cli.distance, cli.station_load, cli.urgency, cli.car_type);
    debug!(?request, rule_set = cli.rule_set.version(), "advising");

    let (advice, trace) = match advisor.advise_traced(&request) {
        Ok(result) => result,
        Err(e) => {
            println!("no recommendation available: {e}");
            return ExitCode::FAILURE;
        },
    };

    let report = Report {
        rule_set: cli.rule_set.version(),
        advice,
        trace: cli.explain.then_some(trace),
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            },
        }
    } else {
        print_report(&report);
    }

    ExitCode::SUCCESS
}

fn print_report(report: &Report<'_>) {
    println!("rule set:    {}", report.rule_set);
    println!("charge time: {:.1} min", report.advice.charge_time);
    println!("priority:    {:.1}", report.advice.priority);

    if let Some(trace) = &report.trace {
        for input in &trace.fuzzified {
            let degrees: Vec<String> = input
                .degrees
                .iter()
                .map(|(label, degree)| format!("{label}={degree:.3}"))
                .collect();

            println!("  {:<13} {}", input.variable, degrees.join(" "));
        }
        for (i, strength) in trace.rule_strengths.iter().enumerate() {
            println!("  rule {i:>2}      {strength:.3}");
        }
    }
}
