use ev_charge_fuzzy::ev::{
    ChargingAdvice, ChargingAdvisor, ChargingRequest, RuleSet, VehicleClass, CHARGE_TIME, PRIORITY,
};
use ev_charge_fuzzy::InferenceError;
use proptest::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn advisor(rule_set: RuleSet) -> ChargingAdvisor {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("ev_charge_fuzzy=trace"))
        .with_test_writer()
        .try_init();

    ChargingAdvisor::new(rule_set).unwrap()
}

fn advise(rule_set: RuleSet, request: ChargingRequest) -> ChargingAdvice {
    advisor(rule_set).advise(&request).unwrap()
}

#[test]
fn low_battery_drives_long_charge_and_high_priority() {
    let advice = advisor(RuleSet::Base)
        .advise(&ChargingRequest::new(10., 5., 10., 1., VehicleClass::City))
        .unwrap();

    assert!(advice.charge_time > 80., "charge_time = {}", advice.charge_time);
    assert!(advice.priority > 60., "priority = {}", advice.priority);
}

#[test]
fn full_battery_short_trip_is_short_and_low() {
    let advice = advisor(RuleSet::Base)
        .advise(&ChargingRequest::new(90., 10., 10., 1., VehicleClass::City))
        .unwrap();

    assert!(advice.charge_time < 40., "charge_time = {}", advice.charge_time);
    assert!(advice.priority < 40., "priority = {}", advice.priority);
}

#[test]
fn battery_outside_universe_reports_no_rule_fired() {
    // every battery term is 0 at 150 and urgency 5 is not high
    let result = advisor(RuleSet::Base).advise(&ChargingRequest::new(150., 100., 50., 5., VehicleClass::Highway));

    assert_eq!(
        result,
        Err(InferenceError::NoRuleFired {
            variable: CHARGE_TIME.into()
        })
    );
}

#[test]
fn full_battery_at_medium_urgency_has_low_priority() {
    let advice = advise(RuleSet::Base, ChargingRequest::new(100., 100., 50., 5., VehicleClass::Highway));

    assert!(advice.priority < 40., "priority = {}", advice.priority);
}

#[test]
fn base_covers_every_integer_class_grid_point() {
    let advisor = advisor(RuleSet::Base);

    for battery in (0..=100).step_by(5) {
        for urgency in 0..=10 {
            for distance in [0., 35., 100., 160., 200.] {
                for station_load in [0., 50., 100.] {
                    for class in [VehicleClass::City, VehicleClass::Highway, VehicleClass::Premium] {
                        let request = ChargingRequest::new(battery as f64, distance, station_load, urgency as f64, class);

                        if let Err(e) = advisor.advise(&request) {
                            panic!("{request:?}: {e}");
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn repeated_calls_are_identical() {
    for rule_set in [RuleSet::Base, RuleSet::Extended] {
        let advisor = advisor(rule_set);
        let request = ChargingRequest::new(37., 120., 65., 6., VehicleClass::Premium);

        assert_eq!(advisor.advise(&request), advisor.advise(&request));
    }
}

#[test]
fn low_battery_rule_weakens_as_battery_rises() {
    let advisor = advisor(RuleSet::Base);
    let mut last_strength = f64::INFINITY;

    for battery in 0..=100 {
        let request = ChargingRequest::new(battery as f64, 5., 10., 1., VehicleClass::City);
        let trace = match advisor.advise_traced(&request) {
            Ok((_, trace)) => trace,
            Err(e) => panic!("battery {battery}: {e}"),
        };

        // rule 0 is `battery IS low`
        let strength = trace.rule_strengths[0];
        assert!(strength <= last_strength);
        last_strength = strength;
    }
    assert_eq!(last_strength, 0.);
}

#[test]
fn charge_time_does_not_grow_once_battery_is_high() {
    let advisor = advisor(RuleSet::Base);
    let charge_time = |battery: f64| {
        advisor
            .advise(&ChargingRequest::new(battery, 5., 10., 1., VehicleClass::City))
            .unwrap()
            .charge_time
    };

    assert!(charge_time(0.) > charge_time(50.));

    let mut last = charge_time(80.);
    for battery in 81..=100 {
        let current = charge_time(battery as f64);
        assert!(current <= last + 1e-9, "battery {battery}: {current} > {last}");
        last = current;
    }
}

#[test]
fn trace_lists_every_input_in_order() {
    let (_, trace) = advisor(RuleSet::Extended)
        .advise_traced(&ChargingRequest::new(50., 100., 50., 5., VehicleClass::Highway))
        .unwrap();

    let names: Vec<_> = trace.fuzzified.iter().map(|f| f.variable.as_str()).collect();
    assert_eq!(names, ["battery", "distance", "station_load", "urgency", "car_type"]);
    assert_eq!(trace.rule_strengths.len(), 22);
    assert_eq!(trace.fuzzified[4].degrees[1], ("highway".to_string(), 1.));
}

#[test]
fn extended_full_battery_short_trip_is_short_and_low() {
    let advice = advise(RuleSet::Extended, ChargingRequest::new(90., 10., 10., 1., VehicleClass::City));

    assert!(advice.charge_time < 40., "charge_time = {}", advice.charge_time);
    assert!(advice.priority < 40., "priority = {}", advice.priority);
}

#[test]
fn extended_premium_low_battery_charges_shorter_than_city() {
    let city = advise(RuleSet::Extended, ChargingRequest::new(10., 100., 10., 1., VehicleClass::City));
    let premium = advise(RuleSet::Extended, ChargingRequest::new(10., 100., 10., 1., VehicleClass::Premium));

    assert!(premium.charge_time < city.charge_time, "{premium:?} vs {city:?}");
}

#[test]
fn extended_priority_follows_vehicle_class() {
    let priority = |class| advise(RuleSet::Extended, ChargingRequest::new(50., 100., 50., 5., class)).priority;

    // only the class rules touch priority here
    assert!(priority(VehicleClass::City) < 40.);
    assert!((priority(VehicleClass::Highway) - 50.).abs() < 1e-9);
    assert!(priority(VehicleClass::Premium) > 60.);
}

#[test]
fn extended_long_distance_raises_priority() {
    let near = advise(RuleSet::Extended, ChargingRequest::new(50., 100., 50., 5., VehicleClass::City));
    let far = advise(RuleSet::Extended, ChargingRequest::new(50., 190., 50., 5., VehicleClass::City));

    assert!(far.priority > near.priority, "{far:?} vs {near:?}");
    assert!(far.charge_time > near.charge_time, "{far:?} vs {near:?}");
}

#[test]
fn extended_busy_station_at_medium_urgency_raises_priority() {
    let quiet = advise(RuleSet::Extended, ChargingRequest::new(50., 100., 50., 5., VehicleClass::City));
    let busy = advise(RuleSet::Extended, ChargingRequest::new(50., 100., 90., 5., VehicleClass::City));

    assert!(busy.priority > quiet.priority, "{busy:?} vs {quiet:?}");
}

#[test]
fn extended_quiet_station_shortens_medium_battery_charge() {
    let normal = advise(RuleSet::Extended, ChargingRequest::new(50., 100., 50., 5., VehicleClass::City));
    let quiet = advise(RuleSet::Extended, ChargingRequest::new(50., 100., 10., 5., VehicleClass::City));

    assert!((normal.charge_time - 60.).abs() < 1e-9);
    assert!(quiet.charge_time < normal.charge_time, "{quiet:?} vs {normal:?}");
}

#[test]
fn extended_urgent_medium_battery_charges_shorter() {
    let calm = advise(RuleSet::Extended, ChargingRequest::new(50., 100., 50., 5., VehicleClass::City));
    let urgent = advise(RuleSet::Extended, ChargingRequest::new(50., 100., 50., 9., VehicleClass::City));

    assert!(urgent.charge_time < calm.charge_time, "{urgent:?} vs {calm:?}");
    assert!(urgent.priority > calm.priority, "{urgent:?} vs {calm:?}");
}

#[test]
fn outputs_are_registered_for_both_rule_sets() {
    for rule_set in [RuleSet::Base, RuleSet::Extended] {
        let advisor = advisor(rule_set);
        let outputs: Vec<_> = advisor.engine().rule_base().outputs().map(|v| v.name()).collect();

        assert_eq!(outputs, [CHARGE_TIME, PRIORITY]);
    }
}

fn vehicle_class() -> impl Strategy<Value = VehicleClass> {
    prop_oneof![
        Just(VehicleClass::City),
        Just(VehicleClass::Highway),
        Just(VehicleClass::Premium),
    ]
}

proptest! {
    #[test]
    fn extended_outputs_stay_in_universe(
        battery in 0.0..=100.0f64,
        distance in 0.0..=200.0f64,
        station_load in 0.0..=100.0f64,
        urgency in 0.0..=10.0f64,
        class in vehicle_class(),
    ) {
        let advisor = ChargingAdvisor::new(RuleSet::Extended).unwrap();
        let advice = advisor
            .advise(&ChargingRequest::new(battery, distance, station_load, urgency, class))
            .unwrap();

        prop_assert!((0. ..=120.).contains(&advice.charge_time));
        prop_assert!((0. ..=100.).contains(&advice.priority));
    }

    #[test]
    fn base_outputs_always_present_and_in_universe(
        battery in 0.0..=100.0f64,
        distance in 0.0..=200.0f64,
        station_load in 0.0..=100.0f64,
        urgency in 0.0..=10.0f64,
        car_type in 0.0..=2.0f64,
    ) {
        let advisor = ChargingAdvisor::new(RuleSet::Base).unwrap();
        let request = ChargingRequest { battery, distance, station_load, urgency, car_type };

        let advice = advisor.advise(&request).unwrap();

        prop_assert!((0. ..=120.).contains(&advice.charge_time));
        prop_assert!((0. ..=100.).contains(&advice.priority));
    }
}
