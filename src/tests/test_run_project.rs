use crate::errors::PvBalanceError;
use crate::output::{MemoryOutput, Output, SinkOutput};
use crate::{run_project, RunResults};
use anyhow::anyhow;
use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::{json, Value};
use std::io::{Sink, Write};

#[fixture]
fn scenario() -> String {
    json!({
        "SimulationYear": 2024,
        "Seed": 42,
        "Consumption": {"annual_consumption_kwh": 5000.0},
        "PhotovoltaicSystem": {"peak_power_kwp": 10.0},
        "ElectricBattery": {"capacity_kwh": 10.0},
        "Tariff": {"price_power": 3.0, "price_distribution": 2.0, "price_sell": 2.0},
        "Investment": {
            "initial_cost": 350000.0,
            "years": 20,
            "market_return_pct": 8.0,
            "inflation_pct": 3.0
        }
    })
    .to_string()
}

fn run(scenario: &str, output: impl Output) -> Result<RunResults, PvBalanceError> {
    run_project(scenario.as_bytes(), output)
}

#[rstest]
fn should_write_all_report_files(scenario: String) {
    let output = MemoryOutput::new();
    let results = run(&scenario, output.clone()).unwrap();

    assert_eq!(
        output.keys(),
        vec!["balance.csv", "monthly.csv", "investment.csv", "summary.json"]
    );

    let balance = output.contents_as_string("balance.csv").unwrap();
    let mut lines = balance.lines();
    assert_eq!(
        lines.next().unwrap(),
        "datetime,consumption_kWh,production_kWh,grid_import_kWh,grid_export_kWh,\
         battery_charge_kWh,battery_discharge_kWh,battery_soc_kWh"
    );
    assert!(lines.next().unwrap().starts_with("2024-01-01T00:00:00,"));
    assert_eq!(balance.lines().count(), 8784 + 1);

    let monthly = output.contents_as_string("monthly.csv").unwrap();
    assert_eq!(monthly.lines().count(), 12 + 1);
    assert!(monthly.lines().nth(1).unwrap().starts_with("Leden,"));
    assert!(monthly.lines().nth(12).unwrap().starts_with("Prosinec,"));

    let investment = output.contents_as_string("investment.csv").unwrap();
    assert_eq!(
        investment.lines().next().unwrap(),
        "Year,PV_Cumulative_CashFlow,PV_Reinvest_Net_Result,SP500_Gross_Gain,\
         SP500_Net_Result,SP500_Total_Value"
    );
    assert_eq!(investment.lines().count(), 21 + 1);

    let summary: Value =
        serde_json::from_str(&output.contents_as_string("summary.json").unwrap()).unwrap();
    assert_eq!(summary["input"]["Seed"], json!(42));
    assert_relative_eq!(
        summary["financials"]["savings_czk"].as_f64().unwrap(),
        results.financials.savings_czk
    );
    assert_eq!(
        summary["headline"]["Payback year"],
        json!(results.investment_summary.payback.to_string())
    );
}

#[rstest]
fn financials_are_consistent_with_balance(scenario: String) {
    let results = run(&scenario, SinkOutput).unwrap();
    let financials = results.financials;

    let total_consumption = results.records.iter().map(|r| r.consumption_kwh).sum::<f64>();
    assert_relative_eq!(total_consumption, 5_000., max_relative = 1e-9);
    assert_relative_eq!(financials.cost_without_pv_czk, 5_000. * 5., max_relative = 1e-9);
    assert_relative_eq!(
        financials.savings_czk,
        financials.cost_without_pv_czk - financials.cost_with_pv_czk
    );
    assert_relative_eq!(
        results.energy_summary.total_import_kwh,
        financials.total_import_kwh
    );
    assert!(results.energy_summary.self_sufficiency_ratio > 0.);
    assert!(results.energy_summary.self_sufficiency_ratio <= 1.);
    assert_relative_eq!(
        results.monthly.iter().map(|m| m.grid_export_kwh).sum::<f64>(),
        financials.total_export_kwh,
        max_relative = 1e-9
    );
}

#[rstest]
fn same_scenario_gives_same_results(scenario: String) {
    assert_eq!(
        run(&scenario, SinkOutput).unwrap(),
        run(&scenario, SinkOutput).unwrap()
    );
}

#[rstest]
fn different_seed_gives_different_profiles(scenario: String) {
    let reseeded = scenario.replace("\"Seed\":42", "\"Seed\":7");
    assert_ne!(scenario, reseeded);
    assert_ne!(
        run(&scenario, SinkOutput).unwrap().records,
        run(&reseeded, SinkOutput).unwrap().records
    );
}

#[rstest]
fn should_run_last_representable_year() {
    let results = run(r#"{"SimulationYear": 262142}"#, SinkOutput).unwrap();
    assert_eq!(results.records.len(), 8760);
    assert_eq!(results.monthly.len(), 12);
}

#[rstest]
fn should_reject_unparseable_scenario() {
    assert!(matches!(
        run("{\"Seed\": \"abc\"}", SinkOutput),
        Err(PvBalanceError::InvalidRequest(_))
    ));
}

#[rstest]
#[case(r#"{"Investment": {"initial_cost": -1.0}}"#, "initial_cost")]
#[case(r#"{"Investment": {"years": 101}}"#, "years")]
#[case(r#"{"Investment": {"years": 2147483647}}"#, "years")]
#[case(r#"{"SimulationYear": 262144}"#, "simulation_year")]
fn should_reject_non_physical_scenario(#[case] scenario: &str, #[case] parameter: &str) {
    let result = run(scenario, SinkOutput);
    match result {
        Err(PvBalanceError::InvalidParameter(error)) => {
            assert_eq!(error.parameter(), parameter)
        }
        other => panic!("expected invalid parameter, got {other:?}"),
    }
}

#[derive(Debug)]
struct FailingOutput;

impl Output for FailingOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Err::<Sink, _>(anyhow!("cannot open {location_key}"))
    }
}

#[rstest]
fn should_report_output_failures(scenario: String) {
    assert!(matches!(
        run(&scenario, FailingOutput),
        Err(PvBalanceError::ErrorInOutput(_))
    ));
}
