use crate::core::economics::financials::{EnergySummary, FinancialSummary};
use crate::core::economics::investment::InvestmentSummary;
use crate::core::units::MONTHS_PER_YEAR;
use crate::corpus::RunResults;
use crate::input::Input;
use crate::output::Output;
use csv::WriterBuilder;
use indexmap::IndexMap;
use serde::Serialize;
use std::io::Write;
use tracing::info;

const CZECH_MONTH_NAMES: [&str; MONTHS_PER_YEAR as usize] = [
    "Leden", "Únor", "Březen", "Duben", "Květen", "Červen", "Červenec", "Srpen", "Září", "Říjen",
    "Listopad", "Prosinec",
];

/// Czech name of a 1-based calendar month.
pub fn czech_month_name(month: u32) -> Option<&'static str> {
    CZECH_MONTH_NAMES
        .get((month as usize).checked_sub(1)?)
        .copied()
}

/// Format a number the Czech way, with two decimals: a space between thousands and a decimal
/// comma, e.g. `-1 234 567,89`.
pub fn format_cz_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(integer_part.len() + integer_part.len() / 3);
    for (i, digit) in integer_part.chars().enumerate() {
        if i > 0 && (integer_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    // no sign on values that round to zero
    let sign = if value < 0. && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    format!("{sign}{grouped},{decimal_part}")
}

/// The figures shown to the user at the end of a run, already formatted.
pub fn headline_figures(results: &RunResults) -> IndexMap<&'static str, String> {
    let financials = &results.financials;
    let energy = &results.energy_summary;
    let investment = &results.investment_summary;

    IndexMap::from([
        (
            "Consumption (kWh)",
            format_cz_number(energy.total_consumption_kwh),
        ),
        (
            "Production (kWh)",
            format_cz_number(energy.total_production_kwh),
        ),
        ("Grid import (kWh)", format_cz_number(financials.total_import_kwh)),
        ("Grid export (kWh)", format_cz_number(financials.total_export_kwh)),
        (
            "Self-sufficiency (%)",
            format_cz_number(energy.self_sufficiency_ratio * 100.),
        ),
        (
            "Cost without PV (CZK)",
            format_cz_number(financials.cost_without_pv_czk),
        ),
        (
            "Cost with PV (CZK)",
            format_cz_number(financials.cost_with_pv_czk),
        ),
        ("Annual savings (CZK)", format_cz_number(financials.savings_czk)),
        ("Payback year", investment.payback.to_string()),
        ("Final PV gain (CZK)", format_cz_number(investment.final_pv_gain)),
        (
            "Final PV + reinvestment gain (CZK)",
            format_cz_number(investment.final_pv_reinvest_gain),
        ),
        (
            "Final market net result (CZK)",
            format_cz_number(investment.final_sp500_net),
        ),
    ])
}

#[derive(Serialize)]
struct MonthlyReportRow {
    #[serde(rename = "Month")]
    month_name: &'static str,
    #[serde(rename = "consumption_kWh")]
    consumption_kwh: f64,
    #[serde(rename = "production_kWh")]
    production_kwh: f64,
    #[serde(rename = "grid_import_kWh")]
    grid_import_kwh: f64,
    #[serde(rename = "grid_export_kWh")]
    grid_export_kwh: f64,
    #[serde(rename = "self_consumption_kWh")]
    self_consumption_kwh: f64,
    savings_self_consumption_czk: f64,
    revenue_export_czk: f64,
}

#[derive(Serialize)]
struct ReportSummary<'a> {
    input: &'a Input,
    financials: &'a FinancialSummary,
    energy: &'a EnergySummary,
    annual_savings_czk: f64,
    investment: &'a InvestmentSummary,
    headline: IndexMap<&'static str, String>,
}

/// Write the results of a run as `balance.csv`, `monthly.csv`, `investment.csv` and
/// `summary.json`.
pub fn write_report(
    output: &impl Output,
    results: &RunResults,
    input: &Input,
) -> anyhow::Result<()> {
    if output.is_noop() {
        return Ok(());
    }

    write_csv(output, "balance", &results.records)?;

    let monthly_rows = results
        .monthly
        .iter()
        .map(|month| MonthlyReportRow {
            month_name: czech_month_name(month.month).unwrap_or_default(),
            consumption_kwh: month.consumption_kwh,
            production_kwh: month.production_kwh,
            grid_import_kwh: month.grid_import_kwh,
            grid_export_kwh: month.grid_export_kwh,
            self_consumption_kwh: month.self_consumption_kwh,
            savings_self_consumption_czk: month.savings_self_consumption_czk,
            revenue_export_czk: month.revenue_export_czk,
        })
        .collect::<Vec<_>>();
    write_csv(output, "monthly", &monthly_rows)?;

    write_csv(output, "investment", &results.investment)?;

    info!("writing out to summary");
    let mut writer = output.writer_for_location_key("summary", "json")?;
    serde_json::to_writer_pretty(
        &mut writer,
        &ReportSummary {
            input,
            financials: &results.financials,
            energy: &results.energy_summary,
            annual_savings_czk: results.annual_savings,
            investment: &results.investment_summary,
            headline: headline_figures(results),
        },
    )?;
    writer.flush()?;

    Ok(())
}

fn write_csv<T: Serialize>(
    output: &impl Output,
    location_key: &str,
    rows: &[T],
) -> anyhow::Result<()> {
    info!("writing out to {location_key}");
    let writer = output.writer_for_location_key(location_key, "csv")?;
    let mut writer = WriterBuilder::new().from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
