use crate::core::economics::tariff::Tariff;
use crate::core::energy_supply::energy_balance::BalanceRecord;
use crate::errors::InvalidParameterError;
use chrono::Datelike;
use itertools::Itertools;
use serde::Serialize;

/// Annual totals and costs derived from a balance series
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    #[serde(rename = "total_import_kWh")]
    pub total_import_kwh: f64,
    #[serde(rename = "total_export_kWh")]
    pub total_export_kwh: f64,
    pub cost_without_pv_czk: f64,
    pub cost_with_pv_czk: f64,
    pub savings_czk: f64,
}

/// Reduce a balance series to its totals and the cost with and without the PV system.
///
/// Arguments:
/// * `records` - the balance series (any subset may be passed, but normally the full year)
/// * `price_buy` - price paid for imported energy (CZK/kWh)
/// * `price_sell` - price received for exported energy (CZK/kWh)
pub fn aggregate_financials(
    records: &[BalanceRecord],
    price_buy: f64,
    price_sell: f64,
) -> Result<FinancialSummary, InvalidParameterError> {
    let price_buy = InvalidParameterError::ensure_non_negative("price_buy", price_buy)?;
    let price_sell = InvalidParameterError::ensure_non_negative("price_sell", price_sell)?;

    let total_import_kwh = records.iter().map(|r| r.grid_import_kwh).sum::<f64>();
    let total_export_kwh = records.iter().map(|r| r.grid_export_kwh).sum::<f64>();
    let total_consumption_kwh = records.iter().map(|r| r.consumption_kwh).sum::<f64>();

    let cost_without_pv_czk = total_consumption_kwh * price_buy;
    let cost_with_pv_czk = total_import_kwh * price_buy - total_export_kwh * price_sell;

    Ok(FinancialSummary {
        total_import_kwh,
        total_export_kwh,
        cost_without_pv_czk,
        cost_with_pv_czk,
        savings_czk: cost_without_pv_czk - cost_with_pv_czk,
    })
}

/// Energy flows and their value over a whole balance series
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct EnergySummary {
    pub total_consumption_kwh: f64,
    pub total_production_kwh: f64,
    pub total_import_kwh: f64,
    pub total_export_kwh: f64,
    pub self_consumption_kwh: f64,
    /// share of production used on site
    pub self_consumption_ratio: f64,
    /// share of consumption not bought from the grid
    pub self_sufficiency_ratio: f64,
    /// what the whole consumption would cost bought from the grid
    pub cost_total_consumption_czk: f64,
    pub cost_import_czk: f64,
    pub revenue_export_czk: f64,
    pub savings_self_consumption_czk: f64,
}

impl EnergySummary {
    pub fn from_records(records: &[BalanceRecord], tariff: &Tariff) -> Self {
        let total_consumption_kwh = records.iter().map(|r| r.consumption_kwh).sum::<f64>();
        let total_production_kwh = records.iter().map(|r| r.production_kwh).sum::<f64>();
        let total_import_kwh = records.iter().map(|r| r.grid_import_kwh).sum::<f64>();
        let total_export_kwh = records.iter().map(|r| r.grid_export_kwh).sum::<f64>();
        let self_consumption_kwh = total_production_kwh - total_export_kwh;

        Self {
            total_consumption_kwh,
            total_production_kwh,
            total_import_kwh,
            total_export_kwh,
            self_consumption_kwh,
            self_consumption_ratio: ratio_or_zero(self_consumption_kwh, total_production_kwh),
            self_sufficiency_ratio: if total_consumption_kwh > 0. {
                1. - total_import_kwh / total_consumption_kwh
            } else {
                0.
            },
            cost_total_consumption_czk: total_consumption_kwh * tariff.price_buy(),
            cost_import_czk: total_import_kwh * tariff.price_buy(),
            revenue_export_czk: total_export_kwh * tariff.price_sell(),
            savings_self_consumption_czk: self_consumption_kwh * tariff.price_buy(),
        }
    }
}

fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0. {
        numerator / denominator
    } else {
        0.
    }
}

/// Totals for one calendar month of a balance series
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    /// 1-based calendar month
    pub month: u32,
    #[serde(rename = "consumption_kWh")]
    pub consumption_kwh: f64,
    #[serde(rename = "production_kWh")]
    pub production_kwh: f64,
    #[serde(rename = "grid_import_kWh")]
    pub grid_import_kwh: f64,
    #[serde(rename = "grid_export_kWh")]
    pub grid_export_kwh: f64,
    #[serde(rename = "self_consumption_kWh")]
    pub self_consumption_kwh: f64,
    pub savings_self_consumption_czk: f64,
    pub revenue_export_czk: f64,
}

/// Sum the balance series per calendar month, in timestamp order.
pub fn monthly_summaries(records: &[BalanceRecord], tariff: &Tariff) -> Vec<MonthlySummary> {
    records
        .iter()
        .chunk_by(|record| (record.timestamp.year(), record.timestamp.month()))
        .into_iter()
        .map(|((year, month), month_records)| {
            let mut summary = MonthlySummary {
                year,
                month,
                consumption_kwh: 0.,
                production_kwh: 0.,
                grid_import_kwh: 0.,
                grid_export_kwh: 0.,
                self_consumption_kwh: 0.,
                savings_self_consumption_czk: 0.,
                revenue_export_czk: 0.,
            };
            for record in month_records {
                summary.consumption_kwh += record.consumption_kwh;
                summary.production_kwh += record.production_kwh;
                summary.grid_import_kwh += record.grid_import_kwh;
                summary.grid_export_kwh += record.grid_export_kwh;
            }
            summary.self_consumption_kwh = summary.production_kwh - summary.grid_export_kwh;
            summary.savings_self_consumption_czk =
                summary.self_consumption_kwh * tariff.price_buy();
            summary.revenue_export_czk = summary.grid_export_kwh * tariff.price_sell();
            summary
        })
        .collect()
}
