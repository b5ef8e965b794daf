//! This module projects, year by year, the PV investment against putting the same money into a
//! market index instead.
//!
//! Three wealth paths are followed:
//! * PV cashflow - the purchase price paid up front, then each year's energy savings banked
//! * PV with reinvestment - each year's savings paid into the market index
//! * market index - the purchase price invested instead of buying PV, while the full
//!   electricity bill keeps being paid

use crate::core::units::growth_factor_from_pct;
use crate::errors::InvalidParameterError;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// One year of the investment comparison (all values in CZK)
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct InvestmentTrajectoryRow {
    #[serde(rename = "Year")]
    pub year: u32,
    #[serde(rename = "PV_Cumulative_CashFlow")]
    pub pv_cumulative_cashflow: f64,
    #[serde(rename = "PV_Reinvest_Net_Result")]
    pub pv_reinvest_net_result: f64,
    #[serde(rename = "SP500_Gross_Gain")]
    pub sp500_gross_gain: f64,
    #[serde(rename = "SP500_Net_Result")]
    pub sp500_net_result: f64,
    #[serde(rename = "SP500_Total_Value")]
    pub sp500_total_value: f64,
}

/// Running values carried from one year to the next
#[derive(Clone, Copy, Debug)]
struct WealthState {
    current_savings: f64,
    cumulative_savings: f64,
    pv_cumulative_cashflow: f64,
    reinvest_value: f64,
    sp500_value: f64,
}

impl WealthState {
    fn initial(initial_cost: f64, annual_savings: f64) -> Self {
        Self {
            current_savings: annual_savings,
            cumulative_savings: 0.,
            pv_cumulative_cashflow: -initial_cost,
            reinvest_value: 0.,
            sp500_value: initial_cost,
        }
    }

    /// Advance by one year. Savings grow with energy prices before they are applied.
    fn next_year(self, market_growth: f64, savings_growth: f64) -> Self {
        let current_savings = self.current_savings * savings_growth;
        Self {
            current_savings,
            cumulative_savings: self.cumulative_savings + current_savings,
            pv_cumulative_cashflow: self.pv_cumulative_cashflow + current_savings,
            reinvest_value: self.reinvest_value * market_growth + current_savings,
            sp500_value: self.sp500_value * market_growth,
        }
    }

    fn row(&self, year: u32, initial_cost: f64) -> InvestmentTrajectoryRow {
        let sp500_gross_gain = self.sp500_value - initial_cost;
        InvestmentTrajectoryRow {
            year,
            pv_cumulative_cashflow: self.pv_cumulative_cashflow,
            pv_reinvest_net_result: self.reinvest_value - initial_cost,
            sp500_gross_gain,
            // the market investor still pays the bills the PV owner saves
            sp500_net_result: sp500_gross_gain - self.cumulative_savings,
            sp500_total_value: self.sp500_value,
        }
    }
}

/// Longest horizon a projection may cover.
pub const MAX_HORIZON_YEARS: i32 = 100;

/// Validated parameters of an investment projection, everything but the annual savings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvestmentParameters {
    initial_cost: f64,
    years: u32,
    market_growth: f64,
    savings_growth: f64,
}

impl InvestmentParameters {
    /// Arguments:
    /// * `initial_cost` - purchase price of the PV system (CZK)
    /// * `years` - horizon in years, from 1 to [`MAX_HORIZON_YEARS`]
    /// * `market_return_pct` - annual return of the market index (%)
    /// * `inflation_pct` - annual growth of energy prices, and so of the savings (%)
    pub fn new(
        initial_cost: f64,
        years: i32,
        market_return_pct: f64,
        inflation_pct: f64,
    ) -> Result<Self, InvalidParameterError> {
        if !(1..=MAX_HORIZON_YEARS).contains(&years) {
            return Err(InvalidParameterError::new(
                "years",
                format!("horizon must be between 1 and {MAX_HORIZON_YEARS} years, got {years}"),
            ));
        }
        Ok(Self {
            initial_cost: InvalidParameterError::ensure_non_negative("initial_cost", initial_cost)?,
            years: years as u32,
            market_growth: growth_factor_from_pct(InvalidParameterError::ensure_rate_pct(
                "market_return_pct",
                market_return_pct,
            )?),
            savings_growth: growth_factor_from_pct(InvalidParameterError::ensure_rate_pct(
                "inflation_pct",
                inflation_pct,
            )?),
        })
    }

    /// Project the three wealth paths for the given first-year savings (CZK), which may be
    /// negative. Returns one row per year from 0 to the horizon inclusive.
    pub fn project(
        &self,
        annual_savings: f64,
    ) -> Result<Vec<InvestmentTrajectoryRow>, InvalidParameterError> {
        if !annual_savings.is_finite() {
            return Err(InvalidParameterError::new(
                "annual_savings",
                format!("must be finite, got {annual_savings}"),
            ));
        }

        let mut state = WealthState::initial(self.initial_cost, annual_savings);
        let mut rows = Vec::with_capacity(self.years as usize + 1);
        rows.push(state.row(0, self.initial_cost));
        for year in 1..=self.years {
            state = state.next_year(self.market_growth, self.savings_growth);
            rows.push(state.row(year, self.initial_cost));
        }

        Ok(rows)
    }
}

/// Project the three wealth paths over the horizon.
///
/// Arguments:
/// * `initial_cost` - purchase price of the PV system (CZK)
/// * `annual_savings` - energy savings in the first year before energy price growth (CZK)
/// * `years` - horizon in years, at least 1
/// * `market_return_pct` - annual return of the market index (%)
/// * `inflation_pct` - annual growth of energy prices, and so of the savings (%)
pub fn project_investment(
    initial_cost: f64,
    annual_savings: f64,
    years: i32,
    market_return_pct: f64,
    inflation_pct: f64,
) -> Result<Vec<InvestmentTrajectoryRow>, InvalidParameterError> {
    InvestmentParameters::new(initial_cost, years, market_return_pct, inflation_pct)?
        .project(annual_savings)
}

/// First year in which the cumulative PV cashflow is no longer negative.
pub fn payback_year(rows: &[InvestmentTrajectoryRow]) -> Payback {
    rows.iter()
        .find(|row| row.pv_cumulative_cashflow >= 0.)
        .map(|row| Payback::Year(row.year))
        .unwrap_or_else(|| Payback::BeyondHorizon(rows.last().map_or(0, |row| row.year)))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payback {
    Year(u32),
    /// Not paid back within the horizon (the last projected year).
    BeyondHorizon(u32),
}

impl Payback {
    pub fn year(&self) -> Option<u32> {
        match self {
            Payback::Year(year) => Some(*year),
            Payback::BeyondHorizon(_) => None,
        }
    }
}

impl Display for Payback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Payback::Year(year) => write!(f, "{year}"),
            Payback::BeyondHorizon(horizon) => write!(f, "> {horizon}"),
        }
    }
}

/// Headline figures of an investment projection (all values in CZK)
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct InvestmentSummary {
    pub payback: Payback,
    pub final_pv_gain: f64,
    pub final_pv_reinvest_gain: f64,
    pub final_sp500_net: f64,
    /// what reinvesting the savings adds over banking them
    pub reinvest_boost: f64,
    pub sp500_vs_reinvest: f64,
}

impl InvestmentSummary {
    pub fn from_rows(rows: &[InvestmentTrajectoryRow]) -> Option<Self> {
        let last = rows.last()?;
        Some(Self {
            payback: payback_year(rows),
            final_pv_gain: last.pv_cumulative_cashflow,
            final_pv_reinvest_gain: last.pv_reinvest_net_result,
            final_sp500_net: last.sp500_net_result,
            reinvest_boost: last.pv_reinvest_net_result - last.pv_cumulative_cashflow,
            sp500_vs_reinvest: last.sp500_net_result - last.pv_reinvest_net_result,
        })
    }
}
