use crate::core::economics::financials::{
    aggregate_financials, monthly_summaries, EnergySummary, FinancialSummary, MonthlySummary,
};
use crate::core::economics::investment::{
    InvestmentParameters, InvestmentSummary, InvestmentTrajectoryRow,
};
use crate::core::economics::tariff::Tariff;
use crate::core::energy_supply::elec_battery::{BatteryState, ElectricBattery};
use crate::core::energy_supply::energy_balance::{
    join_series, records_for_date, simulate_intervals, BalanceRecord, TimeSeriesInterval,
};
use crate::core::profile_generator::{EnergySample, ProfileGenerator};
use crate::errors::{InvalidParameterError, PvBalanceError};
use crate::input::Input;
use crate::simulation_time::SimulationTime;
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info};

/// A validated scenario, ready to run. Every parameter is checked when the corpus is built, so a
/// run only fails on problems with the generated series themselves.
#[derive(Clone, Debug)]
pub struct Corpus {
    simulation_time: SimulationTime,
    seed: u64,
    annual_consumption_kwh: Option<f64>,
    peak_power_kwp: f64,
    battery: ElectricBattery,
    tariff: Tariff,
    investment: InvestmentParameters,
    annual_savings_override: Option<f64>,
}

impl Corpus {
    pub fn from_inputs(input: &Input) -> Result<Self, InvalidParameterError> {
        let annual_consumption_kwh = input
            .consumption
            .annual_consumption_kwh
            .map(|target| {
                InvalidParameterError::ensure_non_negative("annual_consumption_kwh", target)
            })
            .transpose()?;
        let annual_savings_override = input
            .investment
            .annual_savings_override
            .map(|savings| {
                if savings.is_finite() {
                    Ok(savings)
                } else {
                    Err(InvalidParameterError::new(
                        "annual_savings_override",
                        format!("must be finite, got {savings}"),
                    ))
                }
            })
            .transpose()?;

        Ok(Self {
            simulation_time: SimulationTime::calendar_year(input.simulation_year)?,
            seed: input.seed,
            annual_consumption_kwh,
            peak_power_kwp: InvalidParameterError::ensure_non_negative(
                "peak_power_kwp",
                input.photovoltaic_system.peak_power_kwp,
            )?,
            battery: ElectricBattery::new(input.electric_battery.capacity_kwh)?,
            tariff: Tariff::new(
                input.tariff.price_power,
                input.tariff.price_distribution,
                input.tariff.price_sell,
            )?,
            investment: InvestmentParameters::new(
                input.investment.initial_cost,
                input.investment.years,
                input.investment.market_return_pct,
                input.investment.inflation_pct,
            )?,
            annual_savings_override,
        })
    }

    /// Generate the consumption and production series. Both come from one random stream seeded
    /// from the scenario, consumption first, so the same scenario always yields the same series.
    pub fn generate_profiles(
        &self,
    ) -> Result<(Vec<EnergySample>, Vec<EnergySample>), InvalidParameterError> {
        let mut generator = ProfileGenerator::new(self.simulation_time.clone(), self.seed);
        let consumption = generator.generate_consumption_profile(self.annual_consumption_kwh)?;
        let production = generator.generate_production_profile(self.peak_power_kwp)?;

        Ok((consumption, production))
    }

    fn intervals(&self) -> Result<Vec<TimeSeriesInterval>, PvBalanceError> {
        let (consumption, production) = self.generate_profiles()?;
        join_series(&consumption, &production)
    }

    pub fn run(&self) -> Result<RunResults, PvBalanceError> {
        info!(
            steps = self.simulation_time.total_steps(),
            battery_capacity_kwh = self.battery.capacity(),
            peak_power_kwp = self.peak_power_kwp,
            "running scenario"
        );

        let intervals = self.intervals()?;
        let balance = simulate_intervals(&intervals, &self.battery, self.battery.empty());

        let financials = aggregate_financials(
            &balance.records,
            self.tariff.price_buy(),
            self.tariff.price_sell(),
        )?;
        let energy_summary = EnergySummary::from_records(&balance.records, &self.tariff);
        let monthly = monthly_summaries(&balance.records, &self.tariff);
        debug!(
            total_import_kwh = financials.total_import_kwh,
            total_export_kwh = financials.total_export_kwh,
            savings_czk = financials.savings_czk,
            "aggregated financials"
        );

        let annual_savings = match self.annual_savings_override {
            Some(savings) => {
                info!(savings, "projecting investment with supplied annual savings");
                savings
            }
            None => financials.savings_czk,
        };
        let investment = self.investment.project(annual_savings)?;
        let investment_summary = InvestmentSummary::from_rows(&investment).ok_or_else(|| {
            InvalidParameterError::new("years", "investment projection has no years")
        })?;

        info!(
            savings_czk = financials.savings_czk,
            payback = %investment_summary.payback,
            "scenario complete"
        );

        Ok(RunResults {
            records: balance.records,
            final_state: balance.final_state,
            financials,
            energy_summary,
            monthly,
            annual_savings,
            investment,
            investment_summary,
        })
    }

    /// Simulate the scenario's profiles against each battery capacity in turn, returning the
    /// financial summary of each in the order the capacities were given.
    ///
    /// The profiles are generated once and shared. Every capacity is validated before any
    /// simulation starts.
    pub fn sweep_battery_capacities(
        &self,
        capacities_kwh: &[f64],
    ) -> Result<Vec<(f64, FinancialSummary)>, PvBalanceError> {
        let batteries = capacities_kwh
            .iter()
            .map(|capacity| ElectricBattery::new(*capacity))
            .collect::<Result<Vec<_>, _>>()?;
        let intervals = self.intervals()?;
        info!(capacities = batteries.len(), "sweeping battery capacities");

        let summaries = batteries
            .par_iter()
            .map(|battery| {
                let balance = simulate_intervals(&intervals, battery, battery.empty());
                let summary = aggregate_financials(
                    &balance.records,
                    self.tariff.price_buy(),
                    self.tariff.price_sell(),
                )?;
                Ok((battery.capacity(), summary))
            })
            .collect::<Result<Vec<_>, InvalidParameterError>>()?;

        Ok(summaries)
    }
}

/// Everything a scenario run produces
#[derive(Clone, Debug, PartialEq)]
pub struct RunResults {
    pub records: Vec<BalanceRecord>,
    pub final_state: BatteryState,
    pub financials: FinancialSummary,
    pub energy_summary: EnergySummary,
    pub monthly: Vec<MonthlySummary>,
    /// first-year savings the investment was projected with (CZK)
    pub annual_savings: f64,
    pub investment: Vec<InvestmentTrajectoryRow>,
    pub investment_summary: InvestmentSummary,
}

impl RunResults {
    /// The hourly balance of one day, e.g. for charting a daily profile.
    pub fn daily_profile(&self, date: NaiveDate) -> Vec<BalanceRecord> {
        records_for_date(&self.records, date)
    }
}
