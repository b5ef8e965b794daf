use crate::core::profile_generator::DEFAULT_SEED;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Read};

pub fn ingest_for_processing(json: impl Read) -> Result<Input, anyhow::Error> {
    let reader = BufReader::new(json);

    Ok(serde_json::from_reader(reader)?)
}

/// A scenario to simulate. Every part may be left out of the JSON document, in which case the
/// default scenario's values are used.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "PascalCase", deny_unknown_fields, default)]
pub struct Input {
    /// Calendar year providing the hourly timestamp axis
    pub simulation_year: i32,
    /// Seed for the random noise in the consumption profile and the weather in the production profile
    pub seed: u64,
    pub consumption: ConsumptionInput,
    pub photovoltaic_system: PhotovoltaicSystemInput,
    pub electric_battery: ElectricBatteryInput,
    pub tariff: TariffInput,
    pub investment: InvestmentInput,
}

const DEFAULT_SIMULATION_YEAR: i32 = 2024;

impl Default for Input {
    fn default() -> Self {
        Self {
            simulation_year: DEFAULT_SIMULATION_YEAR,
            seed: DEFAULT_SEED,
            consumption: Default::default(),
            photovoltaic_system: Default::default(),
            electric_battery: Default::default(),
            tariff: Default::default(),
            investment: Default::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(deny_unknown_fields, default)]
pub struct ConsumptionInput {
    /// Annual total the consumption profile is scaled to (kWh). Null leaves the profile unscaled.
    pub annual_consumption_kwh: Option<f64>,
}

impl Default for ConsumptionInput {
    fn default() -> Self {
        Self {
            annual_consumption_kwh: Some(5_000.),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(deny_unknown_fields, default)]
pub struct PhotovoltaicSystemInput {
    /// Installed peak power (kWp)
    pub peak_power_kwp: f64,
}

impl Default for PhotovoltaicSystemInput {
    fn default() -> Self {
        Self {
            peak_power_kwp: 10.,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(deny_unknown_fields, default)]
pub struct ElectricBatteryInput {
    /// Usable capacity (kWh); zero for a system without a battery
    pub capacity_kwh: f64,
}

impl Default for ElectricBatteryInput {
    fn default() -> Self {
        Self { capacity_kwh: 10. }
    }
}

/// Prices in CZK/kWh
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(deny_unknown_fields, default)]
pub struct TariffInput {
    pub price_power: f64,
    pub price_distribution: f64,
    pub price_sell: f64,
}

impl Default for TariffInput {
    fn default() -> Self {
        Self {
            price_power: 3.,
            price_distribution: 2.,
            price_sell: 2.,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(deny_unknown_fields, default)]
pub struct InvestmentInput {
    /// Purchase price of the PV system (CZK)
    pub initial_cost: f64,
    /// Horizon of the projection in years
    pub years: i32,
    /// Annual return of the alternative market investment (%)
    pub market_return_pct: f64,
    /// Annual growth of energy prices (%)
    pub inflation_pct: f64,
    /// Annual savings to project with instead of the simulated figure (CZK)
    pub annual_savings_override: Option<f64>,
}

impl Default for InvestmentInput {
    fn default() -> Self {
        Self {
            initial_cost: 350_000.,
            years: 20,
            market_return_pct: 8.,
            inflation_pct: 3.,
            annual_savings_override: None,
        }
    }
}
