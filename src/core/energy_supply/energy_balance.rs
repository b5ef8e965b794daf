use crate::core::energy_supply::elec_battery::{BatteryState, ElectricBattery};
use crate::core::profile_generator::EnergySample;
use crate::errors::{InvalidParameterError, MisalignedSeriesError, PvBalanceError};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

/// One interval of the joined consumption/production series
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSeriesInterval {
    pub timestamp: NaiveDateTime,
    pub consumption_kwh: f64,
    pub production_kwh: f64,
}

/// One interval of the simulated energy balance
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BalanceRecord {
    #[serde(rename = "datetime")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "consumption_kWh")]
    pub consumption_kwh: f64,
    #[serde(rename = "production_kWh")]
    pub production_kwh: f64,
    #[serde(rename = "grid_import_kWh")]
    pub grid_import_kwh: f64,
    #[serde(rename = "grid_export_kWh")]
    pub grid_export_kwh: f64,
    #[serde(rename = "battery_charge_kWh")]
    pub battery_charge_kwh: f64,
    #[serde(rename = "battery_discharge_kWh")]
    pub battery_discharge_kwh: f64,
    /// state of charge at the end of the interval
    #[serde(rename = "battery_soc_kWh")]
    pub battery_soc_kwh: f64,
}

impl BalanceRecord {
    /// Production used on site, either directly or by charging the battery.
    pub fn self_consumption_kwh(&self) -> f64 {
        self.production_kwh - self.grid_export_kwh
    }
}

/// The balance series for a whole simulation, along with the battery state it ended in.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyBalance {
    pub records: Vec<BalanceRecord>,
    pub final_state: BatteryState,
}

/// Join consumption and production on their timestamps.
///
/// The two series must share one strictly ascending timestamp axis, interval by interval, and
/// every energy value must be finite and non-negative.
pub fn join_series(
    consumption: &[EnergySample],
    production: &[EnergySample],
) -> Result<Vec<TimeSeriesInterval>, PvBalanceError> {
    if consumption.len() != production.len() {
        return Err(MisalignedSeriesError::LengthMismatch {
            consumption: consumption.len(),
            production: production.len(),
        }
        .into());
    }

    let mut intervals: Vec<TimeSeriesInterval> = Vec::with_capacity(consumption.len());
    for (index, (consumed, produced)) in consumption.iter().zip(production).enumerate() {
        if consumed.timestamp != produced.timestamp {
            return Err(MisalignedSeriesError::TimestampMismatch {
                index,
                consumption: consumed.timestamp,
                production: produced.timestamp,
            }
            .into());
        }
        if let Some(previous) = intervals.last() {
            if consumed.timestamp <= previous.timestamp {
                return Err(MisalignedSeriesError::NotAscending {
                    index,
                    timestamp: consumed.timestamp,
                }
                .into());
            }
        }
        intervals.push(TimeSeriesInterval {
            timestamp: consumed.timestamp,
            consumption_kwh: InvalidParameterError::ensure_non_negative(
                "consumption_kwh",
                consumed.energy_kwh,
            )?,
            production_kwh: InvalidParameterError::ensure_non_negative(
                "production_kwh",
                produced.energy_kwh,
            )?,
        });
    }

    Ok(intervals)
}

/// Simulate the energy balance of a year of consumption and production against a battery that
/// starts empty.
///
/// Arguments:
/// * `consumption` - hourly consumption series (kWh)
/// * `production` - hourly production series (kWh), on the same timestamp axis
/// * `battery_capacity_kwh` - usable battery capacity; zero simulates a grid-only system
pub fn simulate_balance(
    consumption: &[EnergySample],
    production: &[EnergySample],
    battery_capacity_kwh: f64,
) -> Result<Vec<BalanceRecord>, PvBalanceError> {
    let battery = ElectricBattery::new(battery_capacity_kwh)?;
    let intervals = join_series(consumption, production)?;

    Ok(simulate_intervals(&intervals, &battery, battery.empty()).records)
}

/// Step through the intervals in order, threading the battery state from one to the next.
pub fn simulate_intervals(
    intervals: &[TimeSeriesInterval],
    battery: &ElectricBattery,
    initial_state: BatteryState,
) -> EnergyBalance {
    let mut state = initial_state;
    let records = intervals
        .iter()
        .map(|interval| {
            let (next_state, flows) = battery.charge_discharge_battery(
                state,
                interval.production_kwh,
                interval.consumption_kwh,
            );
            state = next_state;
            BalanceRecord {
                timestamp: interval.timestamp,
                consumption_kwh: interval.consumption_kwh,
                production_kwh: interval.production_kwh,
                grid_import_kwh: flows.grid_import,
                grid_export_kwh: flows.grid_export,
                battery_charge_kwh: flows.battery_charge,
                battery_discharge_kwh: flows.battery_discharge,
                battery_soc_kwh: state.energy_stored(),
            }
        })
        .collect::<Vec<_>>();

    debug!(
        intervals = records.len(),
        final_energy_stored = state.energy_stored(),
        "simulated energy balance"
    );

    EnergyBalance {
        records,
        final_state: state,
    }
}

/// The records falling on one calendar date, in order.
pub fn records_for_date(records: &[BalanceRecord], date: NaiveDate) -> Vec<BalanceRecord> {
    records
        .iter()
        .filter(|record| record.timestamp.date() == date)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn hour(index: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::hours(index)
    }

    fn series(values: &[f64]) -> Vec<EnergySample> {
        values
            .iter()
            .enumerate()
            .map(|(i, energy_kwh)| EnergySample {
                timestamp: hour(i as i64),
                energy_kwh: *energy_kwh,
            })
            .collect()
    }

    #[fixture]
    fn consumption() -> Vec<EnergySample> {
        series(&[1., 1., 0.5, 2., 3., 0.2])
    }

    #[fixture]
    fn production() -> Vec<EnergySample> {
        series(&[0., 3., 2., 0., 0.5, 0.2])
    }

    #[rstest]
    fn should_carry_state_of_charge_between_intervals(
        consumption: Vec<EnergySample>,
        production: Vec<EnergySample>,
    ) {
        let records = simulate_balance(&consumption, &production, 2.5).unwrap();
        let soc = records.iter().map(|r| r.battery_soc_kwh).collect::<Vec<_>>();
        let import = records.iter().map(|r| r.grid_import_kwh).collect::<Vec<_>>();
        let export = records.iter().map(|r| r.grid_export_kwh).collect::<Vec<_>>();

        let expected_soc = [0., 2., 2.5, 0.5, 0., 0.];
        let expected_import = [1., 0., 0., 0., 2., 0.];
        let expected_export = [0., 0., 1., 0., 0., 0.];
        for i in 0..records.len() {
            assert_relative_eq!(soc[i], expected_soc[i], max_relative = 1e-12);
            assert_relative_eq!(import[i], expected_import[i], max_relative = 1e-12);
            assert_relative_eq!(export[i], expected_export[i], max_relative = 1e-12);
        }
    }

    #[rstest]
    fn single_interval_surplus_scenario() {
        let records = simulate_balance(&series(&[1.]), &series(&[3.]), 1.).unwrap();
        assert_eq!(
            records,
            vec![BalanceRecord {
                timestamp: hour(0),
                consumption_kwh: 1.,
                production_kwh: 3.,
                grid_import_kwh: 0.,
                grid_export_kwh: 1.,
                battery_charge_kwh: 1.,
                battery_discharge_kwh: 0.,
                battery_soc_kwh: 1.,
            }]
        );
    }

    #[rstest]
    fn single_interval_deficit_scenario_from_part_charged_battery() {
        let battery = ElectricBattery::new(1.).unwrap();
        let intervals = join_series(&series(&[3.]), &series(&[1.])).unwrap();
        let balance = simulate_intervals(
            &intervals,
            &battery,
            battery.state_with_energy_stored(0.5).unwrap(),
        );
        let record = balance.records[0];
        assert_relative_eq!(record.battery_discharge_kwh, 0.5);
        assert_relative_eq!(record.grid_import_kwh, 1.5);
        assert_relative_eq!(record.battery_charge_kwh, 0.);
        assert_relative_eq!(record.grid_export_kwh, 0.);
        assert_relative_eq!(record.battery_soc_kwh, 0.);
        assert_eq!(balance.final_state, battery.empty());
    }

    #[rstest]
    fn should_reject_series_of_different_length(consumption: Vec<EnergySample>) {
        let result = simulate_balance(&consumption, &consumption[1..], 1.);
        assert!(matches!(
            result,
            Err(PvBalanceError::MisalignedSeries(
                MisalignedSeriesError::LengthMismatch {
                    consumption: 6,
                    production: 5
                }
            ))
        ));
    }

    #[rstest]
    fn should_reject_shifted_timestamps(
        consumption: Vec<EnergySample>,
        mut production: Vec<EnergySample>,
    ) {
        for sample in production.iter_mut() {
            sample.timestamp += TimeDelta::hours(1);
        }
        let result = simulate_balance(&consumption, &production, 1.);
        assert!(matches!(
            result,
            Err(PvBalanceError::MisalignedSeries(
                MisalignedSeriesError::TimestampMismatch { index: 0, .. }
            ))
        ));
    }

    #[rstest]
    fn should_reject_duplicate_timestamps() {
        let mut consumption = series(&[1., 1., 1.]);
        consumption[2].timestamp = consumption[1].timestamp;
        let production = consumption.clone();
        let result = join_series(&consumption, &production);
        assert!(matches!(
            result,
            Err(PvBalanceError::MisalignedSeries(
                MisalignedSeriesError::NotAscending { index: 2, .. }
            ))
        ));
    }

    #[rstest]
    fn should_reject_negative_energy(consumption: Vec<EnergySample>) {
        let production = series(&[0., -3., 2., 0., 0.5, 0.2]);
        assert!(matches!(
            simulate_balance(&consumption, &production, 1.),
            Err(PvBalanceError::InvalidParameter(_))
        ));
    }

    #[rstest]
    fn should_reject_negative_capacity(
        consumption: Vec<EnergySample>,
        production: Vec<EnergySample>,
    ) {
        assert!(matches!(
            simulate_balance(&consumption, &production, -2.),
            Err(PvBalanceError::InvalidParameter(_))
        ));
    }

    #[rstest]
    fn empty_series_give_empty_balance() {
        assert_eq!(simulate_balance(&[], &[], 5.).unwrap(), vec![]);
    }

    #[rstest]
    fn should_select_records_for_one_date() {
        let consumption = series(&[0.5; 30]);
        let records = simulate_balance(&consumption, &consumption, 0.).unwrap();
        let next_day = records_for_date(&records, NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
        assert_eq!(next_day.len(), 6);
        assert_eq!(next_day[0].timestamp, hour(24));
    }
}
