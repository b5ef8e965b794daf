use crate::core::units::{DAYS_PER_YEAR, HOURS_PER_DAY};
use crate::errors::InvalidParameterError;
use crate::simulation_time::{SimulationTime, SimulationTimeIteration};
use chrono::NaiveDateTime;
use rand::distr::Uniform;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64;
use serde::Serialize;
use std::f64::consts::PI;
use tracing::{debug, warn};

// This module generates synthetic hourly consumption and PV production series. It stands in for
// metered data: anything replacing it only has to produce non-negative energies on a shared
// timestamp axis.

/// Day of the year on which the seasonal consumption term is at its peak (mid-January).
const CONSUMPTION_SEASONAL_PEAK_DAY: f64 = 15.;
/// Day of the year on which the seasonal production factor peaks (summer solstice).
const PRODUCTION_SEASONAL_PEAK_DAY: f64 = 172.;
/// Hour at which the sun rises; the daylight factor is a half-sine from here to sunset.
const SUNRISE_HOUR: f64 = 6.;
const DAYLIGHT_HOURS: f64 = 12.;
const WEATHER_FACTOR_MIN: f64 = 0.2;
const WEATHER_FACTOR_MAX: f64 = 1.0;
pub const DEFAULT_SEED: u64 = 42;

/// Energy over one interval of the simulation time axis
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EnergySample {
    pub timestamp: NaiveDateTime,
    pub energy_kwh: f64,
}

/// Shape of the synthetic household load (all terms in kWh per hour)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConsumptionProfileShape {
    pub base_load: f64,
    pub seasonal_amplitude: f64,
    pub daily_amplitude: f64,
    pub noise_std_dev: f64,
}

impl Default for ConsumptionProfileShape {
    fn default() -> Self {
        Self {
            base_load: 0.5,
            seasonal_amplitude: 0.2,
            daily_amplitude: 0.3,
            noise_std_dev: 0.1,
        }
    }
}

impl ConsumptionProfileShape {
    /// Unscaled load for one hour, before noise and clamping
    fn deterministic_load(&self, simtime: &SimulationTimeIteration) -> f64 {
        let day_of_year = simtime.day_of_year() as f64;
        let hour = simtime.hour_of_day() as f64;
        let seasonal = self.seasonal_amplitude
            * ((day_of_year - CONSUMPTION_SEASONAL_PEAK_DAY) * 2. * PI / DAYS_PER_YEAR as f64)
                .cos();
        let daily = self.daily_amplitude
            * ((hour - SUNRISE_HOUR) * 2. * PI / HOURS_PER_DAY as f64).sin();

        self.base_load + seasonal + daily
    }
}

/// Generates the consumption and production series for one simulation time axis.
///
/// Randomness comes from an owned, seeded generator so that the same seed always gives the
/// same profiles. Consumption and production draw from the same stream, in call order.
#[derive(Debug)]
pub struct ProfileGenerator {
    simulation_time: SimulationTime,
    consumption_shape: ConsumptionProfileShape,
    rng: Pcg64,
}

impl ProfileGenerator {
    pub fn new(simulation_time: SimulationTime, seed: u64) -> Self {
        Self {
            simulation_time,
            consumption_shape: Default::default(),
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    pub fn with_consumption_shape(mut self, consumption_shape: ConsumptionProfileShape) -> Self {
        self.consumption_shape = consumption_shape;
        self
    }

    pub fn simulation_time(&self) -> &SimulationTime {
        &self.simulation_time
    }

    /// Generate hourly household consumption (kWh).
    ///
    /// Arguments:
    /// * `target_annual_kwh` - when given, the series is rescaled linearly so that it sums to
    ///                         this total (unless the unscaled series sums to zero or less)
    pub fn generate_consumption_profile(
        &mut self,
        target_annual_kwh: Option<f64>,
    ) -> Result<Vec<EnergySample>, InvalidParameterError> {
        if let Some(target) = target_annual_kwh {
            InvalidParameterError::ensure_non_negative("target_annual_kwh", target)?;
        }
        let noise = Normal::new(0., self.consumption_shape.noise_std_dev)
            .map_err(|e| InvalidParameterError::new("noise_std_dev", e.to_string()))?;

        let mut samples = self
            .simulation_time
            .iter()
            .map(|simtime| {
                let load = self.consumption_shape.deterministic_load(&simtime)
                    + noise.sample(&mut self.rng);
                EnergySample {
                    timestamp: simtime.timestamp,
                    energy_kwh: load.max(0.),
                }
            })
            .collect::<Vec<_>>();

        let unscaled_total = samples.iter().map(|s| s.energy_kwh).sum::<f64>();
        debug!(unscaled_total, "generated consumption profile");

        if let Some(target) = target_annual_kwh {
            if unscaled_total > 0. {
                let scaling_factor = target / unscaled_total;
                for sample in samples.iter_mut() {
                    sample.energy_kwh *= scaling_factor;
                }
            } else {
                warn!(
                    unscaled_total,
                    target, "consumption profile sums to zero, skipping scaling to target"
                );
            }
        }

        Ok(samples)
    }

    /// Generate hourly PV production (kWh) for a system of the given peak power.
    ///
    /// Arguments:
    /// * `installed_kwp` - installed peak power of the PV system (kWp)
    pub fn generate_production_profile(
        &mut self,
        installed_kwp: f64,
    ) -> Result<Vec<EnergySample>, InvalidParameterError> {
        InvalidParameterError::ensure_non_negative("installed_kwp", installed_kwp)?;
        let weather = Uniform::new_inclusive(WEATHER_FACTOR_MIN, WEATHER_FACTOR_MAX)
            .map_err(|e| InvalidParameterError::new("weather_factor", e.to_string()))?;

        let samples = self
            .simulation_time
            .iter()
            .map(|simtime| {
                let weather_factor = weather.sample(&mut self.rng);
                EnergySample {
                    timestamp: simtime.timestamp,
                    energy_kwh: installed_kwp
                        * daylight_factor(&simtime)
                        * seasonal_production_factor(&simtime)
                        * weather_factor,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            total = samples.iter().map(|s| s.energy_kwh).sum::<f64>(),
            installed_kwp, "generated production profile"
        );

        Ok(samples)
    }
}

/// Zero before sunrise and after sunset, a half-sine peaking at solar noon in between.
fn daylight_factor(simtime: &SimulationTimeIteration) -> f64 {
    let hour = simtime.hour_of_day() as f64;
    ((hour - SUNRISE_HOUR) * PI / DAYLIGHT_HOURS).sin().max(0.)
}

/// Between 0 and 1, peaking at the summer solstice.
fn seasonal_production_factor(simtime: &SimulationTimeIteration) -> f64 {
    let day_of_year = simtime.day_of_year() as f64;
    0.5 + 0.5 * ((day_of_year - PRODUCTION_SEASONAL_PEAK_DAY) * 2. * PI / DAYS_PER_YEAR as f64)
        .cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn profile_generator() -> ProfileGenerator {
        ProfileGenerator::new(SimulationTime::calendar_year(2024).unwrap(), DEFAULT_SEED)
    }

    #[rstest]
    #[case(5_000.)]
    #[case(1.)]
    #[case(123_456.7)]
    fn should_scale_consumption_to_target(
        mut profile_generator: ProfileGenerator,
        #[case] target: f64,
    ) {
        let consumption = profile_generator
            .generate_consumption_profile(Some(target))
            .unwrap();
        let total = consumption.iter().map(|s| s.energy_kwh).sum::<f64>();
        assert_relative_eq!(total, target, max_relative = 1e-9);
    }

    #[rstest]
    fn consumption_should_be_non_negative_and_hourly(mut profile_generator: ProfileGenerator) {
        let consumption = profile_generator.generate_consumption_profile(None).unwrap();
        assert_eq!(consumption.len(), 8784);
        assert!(consumption.iter().all(|s| s.energy_kwh >= 0.));
        assert!(consumption
            .windows(2)
            .all(|pair| pair[1].timestamp - pair[0].timestamp == chrono::TimeDelta::hours(1)));
    }

    #[rstest]
    fn consumption_without_noise_follows_shape() {
        let mut generator =
            ProfileGenerator::new(SimulationTime::calendar_year(2023).unwrap(), DEFAULT_SEED)
                .with_consumption_shape(ConsumptionProfileShape {
                    noise_std_dev: 0.,
                    ..Default::default()
                });
        let consumption = generator.generate_consumption_profile(None).unwrap();
        // 15th January, 12:00: seasonal term at its peak, daily term sin(pi / 2)
        let index = 14 * 24 + 12;
        assert_relative_eq!(consumption[index].energy_kwh, 0.5 + 0.2 + 0.3);
        // 15th January, 00:00: daily term sin(-pi / 2)
        assert_relative_eq!(consumption[14 * 24].energy_kwh, 0.5 + 0.2 - 0.3);
    }

    #[rstest]
    fn should_clamp_negative_consumption_to_zero() {
        let mut generator =
            ProfileGenerator::new(SimulationTime::calendar_year(2024).unwrap(), DEFAULT_SEED)
                .with_consumption_shape(ConsumptionProfileShape {
                    base_load: -10.,
                    ..Default::default()
                });
        let consumption = generator
            .generate_consumption_profile(Some(5_000.))
            .unwrap();
        // nothing to scale, so the profile is left at zero
        assert!(consumption.iter().all(|s| s.energy_kwh == 0.));
    }

    #[rstest]
    fn should_reject_negative_target(mut profile_generator: ProfileGenerator) {
        assert!(profile_generator
            .generate_consumption_profile(Some(-1.))
            .is_err());
    }

    #[rstest]
    fn production_should_be_zero_at_night(mut profile_generator: ProfileGenerator) {
        let production = profile_generator.generate_production_profile(10.).unwrap();
        assert_eq!(production.len(), 8784);
        for (sample, simtime) in production
            .iter()
            .zip(profile_generator.simulation_time().iter())
        {
            assert!(sample.energy_kwh >= 0.);
            if simtime.hour_of_day() <= 6 || simtime.hour_of_day() >= 18 {
                assert!(sample.energy_kwh < 1e-9, "{sample:?}");
            }
        }
    }

    #[rstest]
    fn production_should_be_bounded_by_installed_power(mut profile_generator: ProfileGenerator) {
        let production = profile_generator.generate_production_profile(7.5).unwrap();
        assert!(production.iter().all(|s| s.energy_kwh <= 7.5));
        let summer_total = production[(171 * 24)..(172 * 24)]
            .iter()
            .map(|s| s.energy_kwh)
            .sum::<f64>();
        let winter_total = production[0..24].iter().map(|s| s.energy_kwh).sum::<f64>();
        assert!(summer_total > winter_total);
    }

    #[rstest]
    fn weather_factor_should_stay_within_range(mut profile_generator: ProfileGenerator) {
        let production = profile_generator.generate_production_profile(1.).unwrap();
        for (simtime, sample) in profile_generator.simulation_time().iter().zip(&production) {
            let clear_sky = daylight_factor(&simtime) * seasonal_production_factor(&simtime);
            if clear_sky > 1e-6 {
                let weather_factor = sample.energy_kwh / clear_sky;
                assert!(weather_factor >= WEATHER_FACTOR_MIN - 1e-9, "{sample:?}");
                assert!(weather_factor <= WEATHER_FACTOR_MAX + 1e-9, "{sample:?}");
            }
        }
    }

    #[rstest]
    fn zero_installed_power_produces_nothing(mut profile_generator: ProfileGenerator) {
        let production = profile_generator.generate_production_profile(0.).unwrap();
        assert!(production.iter().all(|s| s.energy_kwh == 0.));
    }

    #[rstest]
    fn should_reject_negative_installed_power(mut profile_generator: ProfileGenerator) {
        assert!(profile_generator.generate_production_profile(-1.).is_err());
    }

    #[rstest]
    fn same_seed_gives_same_profiles() {
        let simtime = SimulationTime::calendar_year(2024).unwrap();
        let mut first = ProfileGenerator::new(simtime.clone(), 7);
        let mut second = ProfileGenerator::new(simtime, 7);
        assert_eq!(
            first.generate_consumption_profile(Some(4_000.)).unwrap(),
            second.generate_consumption_profile(Some(4_000.)).unwrap()
        );
        assert_eq!(
            first.generate_production_profile(5.).unwrap(),
            second.generate_production_profile(5.).unwrap()
        );
    }

    #[rstest]
    fn daylight_factor_peaks_at_noon() {
        let simtime = SimulationTime::calendar_year(2024).unwrap();
        let noon = simtime.iter().nth(12).unwrap();
        assert_relative_eq!(daylight_factor(&noon), 1.);
    }
}
