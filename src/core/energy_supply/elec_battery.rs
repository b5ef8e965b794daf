use crate::errors::InvalidParameterError;

/// An object to represent an electric battery system.
///
/// The battery itself holds no running state: the energy stored is carried between intervals
/// as a [`BatteryState`] that is passed into each dispatch step and handed back updated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElectricBattery {
    /// the maximum capacity of the battery (kWh)
    capacity: f64,
}

/// The energy stored in a battery at the end of an interval (kWh)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BatteryState {
    energy_stored: f64,
}

impl BatteryState {
    pub fn energy_stored(&self) -> f64 {
        self.energy_stored
    }
}

/// Energy flows resulting from dispatching the battery over one interval (all kWh, all >= 0)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DispatchFlows {
    pub grid_import: f64,
    pub grid_export: f64,
    pub battery_charge: f64,
    pub battery_discharge: f64,
}

impl ElectricBattery {
    /// Arguments:
    /// * `capacity` - the maximum capacity of the battery (kWh); zero means no battery
    pub fn new(capacity: f64) -> Result<Self, InvalidParameterError> {
        Ok(Self {
            capacity: InvalidParameterError::ensure_non_negative("battery_capacity_kwh", capacity)?,
        })
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// An empty battery, the state every simulation starts from.
    pub fn empty(&self) -> BatteryState {
        BatteryState::default()
    }

    /// A battery state holding the given energy, which must lie within the capacity.
    pub fn state_with_energy_stored(
        &self,
        energy_stored: f64,
    ) -> Result<BatteryState, InvalidParameterError> {
        let energy_stored =
            InvalidParameterError::ensure_non_negative("energy_stored", energy_stored)?;
        if energy_stored > self.capacity {
            return Err(InvalidParameterError::new(
                "energy_stored",
                format!(
                    "{energy_stored} kWh exceeds battery capacity of {} kWh",
                    self.capacity
                ),
            ));
        }
        Ok(BatteryState { energy_stored })
    }

    /// Dispatch the battery for one interval.
    ///
    /// Surplus production charges the battery up to its capacity and the rest is exported.
    /// Otherwise the deficit (which may be zero) is covered from the battery down to empty and
    /// the rest is imported. Production exactly matching consumption is a no-op interval.
    ///
    /// Arguments:
    /// * `state` - energy stored at the end of the previous interval
    /// * `production` - energy produced on site in this interval (kWh)
    /// * `consumption` - energy consumed on site in this interval (kWh)
    pub fn charge_discharge_battery(
        &self,
        state: BatteryState,
        production: f64,
        consumption: f64,
    ) -> (BatteryState, DispatchFlows) {
        let surplus = production - consumption;

        if surplus > 0. {
            // cannot overfill
            let charge = surplus.min(self.capacity - state.energy_stored).max(0.);
            let energy_stored = (state.energy_stored + charge).min(self.capacity);
            (
                BatteryState { energy_stored },
                DispatchFlows {
                    grid_export: surplus - charge,
                    battery_charge: charge,
                    ..Default::default()
                },
            )
        } else {
            let deficit = consumption - production;
            // cannot draw below empty
            let discharge = deficit.min(state.energy_stored);
            let energy_stored = (state.energy_stored - discharge).max(0.);
            (
                BatteryState { energy_stored },
                DispatchFlows {
                    grid_import: deficit - discharge,
                    battery_discharge: discharge,
                    ..Default::default()
                },
            )
        }
    }
}
