use crate::errors::InvalidParameterError;
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

/// An hourly (or other fixed-step) time axis. Both ends are inclusive, so a calendar year
/// runs from 1st January 00:00 to 31st December 23:00.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationTime {
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    step: TimeDelta,
}

impl SimulationTime {
    pub fn new(
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        step: TimeDelta,
    ) -> Result<Self, InvalidParameterError> {
        if step <= TimeDelta::zero() {
            return Err(InvalidParameterError::new("step", "must be positive"));
        }
        if end_time < start_time {
            return Err(InvalidParameterError::new(
                "end_time",
                format!("{end_time} is before start time {start_time}"),
            ));
        }
        Ok(Self {
            start_time,
            end_time,
            step,
        })
    }

    /// Hourly axis covering the whole of the given year (8784 steps in a leap year, 8760 otherwise).
    pub fn calendar_year(year: i32) -> Result<Self, InvalidParameterError> {
        let first_hour = NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        let last_hour =
            NaiveDate::from_ymd_opt(year, 12, 31).and_then(|d| d.and_hms_opt(23, 0, 0));
        match (first_hour, last_hour) {
            (Some(start), Some(end)) => Self::new(start, end, TimeDelta::hours(1)),
            _ => Err(InvalidParameterError::new(
                "simulation_year",
                format!("{year} is outside the supported calendar range"),
            )),
        }
    }

    pub fn total_steps(&self) -> usize {
        ((self.end_time - self.start_time).num_seconds() / self.step.num_seconds()) as usize + 1
    }

    pub fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator::from(self.clone())
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.iter().map(|t| t.timestamp).collect()
    }
}

#[derive(Clone, Debug)]
pub struct SimulationTimeIterator {
    current_index: usize,
    /// `None` once the axis is exhausted or the next step is beyond the calendar range
    current_time: Option<NaiveDateTime>,
    simulation_time: SimulationTime,
}

impl SimulationTimeIterator {
    fn from(simulation_time: SimulationTime) -> Self {
        SimulationTimeIterator {
            current_index: 0,
            current_time: Some(simulation_time.start_time),
            simulation_time,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationTimeIteration {
    pub index: usize,
    pub timestamp: NaiveDateTime,
}

impl SimulationTimeIteration {
    pub fn hour_of_day(&self) -> u32 {
        self.timestamp.hour()
    }

    /// 1-based day of the year (1st January is day 1).
    pub fn day_of_year(&self) -> u32 {
        self.timestamp.ordinal()
    }

    /// 1-based calendar month.
    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }
}

impl Iterator for SimulationTimeIterator {
    type Item = SimulationTimeIteration;

    fn next(&mut self) -> Option<Self::Item> {
        let timestamp = self
            .current_time
            .filter(|time| *time <= self.simulation_time.end_time)?;
        let iteration = SimulationTimeIteration {
            index: self.current_index,
            timestamp,
        };
        self.current_index += 1;
        self.current_time = timestamp.checked_add_signed(self.simulation_time.step);
        Some(iteration)
    }
}
