use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PvBalanceError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),
    #[error(transparent)]
    MisalignedSeries(#[from] MisalignedSeriesError),
    #[error("Error while writing output: {0}")]
    ErrorInOutput(OutputError),
}

/// An error representing a non-physical input, rejected before any computation starts.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("Invalid parameter `{parameter}`: {reason}")]
pub struct InvalidParameterError {
    parameter: String,
    reason: String,
}

impl InvalidParameterError {
    pub(crate) fn new(parameter: &str, reason: impl Into<String>) -> Self {
        Self {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Reject the value unless it is finite and not negative.
    pub(crate) fn ensure_non_negative(parameter: &str, value: f64) -> Result<f64, Self> {
        if !value.is_finite() {
            return Err(Self::new(parameter, format!("must be finite, got {value}")));
        }
        if value < 0. {
            return Err(Self::new(
                parameter,
                format!("must not be negative, got {value}"),
            ));
        }
        Ok(value)
    }

    /// Reject growth rates (in percent) that are not finite or would wipe out the whole value.
    pub(crate) fn ensure_rate_pct(parameter: &str, value_pct: f64) -> Result<f64, Self> {
        if !value_pct.is_finite() {
            return Err(Self::new(
                parameter,
                format!("must be finite, got {value_pct}"),
            ));
        }
        if value_pct <= -100. {
            return Err(Self::new(
                parameter,
                format!("must be greater than -100 %, got {value_pct} %"),
            ));
        }
        Ok(value_pct)
    }
}

/// The consumption and production series do not share one timestamp axis.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MisalignedSeriesError {
    #[error("misaligned time series: consumption has {consumption} intervals but production has {production}")]
    LengthMismatch { consumption: usize, production: usize },
    #[error("misaligned time series: interval {index} is {consumption} in consumption but {production} in production")]
    TimestampMismatch {
        index: usize,
        consumption: NaiveDateTime,
        production: NaiveDateTime,
    },
    #[error("misaligned time series: interval {index} at {timestamp} does not follow its predecessor")]
    NotAscending {
        index: usize,
        timestamp: NaiveDateTime,
    },
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    fn should_accept_zero_as_non_negative() {
        assert_eq!(
            InvalidParameterError::ensure_non_negative("capacity", 0.),
            Ok(0.)
        );
    }

    #[rstest]
    #[case(-0.5)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn should_reject_negative_or_non_finite(#[case] value: f64) {
        let error = InvalidParameterError::ensure_non_negative("capacity", value).unwrap_err();
        assert_eq!(error.parameter(), "capacity");
    }

    #[rstest]
    fn should_reject_rate_that_wipes_out_value() {
        assert!(InvalidParameterError::ensure_rate_pct("inflation_pct", -100.).is_err());
        assert!(InvalidParameterError::ensure_rate_pct("inflation_pct", -5.).is_ok());
    }

    #[rstest]
    fn misaligned_messages_are_prefixed() {
        let error = MisalignedSeriesError::LengthMismatch {
            consumption: 3,
            production: 2,
        };
        assert!(error.to_string().starts_with("misaligned time series"));
    }
}
