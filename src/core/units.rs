pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_YEAR: u32 = 365;
pub const MONTHS_PER_YEAR: u32 = 12;

/// Convert a percentage (e.g. 8.0 for 8 %) into a growth factor (1.08).
pub fn growth_factor_from_pct(rate_pct: f64) -> f64 {
    1. + rate_pct / 100.
}
