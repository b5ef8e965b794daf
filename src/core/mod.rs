pub mod economics;
pub mod energy_supply;
pub mod profile_generator;
pub mod units;
