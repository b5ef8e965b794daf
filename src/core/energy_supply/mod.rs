pub mod elec_battery;
pub mod energy_balance;
