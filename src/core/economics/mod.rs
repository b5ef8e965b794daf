pub mod financials;
pub mod investment;
pub mod tariff;
