use crate::errors::InvalidParameterError;

/// Electricity prices (currency per kWh). The price paid for imported energy is made up of the
/// power price and the distribution price; exported energy is paid at the sell price.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tariff {
    price_power: f64,
    price_distribution: f64,
    price_sell: f64,
}

impl Tariff {
    pub fn new(
        price_power: f64,
        price_distribution: f64,
        price_sell: f64,
    ) -> Result<Self, InvalidParameterError> {
        Ok(Self {
            price_power: InvalidParameterError::ensure_non_negative("price_power", price_power)?,
            price_distribution: InvalidParameterError::ensure_non_negative(
                "price_distribution",
                price_distribution,
            )?,
            price_sell: InvalidParameterError::ensure_non_negative("price_sell", price_sell)?,
        })
    }

    pub fn price_buy(&self) -> f64 {
        self.price_power + self.price_distribution
    }

    pub fn price_sell(&self) -> f64 {
        self.price_sell
    }
}
