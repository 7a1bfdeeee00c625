// Display currency conversion. Rates are injected as a plain table by
// the caller; the booking computation itself always stays in the base
// currency, conversion is for presentation only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRateTable {
    pub base: String,
    // Currency code -> multiplier against the base currency.
    pub rates: HashMap<String, f64>,
}

impl ExchangeRateTable {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, code: &str, multiplier: f64) -> Self {
        self.rates.insert(code.to_string(), multiplier);
        self
    }

    /// Converts a base-currency amount for display. Unknown currencies
    /// yield `None`; the caller falls back to the base currency.
    pub fn display_amount(&self, amount: f64, currency: &str) -> Option<f64> {
        if currency == self.base {
            return Some(amount);
        }
        self.rates.get(currency).map(|multiplier| amount * multiplier)
    }
}
