//! Display currencies and conversion
//!
//! Prices come from the backend in USD. The display currency is chosen by the
//! user and every price is converted through a static USD rate table before
//! formatting. Rates are a fixed snapshot and are not refreshed.

pub mod format;
pub mod store;

pub use format::{FormatOptions, format_amount, format_price_usd, format_price_with_currency};
pub use store::{CurrencyStore, SELECTED_CURRENCY_KEY};

use serde::Serialize;

/// A display currency and its rate relative to one US dollar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    /// Units of this currency per USD
    pub rate: f64,
    /// BCP 47 locale used for formatting
    pub locale: &'static str,
}

/// Supported display currencies. The first entry is the default.
pub static SUPPORTED_CURRENCIES: [Currency; 10] = [
    Currency { code: "USD", name: "US Dollar", symbol: "$", rate: 1.0, locale: "en-US" },
    Currency { code: "EUR", name: "Euro", symbol: "€", rate: 0.85, locale: "de-DE" },
    Currency { code: "GBP", name: "British Pound", symbol: "£", rate: 0.73, locale: "en-GB" },
    Currency { code: "JPY", name: "Japanese Yen", symbol: "¥", rate: 110.0, locale: "ja-JP" },
    Currency { code: "AUD", name: "Australian Dollar", symbol: "A$", rate: 1.35, locale: "en-AU" },
    Currency { code: "CAD", name: "Canadian Dollar", symbol: "C$", rate: 1.25, locale: "en-CA" },
    Currency { code: "CHF", name: "Swiss Franc", symbol: "CHF", rate: 0.92, locale: "de-CH" },
    Currency { code: "CNY", name: "Chinese Yuan", symbol: "¥", rate: 6.45, locale: "zh-CN" },
    Currency { code: "INR", name: "Indian Rupee", symbol: "₹", rate: 74.5, locale: "en-IN" },
    Currency { code: "SGD", name: "Singapore Dollar", symbol: "S$", rate: 1.35, locale: "en-SG" },
];

/// The fallback currency (USD)
#[must_use]
pub fn default_currency() -> &'static Currency {
    &SUPPORTED_CURRENCIES[0]
}

/// Look up a supported currency by exact ISO code
#[must_use]
pub fn find_currency(code: &str) -> Option<&'static Currency> {
    SUPPORTED_CURRENCIES.iter().find(|c| c.code == code)
}

/// Rate for `code`; unknown codes are treated as USD.
#[must_use]
pub fn rate_of(code: &str) -> f64 {
    match find_currency(code) {
        Some(currency) => currency.rate,
        None => {
            tracing::debug!("Unknown currency '{}', using USD rate", code);
            1.0
        }
    }
}

/// Convert `amount` from one currency to another via USD.
#[must_use]
pub fn convert_between(amount: f64, from_code: &str, to_code: &str) -> f64 {
    let usd = amount / rate_of(from_code);
    usd * rate_of(to_code)
}
