//! The selected display currency and its persistence

use super::format::{FormatOptions, format_amount};
use super::{Currency, SUPPORTED_CURRENCIES, convert_between, default_currency, find_currency};
use crate::storage::PreferenceStore;
use crate::{Result, TravelError};
use tracing::{debug, info, warn};

/// Storage key holding the selected currency code
pub const SELECTED_CURRENCY_KEY: &str = "selectedCurrency";

/// Holds the user's display currency.
///
/// `change_currency` is the only mutator; the selection is written through to
/// the preference store so the next [`CurrencyStore::rehydrate`] restores it.
pub struct CurrencyStore<P> {
    selected: &'static Currency,
    prefs: P,
}

impl<P: PreferenceStore> CurrencyStore<P> {
    /// Restore the saved selection, falling back to USD when nothing usable
    /// is stored.
    pub fn rehydrate(prefs: P) -> Self {
        let selected = match prefs.get_pref(SELECTED_CURRENCY_KEY) {
            Ok(Some(code)) => find_currency(&code).unwrap_or_else(|| {
                warn!("Saved currency '{}' is not supported, using default", code);
                default_currency()
            }),
            Ok(None) => default_currency(),
            Err(e) => {
                warn!("Could not read saved currency: {}", e);
                default_currency()
            }
        };
        debug!("Display currency: {}", selected.code);
        Self { selected, prefs }
    }

    #[must_use]
    pub fn selected(&self) -> &'static Currency {
        self.selected
    }

    #[must_use]
    pub fn currencies(&self) -> &'static [Currency] {
        &SUPPORTED_CURRENCIES
    }

    /// Switch the display currency. Unknown codes leave the selection as is.
    pub fn change_currency(&mut self, code: &str) -> Result<&'static Currency> {
        let currency = find_currency(code)
            .ok_or_else(|| TravelError::validation(format!("unsupported currency '{code}'")))?;

        self.selected = currency;
        if let Err(e) = self.prefs.set_pref(SELECTED_CURRENCY_KEY, currency.code) {
            warn!("Currency selection not persisted: {}", e);
        }
        info!("Display currency changed to {}", currency.code);
        Ok(currency)
    }

    /// Convert `price` from `from_code` into the selected currency.
    #[must_use]
    pub fn convert_price(&self, price: f64, from_code: &str) -> f64 {
        convert_between(price, from_code, self.selected.code)
    }

    /// Convert a USD price and format it for the selected currency.
    #[must_use]
    pub fn format_price(&self, price: f64, options: FormatOptions) -> String {
        let converted = self.convert_price(price, "USD");
        format_amount(converted, self.selected.code, self.selected.locale, options)
    }
}
