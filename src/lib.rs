//! `atoll-travel` - client core for a Maldives travel-booking site
//!
//! Listing filters, display-currency conversion, island geocoding and
//! booking arithmetic, independent of any UI.

pub mod backend;
pub mod booking;
pub mod config;
pub mod currency;
pub mod error;
pub mod filters;
pub mod geocoding;
pub mod logging;
pub mod storage;

#[cfg(test)]
mod test_support;

// Re-export core types for public API
pub use backend::{BackendClient, Package, Property, SessionRole, SessionTokens};
pub use booking::{BookingKind, BookingSummary, nights_between, parse_and_count, total_price};
pub use config::AppConfig;
pub use currency::{Currency, CurrencyStore, FormatOptions, SUPPORTED_CURRENCIES};
pub use error::TravelError;
pub use filters::{FilterConfig, FilterState, Filterable, SortBy, apply_filters};
pub use geocoding::{
    GeocodingClient, LocationData, LocationResolver, Place, PlaceLookup, SearchSession,
};
pub use storage::{MemoryPreferences, PersistentStore, PreferenceStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
