//! Geocoding for Maldivian islands
//!
//! Free-text search and reverse lookup against a Nominatim service, and the
//! heuristics that turn its loosely structured answers into an island and
//! atoll name.

pub mod client;
pub mod models;
pub mod parser;
pub mod resolver;
pub mod search;

pub use client::{GeocodingClient, PlaceLookup, RateLimiter};
pub use models::{Address, LocationData, Place, SelectedLocation, UNKNOWN_ATOLL, UNKNOWN_ISLAND};
pub use parser::{ExtractionStrategy, is_settlement_like, parse_location, pick_best_match};
pub use resolver::{LocationResolver, select_place};
pub use search::{SearchSession, SearchState};
