//! Listing filters
//!
//! Client-side search, type, price and sort handling shared by the property
//! and package listing pages.

pub mod engine;
pub mod state;

pub use engine::{FieldValue, FilterConfig, Filterable, apply_filters};
pub use state::{ALL_TYPES, FilterPanel, FilterState, FilterUpdate, SortBy};
