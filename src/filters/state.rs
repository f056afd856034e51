//! Filter panel state: the current search/type/price/sort selection

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Sentinel type value that disables the type filter
pub const ALL_TYPES: &str = "all";

/// Sort orders offered by listing pages
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortBy {
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    Rating,
    Reviews,
}

impl SortBy {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SortBy::Featured => "Featured",
            SortBy::PriceLow => "Price: Low to High",
            SortBy::PriceHigh => "Price: High to Low",
            SortBy::Rating => "Highest Rated",
            SortBy::Reviews => "Most Reviewed",
        }
    }

    /// Parse loosely; anything unrecognised sorts as featured.
    #[must_use]
    pub fn from_loose(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// `(value, label)` pairs for a sort dropdown
    pub fn options() -> impl Iterator<Item = (&'static str, &'static str)> {
        SortBy::iter().map(|sort| (sort.into(), sort.label()))
    }
}

/// Current filter selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_term: String,
    pub item_type: String,
    /// Inclusive `(min, max)`; keeping `min <= max` is up to the caller
    pub price_range: (f64, f64),
    pub sort_by: SortBy,
}

impl FilterState {
    #[must_use]
    pub fn new(max_price: f64) -> Self {
        Self {
            search_term: String::new(),
            item_type: ALL_TYPES.to_string(),
            price_range: (0.0, max_price),
            sort_by: SortBy::Featured,
        }
    }

    /// Apply a single field change
    pub fn update(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::SearchTerm(term) => self.search_term = term,
            FilterUpdate::ItemType(item_type) => self.item_type = item_type,
            FilterUpdate::PriceRange(min, max) => self.price_range = (min, max),
            FilterUpdate::SortBy(sort_by) => self.sort_by = sort_by,
        }
    }

    /// Reset to defaults for the given price ceiling
    pub fn clear(&mut self, max_price: f64) {
        *self = Self::new(max_price);
    }

    #[must_use]
    pub fn type_filter(&self) -> Option<&str> {
        (self.item_type != ALL_TYPES).then_some(self.item_type.as_str())
    }
}

/// One field change of a [`FilterState`]
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    SearchTerm(String),
    ItemType(String),
    PriceRange(f64, f64),
    SortBy(SortBy),
}

/// Filter state plus the collapsible panel flag
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPanel {
    pub filters: FilterState,
    pub show_filters: bool,
    max_price: f64,
}

impl FilterPanel {
    #[must_use]
    pub fn new(max_price: f64) -> Self {
        Self {
            filters: FilterState::new(max_price),
            show_filters: false,
            max_price,
        }
    }

    pub fn update_filter(&mut self, update: FilterUpdate) {
        self.filters.update(update);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear(self.max_price);
    }

    pub fn toggle_filters(&mut self) {
        self.show_filters = !self.show_filters;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = FilterState::new(2000.0);
        assert_eq!(state.search_term, "");
        assert_eq!(state.item_type, "all");
        assert_eq!(state.price_range, (0.0, 2000.0));
        assert_eq!(state.sort_by, SortBy::Featured);
        assert_eq!(state.type_filter(), None);
    }

    #[test]
    fn test_sort_by_string_forms() {
        assert_eq!("price-low".parse::<SortBy>().unwrap(), SortBy::PriceLow);
        assert_eq!(SortBy::PriceHigh.to_string(), "price-high");
        assert_eq!(SortBy::from_loose("bogus"), SortBy::Featured);
        assert_eq!(SortBy::options().count(), 5);
        assert_eq!(
            SortBy::options().next(),
            Some(("featured", "Featured"))
        );
    }

    #[test]
    fn test_panel_update_clear_toggle() {
        let mut panel = FilterPanel::new(1000.0);
        panel.update_filter(FilterUpdate::SearchTerm("maafushi".into()));
        panel.update_filter(FilterUpdate::ItemType("resort".into()));
        panel.update_filter(FilterUpdate::PriceRange(100.0, 400.0));
        panel.update_filter(FilterUpdate::SortBy(SortBy::Rating));
        assert_eq!(panel.filters.type_filter(), Some("resort"));
        assert_eq!(panel.filters.price_range, (100.0, 400.0));

        panel.toggle_filters();
        assert!(panel.show_filters);

        panel.clear_filters();
        assert_eq!(panel.filters, FilterState::new(1000.0));
        assert!(panel.show_filters);
    }
}
