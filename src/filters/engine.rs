//! Generic in-memory filter and sort over listing items

use super::state::{FilterState, SortBy};

/// Dynamically typed value of a listing field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Missing,
}

impl FieldValue {
    /// Empty text, zero, NaN, `false` and missing values are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Text(text) => !text.is_empty(),
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Bool(b) => *b,
            FieldValue::Missing => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(text) => Some(text.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Missing => None,
        }
    }

    /// Numeric coercion; text that does not parse and missing values are NaN,
    /// blank text is zero.
    #[must_use]
    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            FieldValue::Number(n) => *n,
            FieldValue::Bool(b) => f64::from(u8::from(*b)),
            FieldValue::Missing => f64::NAN,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Missing, Into::into)
    }
}

/// Field access for items the engine can filter.
///
/// `rating`, `review_count` and `featured` back the corresponding sort orders
/// and default to missing for item types without them.
pub trait Filterable {
    type Field;

    fn field(&self, field: &Self::Field) -> FieldValue;

    fn rating(&self) -> FieldValue {
        FieldValue::Missing
    }

    fn review_count(&self) -> FieldValue {
        FieldValue::Missing
    }

    fn featured(&self) -> FieldValue {
        FieldValue::Missing
    }
}

/// Which fields a listing page searches, filters and sorts on
#[derive(Debug, Clone)]
pub struct FilterConfig<F> {
    pub search_fields: Vec<F>,
    pub type_field: Option<F>,
    pub price_field: Option<F>,
    pub max_price: f64,
}

impl<F> FilterConfig<F> {
    #[must_use]
    pub fn new(search_fields: Vec<F>, max_price: f64) -> Self {
        Self {
            search_fields,
            type_field: None,
            price_field: None,
            max_price,
        }
    }

    #[must_use]
    pub fn with_type_field(mut self, field: F) -> Self {
        self.type_field = Some(field);
        self
    }

    #[must_use]
    pub fn with_price_field(mut self, field: F) -> Self {
        self.price_field = Some(field);
        self
    }
}

/// Filter then sort `data`, returning the surviving items in display order.
pub fn apply_filters<T>(data: &[T], config: &FilterConfig<T::Field>, state: &FilterState) -> Vec<T>
where
    T: Filterable + Clone,
{
    let needle = state.search_term.to_lowercase();
    let type_filter = state.type_filter();
    let (min_price, max_price) = state.price_range;

    let mut result: Vec<T> = data
        .iter()
        .filter(|item| needle.is_empty() || matches_search(*item, &config.search_fields, &needle))
        .filter(|item| match (type_filter, &config.type_field) {
            (Some(wanted), Some(field)) => {
                item.field(field).as_text().as_deref() == Some(wanted)
            }
            _ => true,
        })
        .filter(|item| match &config.price_field {
            Some(field) => {
                let price = item.field(field).as_number();
                price >= min_price && price <= max_price
            }
            None => true,
        })
        .cloned()
        .collect();

    sort_items(&mut result, config, state.sort_by);

    tracing::debug!(
        total = data.len(),
        matched = result.len(),
        sort = %state.sort_by,
        "Applied listing filters"
    );
    result
}

fn matches_search<T: Filterable>(item: &T, fields: &[T::Field], needle: &str) -> bool {
    fields.iter().any(|field| {
        let value = item.field(field);
        value.is_truthy()
            && value
                .as_text()
                .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}

fn sort_items<T: Filterable>(items: &mut Vec<T>, config: &FilterConfig<T::Field>, sort_by: SortBy) {
    match sort_by {
        SortBy::PriceLow | SortBy::PriceHigh => {
            let Some(field) = &config.price_field else {
                return;
            };
            items.sort_by(|a, b| {
                let ordering = a.field(field).as_number().total_cmp(&b.field(field).as_number());
                if sort_by == SortBy::PriceHigh {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        SortBy::Rating => sort_present_descending(items, T::rating),
        SortBy::Reviews => sort_present_descending(items, T::review_count),
        SortBy::Featured => {
            items.sort_by(|a, b| b.featured().is_truthy().cmp(&a.featured().is_truthy()));
        }
    }
}

/// Sort items that carry a truthy key, descending, within the slots they
/// already occupy. Items without the key keep their positions.
fn sort_present_descending<T>(items: &mut Vec<T>, key: impl Fn(&T) -> FieldValue) {
    let mut slots = Vec::new();
    let mut keyed = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let value = key(item);
        let number = value.as_number();
        if value.is_truthy() && !number.is_nan() {
            slots.push(index);
            keyed.push((number, index));
        }
    }

    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut order: Vec<usize> = (0..items.len()).collect();
    for (slot, (_, source)) in slots.into_iter().zip(keyed) {
        order[slot] = source;
    }

    let mut taken: Vec<Option<T>> = items.drain(..).map(Some).collect();
    items.extend(order.into_iter().filter_map(|source| taken[source].take()));
}
