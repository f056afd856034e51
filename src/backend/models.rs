//! Listing records served by the booking backend
//!
//! The backend is loose about types (decimals arrive as strings, nested
//! objects may be absent), so every field has a default and prices keep
//! their wire form until the filter engine coerces them.

use crate::filters::{FieldValue, Filterable};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A decimal sent either as a JSON string (`"120.00"`) or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Text(String),
    Number(f64),
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Text("0".to_string())
    }
}

impl Amount {
    /// Numeric value; unparseable text is zero.
    #[must_use]
    pub fn value(&self) -> f64 {
        match self {
            Amount::Text(text) => text.trim().parse().unwrap_or(0.0),
            Amount::Number(n) => *n,
        }
    }
}

impl From<&Amount> for FieldValue {
    fn from(amount: &Amount) -> Self {
        match amount {
            Amount::Text(text) => FieldValue::Text(text.clone()),
            Amount::Number(n) => FieldValue::Number(*n),
        }
    }
}

/// Paginated (`{"results": [...]}`) or bare list responses
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse<T> {
    Paginated { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListResponse<T> {
    pub(crate) fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Paginated { results } => results,
            ListResponse::Plain(items) => items,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingLocation {
    #[serde(default)]
    pub island: String,
    #[serde(default)]
    pub atoll: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyType {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price_per_night: Amount,
    #[serde(default)]
    pub location: Option<ListingLocation>,
    #[serde(default)]
    pub property_type: Option<PropertyType>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Vec<serde_json::Value>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
}

/// Property fields the filter engine can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum PropertyField {
    Name,
    Description,
    Island,
    Atoll,
    PropertyType,
    PricePerNight,
}

impl Filterable for Property {
    type Field = PropertyField;

    fn field(&self, field: &PropertyField) -> FieldValue {
        match field {
            PropertyField::Name => self.name.as_str().into(),
            PropertyField::Description => self.description.as_str().into(),
            PropertyField::Island => self.location.as_ref().map(|l| l.island.as_str()).into(),
            PropertyField::Atoll => self.location.as_ref().map(|l| l.atoll.as_str()).into(),
            PropertyField::PropertyType => {
                self.property_type.as_ref().map(|t| t.name.as_str()).into()
            }
            PropertyField::PricePerNight => (&self.price_per_night).into(),
        }
    }

    fn rating(&self) -> FieldValue {
        self.rating.into()
    }

    fn review_count(&self) -> FieldValue {
        // reviews are counted client-side; an empty list reads as no reviews
        FieldValue::Number(self.reviews.len() as f64)
    }

    fn featured(&self) -> FieldValue {
        self.is_featured.into()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Amount,
    /// Length in days
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Package {
    /// Islands of the bundled properties, in order.
    #[must_use]
    pub fn destinations(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter_map(|p| p.location.as_ref())
            .map(|l| l.island.as_str())
            .filter(|island| !island.is_empty())
            .collect()
    }
}

/// Package fields the filter engine can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum PackageField {
    Name,
    Description,
    Category,
    Price,
    Duration,
}

impl Filterable for Package {
    type Field = PackageField;

    fn field(&self, field: &PackageField) -> FieldValue {
        match field {
            PackageField::Name => self.name.as_str().into(),
            PackageField::Description => self.description.as_str().into(),
            PackageField::Category => self.category.as_deref().into(),
            PackageField::Price => (&self.price).into(),
            PackageField::Duration => self.duration.map(f64::from).into(),
        }
    }

    fn featured(&self) -> FieldValue {
        self.is_featured.into()
    }
}
