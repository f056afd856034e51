//! Nominatim response records and the parsed island/atoll location

use serde::{Deserialize, Serialize};

/// Island placeholder when no name could be extracted
pub const UNKNOWN_ISLAND: &str = "Unknown Island";
/// Atoll placeholder when no name could be extracted
pub const UNKNOWN_ATOLL: &str = "Unknown Atoll";

/// A single Nominatim place record.
///
/// Every field is optional on the wire; error payloads such as
/// `{"error": "Unable to geocode"}` deserialize to an empty place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub place_id: Option<u64>,
    #[serde(default)]
    pub display_name: String,
    /// Latitude as sent by Nominatim (a decimal string)
    #[serde(default)]
    pub lat: String,
    /// Longitude as sent by Nominatim (a decimal string)
    #[serde(default)]
    pub lon: String,
    #[serde(default, rename = "type")]
    pub place_type: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

/// Structured address components of a [`Place`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub island: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub hamlet: Option<String>,
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

/// Island and atoll extracted from a place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub island: String,
    pub atoll: String,
    pub full_name: String,
}

impl LocationData {
    #[must_use]
    pub fn is_unknown_island(&self) -> bool {
        self.island == UNKNOWN_ISLAND
    }
}

/// A search result the user picked, with parsed coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub data: LocationData,
}
