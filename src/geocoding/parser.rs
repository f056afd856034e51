//! Island/atoll extraction from Nominatim places
//!
//! Each field is filled by the first [`ExtractionStrategy`] that yields a
//! non-empty value, tried in [`ExtractionStrategy::ORDER`].

use super::models::{Address, LocationData, Place, UNKNOWN_ATOLL, UNKNOWN_ISLAND};

/// Place types accepted regardless of their display name
const SETTLEMENT_TYPES: [&str; 5] = ["island", "city", "town", "village", "hamlet"];

/// Substrings of a display name that mark a point of interest rather than a
/// settlement. The trailing country segment is not searched ("Maldives"
/// contains "dive").
const POI_DENYLIST: [&str; 14] = [
    "resort",
    "hotel",
    "guesthouse",
    "villa",
    "beach",
    "airport",
    "harbor",
    "marina",
    "dive",
    "spa",
    "restaurant",
    "cafe",
    "shop",
    "store",
];

/// Lowercased final display-name segment of places in the country
const COUNTRY_NAME: &str = "maldives";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Named address components, most specific first
    StructuredAddress,
    /// Positional reading of `"Island, Atoll, …, Maldives"`
    DisplayName,
}

impl ExtractionStrategy {
    pub const ORDER: [ExtractionStrategy; 2] = [
        ExtractionStrategy::StructuredAddress,
        ExtractionStrategy::DisplayName,
    ];

    #[must_use]
    pub fn island(self, place: &Place) -> Option<String> {
        match self {
            ExtractionStrategy::StructuredAddress => place.address.as_ref().and_then(|a| {
                first_present(&[
                    &a.island,
                    &a.city,
                    &a.town,
                    &a.village,
                    &a.hamlet,
                    &a.suburb,
                    &a.neighbourhood,
                ])
            }),
            ExtractionStrategy::DisplayName => {
                let parts = display_parts(&place.display_name)?;
                let first = parts[0];
                (!first.is_empty() && !contains_atoll(first)).then(|| first.to_string())
            }
        }
    }

    #[must_use]
    pub fn atoll(self, place: &Place) -> Option<String> {
        match self {
            ExtractionStrategy::StructuredAddress => place
                .address
                .as_ref()
                .and_then(|a: &Address| first_present(&[&a.county, &a.state, &a.region])),
            ExtractionStrategy::DisplayName => {
                let parts = display_parts(&place.display_name)?;
                if let Some(part) = parts[1..].iter().find(|part| contains_atoll(part)) {
                    return Some((*part).to_string());
                }
                let second = parts[1];
                (!second.is_empty() && !second.to_lowercase().contains("maldives"))
                    .then(|| second.to_string())
            }
        }
    }
}

fn first_present(candidates: &[&Option<String>]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|value| value.as_deref())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Comma-separated parts, only when there are at least two
fn display_parts(display_name: &str) -> Option<Vec<&str>> {
    let parts: Vec<&str> = display_name.split(", ").collect();
    (parts.len() >= 2).then_some(parts)
}

fn contains_atoll(part: &str) -> bool {
    part.to_lowercase().contains("atoll")
}

/// Extract island and atoll, using the sentinels when nothing matches.
#[must_use]
pub fn parse_location(place: &Place) -> LocationData {
    let island = ExtractionStrategy::ORDER
        .iter()
        .find_map(|strategy| strategy.island(place));
    let atoll = ExtractionStrategy::ORDER
        .iter()
        .find_map(|strategy| strategy.atoll(place));

    let data = LocationData {
        island: island.unwrap_or_else(|| UNKNOWN_ISLAND.to_string()),
        atoll: atoll.unwrap_or_else(|| UNKNOWN_ATOLL.to_string()),
        full_name: place.display_name.clone(),
    };
    tracing::debug!(island = %data.island, atoll = %data.atoll, "Parsed location");
    data
}

/// Whether a place looks like an inhabited island or settlement rather than
/// a resort, shop or other point of interest.
#[must_use]
pub fn is_settlement_like(place: &Place) -> bool {
    if place
        .place_type
        .as_deref()
        .is_some_and(|kind| SETTLEMENT_TYPES.contains(&kind))
    {
        return true;
    }
    let name = place.display_name.to_lowercase();
    let mut parts: Vec<&str> = name.split(',').map(str::trim).collect();
    if parts.last() == Some(&COUNTRY_NAME) {
        parts.pop();
    }
    !parts
        .iter()
        .any(|part| POI_DENYLIST.iter().any(|word| part.contains(word)))
}

/// First settlement-like place, else the first place.
#[must_use]
pub fn pick_best_match(places: &[Place]) -> Option<&Place> {
    places
        .iter()
        .find(|place| is_settlement_like(place))
        .or_else(|| places.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn place(display_name: &str, address: Option<Address>) -> Place {
        Place {
            display_name: display_name.to_string(),
            address,
            ..Place::default()
        }
    }

    #[test]
    fn test_structured_city_and_county() {
        let address = Address {
            county: Some("North Male Atoll".into()),
            city: Some("Maafushi".into()),
            ..Address::default()
        };
        let data = parse_location(&place("", Some(address)));
        assert_eq!(data.island, "Maafushi");
        assert_eq!(data.atoll, "North Male Atoll");
    }

    #[test]
    fn test_display_name_fallback() {
        let data = parse_location(&place("Biyadhoo, Kaafu Atoll, Maldives", None));
        assert_eq!(data.island, "Biyadhoo");
        assert_eq!(data.atoll, "Kaafu Atoll");
        assert_eq!(data.full_name, "Biyadhoo, Kaafu Atoll, Maldives");
    }

    #[test]
    fn test_structured_priority_order() {
        let address = Address {
            island: Some("Thulusdhoo".into()),
            town: Some("Ignored Town".into()),
            state: Some("Kaafu".into()),
            region: Some("Ignored Region".into()),
            ..Address::default()
        };
        let data = parse_location(&place("", Some(address)));
        assert_eq!(data.island, "Thulusdhoo");
        assert_eq!(data.atoll, "Kaafu");
    }

    #[test]
    fn test_empty_structured_values_are_skipped() {
        let address = Address {
            island: Some(String::new()),
            village: Some("Dhigurah".into()),
            ..Address::default()
        };
        let data = parse_location(&place("Dhigurah, Alif Dhaal Atoll, Maldives", Some(address)));
        assert_eq!(data.island, "Dhigurah");
        assert_eq!(data.atoll, "Alif Dhaal Atoll");
    }

    #[test]
    fn test_structured_island_with_display_atoll() {
        let address = Address {
            suburb: Some("Hulhumale".into()),
            ..Address::default()
        };
        let data = parse_location(&place("Hulhumale, Male, Maldives", Some(address)));
        assert_eq!(data.island, "Hulhumale");
        assert_eq!(data.atoll, "Male");
    }

    #[rstest]
    #[case("Kaafu Atoll, Maldives", UNKNOWN_ISLAND, UNKNOWN_ATOLL)]
    #[case("Fulidhoo, Maldives", "Fulidhoo", UNKNOWN_ATOLL)]
    #[case("Maldives", UNKNOWN_ISLAND, UNKNOWN_ATOLL)]
    #[case("", UNKNOWN_ISLAND, UNKNOWN_ATOLL)]
    #[case("Rasdhoo, Rasdhoo Island, Alif Alif Atoll, Maldives", "Rasdhoo", "Alif Alif Atoll")]
    fn test_display_name_edge_cases(
        #[case] display_name: &str,
        #[case] island: &str,
        #[case] atoll: &str,
    ) {
        let data = parse_location(&place(display_name, None));
        assert_eq!(data.island, island);
        assert_eq!(data.atoll, atoll);
    }

    #[test]
    fn test_strategies_individually() {
        let p = place("Ukulhas, Alif Alif Atoll, Maldives", None);
        assert_eq!(ExtractionStrategy::StructuredAddress.island(&p), None);
        assert_eq!(
            ExtractionStrategy::DisplayName.island(&p).as_deref(),
            Some("Ukulhas")
        );
        assert_eq!(
            ExtractionStrategy::DisplayName.atoll(&p).as_deref(),
            Some("Alif Alif Atoll")
        );
    }

    #[rstest]
    #[case("Sun Island Resort, Alif Dhaal Atoll, Maldives", None, false)]
    #[case("Velana International Airport, Hulhule, Maldives", None, false)]
    #[case("Maafushi, Kaafu Atoll, Maldives", None, true)]
    #[case("Maafushi Guesthouses, Kaafu Atoll, Maldives", None, false)]
    #[case("Dhiffushi Beach Villa, Kaafu Atoll, Maldives", Some("village"), true)]
    #[case("Coffeeshop, Maafushi, Kaafu Atoll, Maldives", None, false)]
    #[case("BlueSpa, Hulhumale, Maldives", None, false)]
    #[case("Sunresort, Kaafu Atoll, Maldives", None, false)]
    #[case("Thinadhoo, Gaafu Dhaalu Atoll, Maldives", None, true)]
    #[case("Maldives", None, true)]
    fn test_settlement_filter(
        #[case] display_name: &str,
        #[case] place_type: Option<&str>,
        #[case] expected: bool,
    ) {
        let p = Place {
            display_name: display_name.into(),
            place_type: place_type.map(str::to_string),
            ..Place::default()
        };
        assert_eq!(is_settlement_like(&p), expected);
    }

    #[test]
    fn test_pick_best_match() {
        let places = vec![
            place("Kandooma Resort, Kaafu Atoll, Maldives", None),
            place("Guraidhoo, Kaafu Atoll, Maldives", None),
        ];
        assert_eq!(
            pick_best_match(&places).map(|p| p.display_name.as_str()),
            Some("Guraidhoo, Kaafu Atoll, Maldives")
        );

        let only_pois = vec![place("Dive Center, Maldives", None)];
        assert!(!is_settlement_like(&only_pois[0]));
        assert_eq!(
            pick_best_match(&only_pois).map(|p| p.display_name.as_str()),
            Some("Dive Center, Maldives")
        );
        assert!(pick_best_match(&[]).is_none());
    }
}
