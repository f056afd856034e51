//! Coordinate and search-result resolution into island/atoll locations

use super::client::PlaceLookup;
use super::models::{LocationData, Place, SelectedLocation};
use super::parser::{parse_location, pick_best_match};
use crate::storage::PersistentStore;
use crate::{Result, TravelError};
use rand::RngExt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Resolves map clicks and picked search results into [`LocationData`]
pub struct LocationResolver<L> {
    lookup: L,
    cache: Option<PersistentStore>,
    cache_ttl: Duration,
}

fn cache_key(lat: f64, lng: f64) -> String {
    format!("reverse:{lat:.4}:{lng:.4}")
}

impl<L: PlaceLookup> LocationResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: None,
            cache_ttl: Duration::from_hours(24),
        }
    }

    /// Cache resolved coordinates for roughly `ttl_hours`; 0 disables the
    /// cache.
    #[must_use]
    pub fn with_cache(mut self, cache: PersistentStore, ttl_hours: u32) -> Self {
        if ttl_hours == 0 {
            debug!("Reverse geocode cache disabled");
            self.cache = None;
            return self;
        }
        self.cache = Some(cache);
        self.cache_ttl = Duration::from_hours(ttl_hours.into());
        self
    }

    /// Reverse geocode a coordinate into an island and atoll.
    ///
    /// When the reverse lookup names no island, a nearby search is tried and
    /// its best settlement-like result parsed instead. Returns `None` when
    /// neither yields an island.
    #[instrument(skip(self))]
    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Option<LocationData>> {
        let key = cache_key(lat, lng);
        if let Some(cache) = &self.cache {
            match cache.get_async::<LocationData>(&key).await {
                Ok(Some(cached)) => {
                    debug!("Reverse geocode cache hit for {}", key);
                    return Ok(Some(cached));
                }
                Ok(None) => {}
                Err(e) => warn!("Reverse geocode cache unreadable: {}", e),
            }
        }

        let place = self.lookup.reverse(lat, lng).await?;
        let mut data = parse_location(&place);

        if data.is_unknown_island() {
            debug!("Reverse lookup named no island, searching nearby");
            let nearby = self.lookup.search_near(lat, lng).await?;
            if let Some(best) = pick_best_match(&nearby) {
                data = parse_location(best);
            }
        }

        if data.is_unknown_island() {
            info!("No island found near ({:.4}, {:.4})", lat, lng);
            return Ok(None);
        }

        if let Some(cache) = &self.cache {
            let jitter: f32 = rand::rng().random_range(0.9..1.1);
            let ttl = self.cache_ttl.mul_f32(jitter);
            if let Err(e) = cache.put_async(&key, data.clone(), Some(ttl)).await {
                warn!("Reverse geocode result not cached: {}", e);
            }
        }

        info!("Resolved ({:.4}, {:.4}) to {} / {}", lat, lng, data.island, data.atoll);
        Ok(Some(data))
    }

    /// Turn a picked search result into a selected location.
    pub fn select_result(&self, place: &Place) -> Result<SelectedLocation> {
        select_place(place)
    }
}

/// Parse the coordinates and location of a search result.
pub fn select_place(place: &Place) -> Result<SelectedLocation> {
    let latitude = parse_coordinate(&place.lat, "latitude")?;
    let longitude = parse_coordinate(&place.lon, "longitude")?;
    Ok(SelectedLocation {
        latitude,
        longitude,
        data: parse_location(place),
    })
}

fn parse_coordinate(raw: &str, name: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| TravelError::validation(format!("invalid {name} '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoding::models::{Address, UNKNOWN_ATOLL};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeLookup {
        reverse: Place,
        nearby: Vec<Place>,
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl PlaceLookup for FakeLookup {
        async fn reverse(&self, _lat: f64, _lng: f64) -> Result<Place> {
            self.calls.lock().unwrap().push("reverse");
            Ok(self.reverse.clone())
        }

        async fn search(&self, _query: &str) -> Result<Vec<Place>> {
            self.calls.lock().unwrap().push("search");
            Ok(Vec::new())
        }

        async fn search_near(&self, _lat: f64, _lng: f64) -> Result<Vec<Place>> {
            self.calls.lock().unwrap().push("search_near");
            Ok(self.nearby.clone())
        }
    }

    fn named(display_name: &str) -> Place {
        Place {
            display_name: display_name.to_string(),
            ..Place::default()
        }
    }

    #[tokio::test]
    async fn test_reverse_with_island_skips_fallback() {
        let lookup = FakeLookup {
            reverse: Place {
                address: Some(Address {
                    island: Some("Maafushi".into()),
                    county: Some("Kaafu Atoll".into()),
                    ..Address::default()
                }),
                ..Place::default()
            },
            ..FakeLookup::default()
        };
        let resolver = LocationResolver::new(lookup);
        let data = resolver.reverse_geocode(3.94, 73.49).await.unwrap().unwrap();
        assert_eq!(data.island, "Maafushi");
        assert_eq!(data.atoll, "Kaafu Atoll");
        assert_eq!(*resolver.lookup.calls.lock().unwrap(), vec!["reverse"]);
    }

    #[tokio::test]
    async fn test_unknown_island_uses_nearby_settlement() {
        let lookup = FakeLookup {
            reverse: named("Kaafu Atoll, Maldives"),
            nearby: vec![
                named("Kandooma Resort, Kaafu Atoll, Maldives"),
                named("Guraidhoo, Kaafu Atoll, Maldives"),
            ],
            ..FakeLookup::default()
        };
        let resolver = LocationResolver::new(lookup);
        let data = resolver.reverse_geocode(3.90, 73.47).await.unwrap().unwrap();
        assert_eq!(data.island, "Guraidhoo");
        assert_eq!(
            *resolver.lookup.calls.lock().unwrap(),
            vec!["reverse", "search_near"]
        );
    }

    #[tokio::test]
    async fn test_open_ocean_resolves_to_none() {
        let lookup = FakeLookup {
            reverse: Place::default(),
            nearby: Vec::new(),
            ..FakeLookup::default()
        };
        let resolver = LocationResolver::new(lookup);
        assert_eq!(resolver.reverse_geocode(0.0, 80.0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cached_result_skips_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistentStore::open(dir.path()).unwrap();
        let lookup = FakeLookup {
            reverse: named("Thoddoo, Alif Alif Atoll, Maldives"),
            ..FakeLookup::default()
        };
        let resolver = LocationResolver::new(lookup).with_cache(store, 24);

        let first = resolver.reverse_geocode(4.43781, 72.96012).await.unwrap();
        let second = resolver.reverse_geocode(4.43779, 72.96009).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(*resolver.lookup.calls.lock().unwrap(), vec!["reverse"]);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistentStore::open(dir.path()).unwrap();
        let lookup = FakeLookup {
            reverse: named("Thoddoo, Alif Alif Atoll, Maldives"),
            ..FakeLookup::default()
        };
        let resolver = LocationResolver::new(lookup).with_cache(store.clone(), 0);
        assert!(resolver.cache.is_none());

        resolver.reverse_geocode(4.4378, 72.9601).await.unwrap();
        resolver.reverse_geocode(4.4378, 72.9601).await.unwrap();
        assert_eq!(
            *resolver.lookup.calls.lock().unwrap(),
            vec!["reverse", "reverse"]
        );
        assert_eq!(
            store.get::<LocationData>(&cache_key(4.4378, 72.9601)).unwrap(),
            None
        );
    }

    #[test]
    fn test_select_result_parses_coordinates() {
        let place = Place {
            lat: "4.1755".into(),
            lon: "73.5093".into(),
            ..named("Male, Kaafu Atoll, Maldives")
        };
        let resolver = LocationResolver::new(FakeLookup::default());
        let selected = resolver.select_result(&place).unwrap();
        assert!((selected.latitude - 4.1755).abs() < 1e-9);
        assert!((selected.longitude - 73.5093).abs() < 1e-9);
        assert_eq!(selected.data.island, "Male");
        assert_ne!(selected.data.atoll, UNKNOWN_ATOLL);
    }

    #[test]
    fn test_select_result_rejects_bad_coordinates() {
        let place = Place {
            lat: "north".into(),
            lon: "73.5".into(),
            ..Place::default()
        };
        let err = select_place(&place).unwrap_err();
        assert!(matches!(err, TravelError::Validation { .. }));
    }
}
