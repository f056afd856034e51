//! Nominatim HTTP client
//!
//! Forward and reverse geocoding restricted to one country, with a
//! client-side request budget matching the public usage policy. Failed
//! requests are not retried; callers surface the error and let the user try
//! again.

use super::models::Place;
use crate::config::GeocodingConfig;
use crate::{Result, TravelError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Sliding one-minute request budget
#[derive(Debug)]
pub struct RateLimiter {
    max_requests_per_minute: u32,
    request_times: Vec<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_requests_per_minute: u32) -> Self {
        Self {
            max_requests_per_minute,
            request_times: Vec::new(),
        }
    }

    /// Check if a request is allowed and record it
    pub fn allow_request(&mut self) -> bool {
        self.cleanup_old_requests();

        if self.request_times.len() >= self.max_requests_per_minute as usize {
            false
        } else {
            self.request_times.push(Instant::now());
            true
        }
    }

    /// Time until the oldest request in the window expires
    pub fn time_until_next_request(&mut self) -> Duration {
        self.cleanup_old_requests();

        if self.request_times.len() < self.max_requests_per_minute as usize {
            return Duration::ZERO;
        }
        self.request_times
            .first()
            .map_or(Duration::ZERO, |oldest| {
                Duration::from_secs(60).saturating_sub(oldest.elapsed())
            })
    }

    fn cleanup_old_requests(&mut self) {
        let window = Duration::from_secs(60);
        self.request_times.retain(|time| time.elapsed() < window);
    }
}

/// Place lookups used by the resolver and the search session
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Reverse geocode a coordinate
    async fn reverse(&self, lat: f64, lng: f64) -> Result<Place>;

    /// Free-text forward search
    async fn search(&self, query: &str) -> Result<Vec<Place>>;

    /// Forward search around a coordinate
    async fn search_near(&self, lat: f64, lng: f64) -> Result<Vec<Place>>;
}

#[async_trait]
impl<L: PlaceLookup + ?Sized> PlaceLookup for Arc<L> {
    async fn reverse(&self, lat: f64, lng: f64) -> Result<Place> {
        (**self).reverse(lat, lng).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Place>> {
        (**self).search(query).await
    }

    async fn search_near(&self, lat: f64, lng: f64) -> Result<Vec<Place>> {
        (**self).search_near(lat, lng).await
    }
}

/// Client for a Nominatim-compatible geocoding service
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    country_code: String,
    search_limit: u32,
    fallback_radius_m: u32,
    rate_limiter: Mutex<RateLimiter>,
}

impl GeocodingClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_code: config.country_code.to_lowercase(),
            search_limit: config.search_limit,
            fallback_radius_m: config.fallback_radius_m,
            rate_limiter: Mutex::new(RateLimiter::new(config.max_requests_per_minute)),
        })
    }

    fn reverse_url(&self, lat: f64, lng: f64) -> String {
        format!(
            "{}/reverse?format=json&lat={}&lon={}&zoom=10&addressdetails=1&countrycodes={}",
            self.base_url, lat, lng, self.country_code
        )
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?format=json&q={}&limit={}&countrycodes={}",
            self.base_url,
            urlencoding::encode(query),
            self.search_limit,
            self.country_code
        )
    }

    fn search_near_url(&self, lat: f64, lng: f64) -> String {
        format!(
            "{}/search?format=json&q={}&limit={}&countrycodes={}&radius={}",
            self.base_url,
            urlencoding::encode(&format!("{lat},{lng}")),
            self.search_limit,
            self.country_code,
            self.fallback_radius_m
        )
    }

    fn check_budget(&self) -> Result<()> {
        let mut limiter = self
            .rate_limiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if limiter.allow_request() {
            Ok(())
        } else {
            let wait = limiter.time_until_next_request();
            warn!("Geocoding budget exhausted, next slot in {:.1}s", wait.as_secs_f64());
            Err(TravelError::RateLimited {
                wait_seconds: wait.as_secs().max(1),
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.check_budget()?;

        let start = Instant::now();
        debug!("Geocoding request: {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Geocoding network error: {}", e);
            TravelError::api(format!("Geocoding request failed: {e}"))
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Geocoding service rate limit hit, retry after {}s", retry_after);
            return Err(TravelError::RateLimited {
                wait_seconds: retry_after,
            });
        }
        if !status.is_success() {
            return Err(TravelError::api(format!(
                "Search failed: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let parsed = response
            .json::<T>()
            .await
            .map_err(|e| TravelError::api(format!("Invalid geocoding response: {e}")))?;

        let elapsed = start.elapsed();
        debug!("Geocoding response in {:.3}s", elapsed.as_secs_f64());
        if elapsed.as_secs() > 5 {
            warn!("Slow geocoding response: {:.3}s", elapsed.as_secs_f64());
        }
        Ok(parsed)
    }
}

#[async_trait]
impl PlaceLookup for GeocodingClient {
    #[instrument(skip(self))]
    async fn reverse(&self, lat: f64, lng: f64) -> Result<Place> {
        let place: Place = self.get_json(&self.reverse_url(lat, lng)).await?;
        info!("Reverse geocoded ({:.4}, {:.4}) to '{}'", lat, lng, place.display_name);
        Ok(place)
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Place>> {
        let places: Vec<Place> = self.get_json(&self.search_url(query)).await?;
        if places.is_empty() {
            warn!("No results found for '{}'", query);
        } else {
            info!("Found {} places for '{}'", places.len(), query);
        }
        Ok(places)
    }

    #[instrument(skip(self))]
    async fn search_near(&self, lat: f64, lng: f64) -> Result<Vec<Place>> {
        let places: Vec<Place> = self.get_json(&self.search_near_url(lat, lng)).await?;
        debug!("Nearby search returned {} places", places.len());
        Ok(places)
    }
}
