//! Resolving "where am I" into a city name.
//!
//! Device positioning itself is outside this crate; resolvers are handed
//! either a fixed city or fixed coordinates and turn them into a name the
//! weather provider understands.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{config::LocationConfig, error::ResolveError};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const USER_AGENT: &str = concat!("cityweather/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    async fn resolve_current_city(&self) -> Result<String, ResolveError>;
}

/// Always answers with the same city.
#[derive(Debug, Clone)]
pub struct FixedCityResolver {
    city: String,
}

impl FixedCityResolver {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into() }
    }
}

#[async_trait]
impl LocationResolver for FixedCityResolver {
    async fn resolve_current_city(&self) -> Result<String, ResolveError> {
        let city = self.city.trim();
        if city.is_empty() {
            return Err(ResolveError::NoLocality);
        }
        Ok(city.to_string())
    }
}

/// Reverse-geocodes fixed coordinates to their locality via Nominatim.
///
/// Only one lookup runs at a time per instance; concurrent callers queue up
/// behind it and nothing in flight is cancelled.
#[derive(Debug)]
pub struct ReverseGeocoder {
    latitude: f64,
    longitude: f64,
    endpoint: String,
    http: Client,
    in_flight: Mutex<()>,
}

impl ReverseGeocoder {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ResolveError> {
        Self::with_endpoint(latitude, longitude, NOMINATIM_URL)
    }

    pub fn with_endpoint(
        latitude: f64,
        longitude: f64,
        endpoint: impl Into<String>,
    ) -> Result<Self, ResolveError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { latitude, longitude, endpoint: endpoint.into(), http, in_flight: Mutex::new(()) })
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
}

impl NominatimAddress {
    fn locality(self) -> Option<String> {
        [self.city, self.town, self.village, self.municipality]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
    }
}

#[async_trait]
impl LocationResolver for ReverseGeocoder {
    async fn resolve_current_city(&self) -> Result<String, ResolveError> {
        let _guard = self.in_flight.lock().await;

        debug!(lat = self.latitude, lon = self.longitude, "Reverse geocoding current location");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("lat", self.latitude.to_string()),
                ("lon", self.longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "Reverse geocode request failed"))?;

        let status = res.status();
        if !status.is_success() {
            warn!(%status, "Reverse geocode returned an error status");
            return Err(ResolveError::Unavailable(format!("geocoder returned status {status}")));
        }

        let body = res.bytes().await?;
        let parsed: NominatimResponse = serde_json::from_slice(&body)?;

        let city = parsed
            .address
            .and_then(NominatimAddress::locality)
            .ok_or(ResolveError::NoLocality)?;

        info!(city = %city, "Reverse geocoded current location");
        Ok(city)
    }
}

/// Build the resolver described by the `[location]` config section.
///
/// A fixed city wins over coordinates. Returns `Ok(None)` when neither is set.
pub fn resolver_from_config(
    location: Option<&LocationConfig>,
) -> Result<Option<Box<dyn LocationResolver>>, ResolveError> {
    let Some(location) = location else {
        return Ok(None);
    };

    if let Some(city) = location.city.as_deref().filter(|c| !c.trim().is_empty()) {
        return Ok(Some(Box::new(FixedCityResolver::new(city))));
    }

    match location.coordinates() {
        Some((lat, lon)) => Ok(Some(Box::new(ReverseGeocoder::new(lat, lon)?))),
        None => Ok(None),
    }
}
