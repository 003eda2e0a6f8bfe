//! Error types for the fetch, resolve and track paths.
//!
//! Every failure is terminal for the attempt that produced it; nothing here
//! is retried automatically.

use thiserror::Error;

/// Failure of a single `WeatherProvider::fetch` call.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("City name must not be empty")]
    InvalidInput,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Network error: provider returned an empty body")]
    EmptyBody,

    #[error("Provider rejected the request with status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Transport failures and empty replies.
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::EmptyBody)
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode(_))
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::InvalidInput => "Please enter a city name.",
            FetchError::Network(_) | FetchError::EmptyBody => {
                "Could not reach the weather service. Check your connection."
            }
            FetchError::Provider { status: 401 | 403, .. } => {
                "The weather service rejected the API key."
            }
            FetchError::Provider { .. } => "No weather found for that city.",
            FetchError::Decode(_) => "The weather service sent an unexpected response.",
        }
    }
}

/// Failure to determine the current city.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Location service unavailable: {0}")]
    Unavailable(String),

    #[error("Geocoding request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode geocoding response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No city found at the current location")]
    NoLocality,
}

impl ResolveError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ResolveError::Unavailable(_) => "Location is not available.",
            ResolveError::Network(_) => "Could not reach the geocoding service.",
            ResolveError::Decode(_) => "The geocoding service sent an unexpected response.",
            ResolveError::NoLocality => "Could not find a city at your location.",
        }
    }
}

/// Failure of a tracking request that combines resolving and fetching.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("No location resolver configured")]
    NoResolver,

    #[error("Lookup was cancelled before it finished")]
    Cancelled,
}

impl TrackError {
    pub fn user_message(&self) -> &'static str {
        match self {
            TrackError::Fetch(e) => e.user_message(),
            TrackError::Resolve(e) => e.user_message(),
            TrackError::NoResolver => {
                "Current location is not configured. Run `cityweather configure`."
            }
            TrackError::Cancelled => "The lookup was interrupted. Please try again.",
        }
    }
}
