//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - The immutable weather record and its decoding from WeatherAPI.com
//! - An ordered, case-insensitively deduplicated store with change subscriptions
//! - Location resolvers that turn "here" into a city name
//! - A tracking session wiring the above together
//! - Configuration & credentials handling
//!
//! It is used by `cityweather-cli`, but any front end can drive it: call
//! [`WeatherTracker::track`] on user input and render from
//! [`WeatherStore::subscribe`].

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod store;
pub mod tracker;

pub use config::{Config, LocationConfig};
pub use error::{FetchError, ResolveError, TrackError};
pub use location::{FixedCityResolver, LocationResolver, ReverseGeocoder, resolver_from_config};
pub use model::{CityKey, ConditionKind, TemperatureUnit, WeatherRecord};
pub use provider::{WeatherProvider, client_from_config, weatherapi::WeatherClient};
pub use store::{Subscription, UpsertOutcome, WeatherStore};
pub use tracker::{TrackOutcome, WeatherTracker};
