use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, warn};

use crate::{
    error::{FetchError, TrackError},
    location::LocationResolver,
    model::WeatherRecord,
    provider::WeatherProvider,
    store::{UpsertOutcome, WeatherStore},
};

/// What a tracking request did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackOutcome {
    /// Fetched and appended.
    Inserted(WeatherRecord),
    /// Fetched, but the provider's city was already tracked; the store is unchanged.
    Skipped(WeatherRecord),
    /// The query already names a tracked city, so nothing was fetched.
    AlreadyTracked,
}

impl TrackOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, TrackOutcome::Inserted(_))
    }
}

/// One session: fetches through a provider and commits results to its store.
///
/// Cheap to clone; clones share the same store.
#[derive(Debug, Clone)]
pub struct WeatherTracker {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<WeatherStore>,
    resolver: Option<Arc<dyn LocationResolver>>,
}

impl WeatherTracker {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::with_store(provider, Arc::new(WeatherStore::new()))
    }

    pub fn with_store(provider: Arc<dyn WeatherProvider>, store: Arc<WeatherStore>) -> Self {
        Self { provider, store, resolver: None }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn LocationResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn store(&self) -> &Arc<WeatherStore> {
        &self.store
    }

    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    pub async fn track(&self, city: &str) -> Result<TrackOutcome, TrackError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FetchError::InvalidInput.into());
        }

        if self.store.contains(city) {
            debug!(city, "Already tracked, not fetching");
            return Ok(TrackOutcome::AlreadyTracked);
        }

        let record = self.provider.fetch(city).await.inspect_err(|e| {
            warn!(city, error = %e, "Weather fetch failed");
        })?;

        Ok(match self.store.upsert(record.clone()) {
            UpsertOutcome::Inserted => TrackOutcome::Inserted(record),
            UpsertOutcome::Skipped => TrackOutcome::Skipped(record),
        })
    }

    pub async fn track_current_location(&self) -> Result<TrackOutcome, TrackError> {
        let resolver = self.resolver.as_ref().ok_or(TrackError::NoResolver)?;

        let city = resolver.resolve_current_city().await.inspect_err(|e| {
            warn!(error = %e, "Could not resolve current city");
        })?;

        self.track(&city).await
    }

    /// Track several cities at once, one task per city.
    ///
    /// Results come back in input order; the store records them in the order
    /// the fetches complete.
    pub async fn track_all<I, S>(
        &self,
        cities: I,
    ) -> Vec<(String, Result<TrackOutcome, TrackError>)>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let handles: Vec<_> = cities
            .into_iter()
            .map(|city| {
                let city = city.into();
                let tracker = self.clone();
                let task_city = city.clone();
                (city, tokio::spawn(async move { tracker.track(&task_city).await }))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (city, handle) in handles {
            results.push((city, joined(handle.await)));
        }
        results
    }
}

/// Re-raise panics from a tracking task; a cancelled task becomes an error.
fn joined(
    res: Result<Result<TrackOutcome, TrackError>, JoinError>,
) -> Result<TrackOutcome, TrackError> {
    match res {
        Ok(result) => result,
        Err(e) => match e.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            Err(_) => Err(TrackError::Cancelled),
        },
    }
}
