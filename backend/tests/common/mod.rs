//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use ecofarm_advisor_backend::external::{WeatherFetchError, WeatherProvider};
use ecofarm_advisor_backend::models::{LoadOptions, ModelArtifact};
use ecofarm_advisor_backend::Advisor;
use shared::{OrganicMode, WeatherReading};

/// Path to the demo artifact shipped with the repository
pub fn demo_artifact_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("models")
        .join("crop_model.json")
}

pub fn demo_artifact() -> ModelArtifact {
    ModelArtifact::load(demo_artifact_path(), LoadOptions::default()).unwrap()
}

pub fn reading(place: &str, temperature: f64, humidity: f64, rainfall: f64) -> WeatherReading {
    let observed_at = Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap();
    WeatherReading::from_observation(place, temperature, humidity, rainfall, observed_at).unwrap()
}

/// Weather provider returning a canned result and counting calls
pub struct FakeWeather {
    result: Result<WeatherReading, WeatherFetchError>,
    calls: AtomicUsize,
    places: Mutex<Vec<String>>,
}

impl FakeWeather {
    pub fn ok(reading: WeatherReading) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(reading),
            calls: AtomicUsize::new(0),
            places: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: WeatherFetchError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
            places: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Places requested so far, in call order
    pub fn places(&self) -> Vec<String> {
        self.places.lock().unwrap().clone()
    }
}

#[axum::async_trait]
impl WeatherProvider for FakeWeather {
    async fn fetch_weather(&self, place: &str) -> Result<WeatherReading, WeatherFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.places.lock().unwrap().push(place.to_string());
        self.result.clone()
    }
}

pub fn advisor(artifact: ModelArtifact, weather: Arc<FakeWeather>) -> Advisor {
    Advisor::new(Arc::new(artifact), weather, OrganicMode::FlattenAll)
}
