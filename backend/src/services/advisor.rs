//! Request orchestration for crop advisories
//!
//! An advisory runs through a fixed sequence of states:
//!
//! `Idle -> Validating -> FetchingWeather -> Featurizing -> Predicting -> Composing -> Done`
//!
//! Validation and weather failures move the request to `Failed` and stop it;
//! nothing is retried. Featurizing and composing are pure. Predicting only
//! fails on an inconsistent artifact.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use shared::{
    compose, validate_request, AdvisoryReport, AdvisoryRequest, FeatureInputs, OrganicMode,
    Recommendation, SoilSample, WeatherReading,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::weather::WeatherProvider;
use crate::models::ModelArtifact;
use crate::services::inference::predict_crop;

/// Advisory lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryState {
    Idle,
    Validating,
    FetchingWeather,
    Featurizing,
    Predicting,
    Composing,
    Done,
    Failed,
}

impl fmt::Display for AdvisoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdvisoryState::Idle => "idle",
            AdvisoryState::Validating => "validating",
            AdvisoryState::FetchingWeather => "fetching_weather",
            AdvisoryState::Featurizing => "featurizing",
            AdvisoryState::Predicting => "predicting",
            AdvisoryState::Composing => "composing",
            AdvisoryState::Done => "done",
            AdvisoryState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of one advisory run together with the states it passed through
#[derive(Debug)]
pub struct AdvisoryOutcome {
    pub trace: Vec<AdvisoryState>,
    pub result: AppResult<AdvisoryReport>,
}

impl AdvisoryOutcome {
    pub fn final_state(&self) -> AdvisoryState {
        self.trace.last().copied().unwrap_or(AdvisoryState::Idle)
    }
}

struct StateTrace {
    states: Vec<AdvisoryState>,
}

impl StateTrace {
    fn new() -> Self {
        Self {
            states: vec![AdvisoryState::Idle],
        }
    }

    fn enter(&mut self, state: AdvisoryState) {
        tracing::debug!(%state, "advisory transition");
        self.states.push(state);
    }

    fn fail(mut self, error: AppError) -> AdvisoryOutcome {
        self.enter(AdvisoryState::Failed);
        AdvisoryOutcome {
            trace: self.states,
            result: Err(error),
        }
    }
}

/// Crop advisor: validates input, fetches weather, predicts and composes
pub struct Advisor {
    artifact: Arc<ModelArtifact>,
    weather: Arc<dyn WeatherProvider>,
    organic_mode: OrganicMode,
}

impl Advisor {
    pub fn new(
        artifact: Arc<ModelArtifact>,
        weather: Arc<dyn WeatherProvider>,
        organic_mode: OrganicMode,
    ) -> Self {
        Self {
            artifact,
            weather,
            organic_mode,
        }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn organic_mode(&self) -> OrganicMode {
        self.organic_mode
    }

    pub fn weather_provider(&self) -> &dyn WeatherProvider {
        self.weather.as_ref()
    }

    /// Run one advisory and return the report or the first error
    pub async fn recommend(&self, request: &AdvisoryRequest) -> AppResult<AdvisoryReport> {
        self.advise(request).await.result
    }

    /// Run one advisory, recording every state transition
    pub async fn advise(&self, request: &AdvisoryRequest) -> AdvisoryOutcome {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("advisory", %request_id, place = %request.place.trim());
        self.run(request, request_id).instrument(span).await
    }

    async fn run(&self, request: &AdvisoryRequest, request_id: Uuid) -> AdvisoryOutcome {
        let mut trace = StateTrace::new();

        trace.enter(AdvisoryState::Validating);
        let validated = match validate_request(request) {
            Ok(validated) => validated,
            Err(failure) => {
                tracing::info!(field = failure.field, "advisory rejected: {}", failure.message);
                return trace.fail(failure.into());
            }
        };

        trace.enter(AdvisoryState::FetchingWeather);
        let weather = match self.weather.fetch_weather(&validated.place).await {
            Ok(weather) => weather,
            Err(e) => {
                tracing::warn!(reason = e.reason(), "weather fetch failed: {}", e);
                return trace.fail(e.into());
            }
        };

        match self.run_model(&validated.soil, &weather, &mut trace) {
            Ok(recommendation) => {
                trace.enter(AdvisoryState::Done);
                tracing::info!(crop = %recommendation.crop_label, "advisory complete");
                AdvisoryOutcome {
                    trace: trace.states,
                    result: Ok(AdvisoryReport {
                        request_id,
                        soil: validated.soil,
                        weather,
                        recommendation,
                    }),
                }
            }
            Err(e) => {
                tracing::error!("advisory aborted: {}", e);
                trace.fail(e)
            }
        }
    }

    /// Featurize, predict and compose for an already validated sample
    pub fn recommend_for(&self, soil: &SoilSample, weather: &WeatherReading) -> AppResult<Recommendation> {
        let mut trace = StateTrace::new();
        self.run_model(soil, weather, &mut trace)
    }

    fn run_model(
        &self,
        soil: &SoilSample,
        weather: &WeatherReading,
        trace: &mut StateTrace,
    ) -> AppResult<Recommendation> {
        trace.enter(AdvisoryState::Featurizing);
        let inputs = FeatureInputs::from_readings(soil, weather);
        let features = self.artifact.feature_plan().build(&inputs);

        trace.enter(AdvisoryState::Predicting);
        let crop = predict_crop(&features, &self.artifact)?;

        trace.enter(AdvisoryState::Composing);
        Ok(compose(
            &crop,
            soil.nitrogen,
            soil.phosphorus,
            soil.potassium,
            self.artifact.fertilizer_map(),
            self.artifact.organic_alts(),
            self.organic_mode,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_display_in_snake_case() {
        assert_eq!(AdvisoryState::FetchingWeather.to_string(), "fetching_weather");
        assert_eq!(
            serde_json::to_string(&AdvisoryState::Done).unwrap(),
            "\"done\""
        );
    }

    #[test]
    fn failing_a_trace_appends_failed() {
        let mut trace = StateTrace::new();
        trace.enter(AdvisoryState::Validating);
        let outcome = trace.fail(AppError::ArtifactConsistency("boom".to_string()));
        assert_eq!(
            outcome.trace,
            vec![AdvisoryState::Idle, AdvisoryState::Validating, AdvisoryState::Failed]
        );
        assert_eq!(outcome.final_state(), AdvisoryState::Failed);
        assert!(outcome.result.is_err());
    }
}
