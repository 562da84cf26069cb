use crate::{
    Config, CurrentConditions, NetworkError, Place, UnitSystem,
    provider::open_meteo::OpenMeteoClient,
};
use anyhow::Context;
use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

pub mod open_meteo;

/// Geocoding backend: name in, normalized (unfiltered) places out.
#[async_trait]
pub trait PlaceLookup: Send + Sync + Debug {
    async fn search(&self, name: &str) -> Result<Vec<Place>, NetworkError>;
}

/// Forecast backend for current conditions.
#[async_trait]
pub trait ConditionsProvider: Send + Sync + Debug {
    async fn current(
        &self,
        place: &Place,
        units: UnitSystem,
    ) -> Result<CurrentConditions, NetworkError>;
}

const USER_AGENT: &str = concat!("cityweather/", env!("CARGO_PKG_VERSION"));

/// Construct the Open-Meteo client from config: endpoints and request timeout.
pub fn client_from_config(config: &Config) -> anyhow::Result<OpenMeteoClient> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;

    Ok(OpenMeteoClient::with_client(
        http,
        config.endpoints.geocoding.clone(),
        config.endpoints.forecast.clone(),
    ))
}
