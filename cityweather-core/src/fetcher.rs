use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    error::NetworkError,
    model::{CurrentConditions, Place, UnitSystem},
    provider::ConditionsProvider,
};

/// Fetches current conditions for a resolved place.
#[derive(Debug, Clone)]
pub struct ConditionsFetcher {
    provider: Arc<dyn ConditionsProvider>,
}

impl ConditionsFetcher {
    pub fn new(provider: Arc<dyn ConditionsProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch(
        &self,
        place: &Place,
        units: UnitSystem,
    ) -> Result<CurrentConditions, NetworkError> {
        debug!(
            place = %place.name,
            latitude = place.latitude,
            longitude = place.longitude,
            %units,
            "fetching current conditions"
        );

        let conditions = self.provider.current(place, units).await?;

        info!(
            "Conditions for '{}': {} {}{}",
            place.name,
            conditions.condition(),
            conditions.temperature,
            conditions.units.temperature_label()
        );

        Ok(conditions)
    }
}
