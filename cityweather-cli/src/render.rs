use cityweather_core::{CurrentConditions, Place, compass_point};

/// One line per candidate, numbered from 1.
pub fn candidates(places: &[Place]) -> String {
    places
        .iter()
        .enumerate()
        .map(|(i, place)| format!("{:>2}. {}", i + 1, candidate(place)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn candidate(place: &Place) -> String {
    let code = place
        .country_code
        .as_deref()
        .map(|c| format!(" [{c}]"))
        .unwrap_or_default();

    format!(
        "{}{} ({:.2}, {:.2})",
        place.label(),
        code,
        place.latitude,
        place.longitude
    )
}

pub fn conditions(place: &Place, conditions: &CurrentConditions) -> String {
    let units = conditions.units;
    let local = conditions.local_observation_time();

    [
        place.label(),
        format!("  {}", conditions.condition()),
        format!(
            "  Temperature: {:.1} {}",
            conditions.temperature,
            units.temperature_label()
        ),
        format!(
            "  Wind:        {:.1} {} from {} ({:.0}°)",
            conditions.wind_speed,
            units.wind_speed_label(),
            compass_point(conditions.wind_direction),
            conditions.wind_direction
        ),
        format!(
            "  Observed:    {} ({})",
            local.format("%Y-%m-%d %H:%M %Z"),
            conditions.timezone
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use cityweather_core::UnitSystem;

    fn delhi() -> Place {
        Place {
            name: "Delhi".into(),
            country: "India".into(),
            admin1: Some("Delhi".into()),
            country_code: Some("IN".into()),
            latitude: 28.65195,
            longitude: 77.23149,
            feature_code: Some("PPLA".into()),
        }
    }

    #[test]
    fn candidates_are_numbered() {
        let text = candidates(&[delhi(), delhi()]);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], " 1. Delhi, India [IN] (28.65, 77.23)");
        assert!(lines[1].starts_with(" 2. "));
    }

    #[test]
    fn conditions_use_unit_labels_and_local_time() {
        let reading = CurrentConditions {
            temperature: 87.84,
            wind_speed: 6.0,
            wind_direction: 225.0,
            weather_code: 61,
            observed_at: DateTime::from_timestamp(1_760_870_400, 0).unwrap(),
            timezone: "Asia/Kolkata".into(),
            units: UnitSystem::Imperial,
        };

        let text = conditions(&delhi(), &reading);
        assert!(text.contains("Slight rain"));
        assert!(text.contains("Temperature: 87.8 °F"));
        assert!(text.contains("6.0 mph from SW (225°)"));
        assert!(text.contains("2025-10-19 16:10 IST (Asia/Kolkata)"));
    }
}
