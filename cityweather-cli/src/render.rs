use cityweather_core::{ConditionKind, TemperatureUnit, TrackError, TrackOutcome, WeatherRecord};

pub fn glyph(kind: ConditionKind) -> &'static str {
    match kind {
        ConditionKind::Clear => "☀",
        ConditionKind::PartlyCloudy => "⛅",
        ConditionKind::Cloudy => "☁",
        ConditionKind::Fog => "🌫",
        ConditionKind::Rain => "🌧",
        ConditionKind::Snow => "❄",
        ConditionKind::Thunderstorm => "⛈",
    }
}

pub fn format_temperature(value: f64, unit: TemperatureUnit) -> String {
    format!("{}{}", value.round() as i64, unit.symbol())
}

fn render_row(record: &WeatherRecord, unit: TemperatureUnit, width: usize) -> String {
    let city = record.city();
    let pad = width.saturating_sub(city.chars().count());
    format!(
        "{} {}{}  {:>6}  {}",
        glyph(record.condition_kind()),
        city,
        " ".repeat(pad),
        format_temperature(record.temperature(unit), unit),
        record.condition_text(),
    )
}

/// One line per record, in store order.
pub fn render_list(records: &[WeatherRecord], unit: TemperatureUnit) -> String {
    if records.is_empty() {
        return "No cities tracked yet.".to_string();
    }

    let width = records.iter().map(|r| r.city().chars().count()).max().unwrap_or(0);

    records
        .iter()
        .map(|record| render_row(record, unit, width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Message for stderr; `None` when the insert itself is the feedback.
pub fn describe_outcome(query: &str, result: &Result<TrackOutcome, TrackError>) -> Option<String> {
    match result {
        Ok(TrackOutcome::Inserted(_)) => None,
        Ok(TrackOutcome::AlreadyTracked) => Some(format!("{query}: already in the list")),
        Ok(TrackOutcome::Skipped(record)) => {
            Some(format!("{query}: {} is already in the list", record.city()))
        }
        Err(e) => Some(format!("{query}: {} ({e})", e.user_message())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityweather_core::FetchError;

    fn london() -> WeatherRecord {
        WeatherRecord::new("London", 15.4, 59.7, "Cloudy", 1006)
    }

    #[test]
    fn temperature_is_rounded_with_symbol() {
        assert_eq!(format_temperature(15.4, TemperatureUnit::Celsius), "15°C");
        assert_eq!(format_temperature(59.7, TemperatureUnit::Fahrenheit), "60°F");
        assert_eq!(format_temperature(-0.4, TemperatureUnit::Celsius), "0°C");
    }

    #[test]
    fn list_aligns_city_column() {
        let records = vec![
            london(),
            WeatherRecord::new("Rio de Janeiro", 30.0, 86.0, "Sunny", 1000),
        ];
        let out = render_list(&records, TemperatureUnit::Celsius);
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("☁ London        "));
        assert!(lines[0].ends_with("15°C  Cloudy"));
        assert!(lines[1].starts_with("☀ Rio de Janeiro"));
        assert!(lines[1].ends_with("30°C  Sunny"));
    }

    #[test]
    fn list_uses_selected_unit() {
        let out = render_list(&[london()], TemperatureUnit::Fahrenheit);
        assert!(out.contains("60°F"));
        assert!(!out.contains("°C"));
    }

    #[test]
    fn empty_list_has_placeholder() {
        assert_eq!(render_list(&[], TemperatureUnit::Celsius), "No cities tracked yet.");
    }

    #[test]
    fn outcomes_are_described() {
        assert_eq!(describe_outcome("london", &Ok(TrackOutcome::Inserted(london()))), None);
        assert_eq!(
            describe_outcome("LONDON", &Ok(TrackOutcome::AlreadyTracked)).as_deref(),
            Some("LONDON: already in the list")
        );
        assert_eq!(
            describe_outcome("ldn", &Ok(TrackOutcome::Skipped(london()))).as_deref(),
            Some("ldn: London is already in the list")
        );

        let err = Err(TrackError::Fetch(FetchError::EmptyBody));
        let msg = describe_outcome("london", &err).expect("error message");
        assert!(msg.starts_with("london: Could not reach the weather service."));
    }
}
