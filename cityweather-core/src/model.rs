use serde::{Deserialize, Serialize};
use std::fmt;

/// Latest observation for one city.
///
/// Fields are private: a record is never changed after construction, a newer
/// observation for the same city is a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    city: String,
    temperature_celsius: f64,
    temperature_fahrenheit: f64,
    condition_text: String,
    condition_code: i64,
}

impl WeatherRecord {
    pub fn new(
        city: impl Into<String>,
        temperature_celsius: f64,
        temperature_fahrenheit: f64,
        condition_text: impl Into<String>,
        condition_code: i64,
    ) -> Self {
        Self {
            city: city.into(),
            temperature_celsius,
            temperature_fahrenheit,
            condition_text: condition_text.into(),
            condition_code,
        }
    }

    /// Display name as returned by the provider.
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn temperature_celsius(&self) -> f64 {
        self.temperature_celsius
    }

    pub fn temperature_fahrenheit(&self) -> f64 {
        self.temperature_fahrenheit
    }

    pub fn temperature(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.temperature_celsius,
            TemperatureUnit::Fahrenheit => self.temperature_fahrenheit,
        }
    }

    pub fn condition_text(&self) -> &str {
        &self.condition_text
    }

    pub fn condition_code(&self) -> i64 {
        self.condition_code
    }

    pub fn condition_kind(&self) -> ConditionKind {
        ConditionKind::from_code(self.condition_code)
    }

    pub fn key(&self) -> CityKey {
        CityKey::new(&self.city)
    }
}

/// Case-insensitive identity of a city, used for deduplication only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CityKey(String);

impl CityKey {
    pub fn new(city: &str) -> Self {
        Self(city.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Temperature unit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    pub const fn all() -> &'static [TemperatureUnit] {
        &[TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit]
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Celsius => f.write_str("celsius"),
            TemperatureUnit::Fahrenheit => f.write_str("fahrenheit"),
        }
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Supported units: celsius (c), fahrenheit (f)."
            )),
        }
    }
}

/// Coarse weather category derived from a WeatherAPI.com condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Rain,
    Snow,
    Thunderstorm,
}

impl ConditionKind {
    /// See: https://www.weatherapi.com/docs/weather_conditions.json
    pub fn from_code(code: i64) -> Self {
        match code {
            1000 => Self::Clear,
            1003 => Self::PartlyCloudy,
            1006 | 1009 => Self::Cloudy,
            1030 | 1135 => Self::Fog,
            1063 | 1180 | 1183 | 1186 | 1189 => Self::Rain,
            1066 | 1210 | 1213 | 1216 | 1219 => Self::Snow,
            1087 | 1273 | 1276 => Self::Thunderstorm,
            _ => Self::Cloudy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toronto() -> WeatherRecord {
        WeatherRecord::new("Toronto", -3.0, 26.6, "Light snow", 1213)
    }

    #[test]
    fn city_key_ignores_case() {
        assert_eq!(CityKey::new("Toronto"), CityKey::new("TORONTO"));
        assert_eq!(CityKey::new("São Paulo").as_str(), "são paulo");
        assert_eq!(toronto().key(), CityKey::new("toronto"));
    }

    #[test]
    fn record_keeps_display_casing() {
        let record = WeatherRecord::new("NEW York", 20.0, 68.0, "Sunny", 1000);
        assert_eq!(record.city(), "NEW York");
        assert_eq!(record.key().as_str(), "new york");
    }

    #[test]
    fn temperature_follows_unit() {
        let record = toronto();
        assert_eq!(record.temperature(TemperatureUnit::Celsius), -3.0);
        assert_eq!(record.temperature(TemperatureUnit::Fahrenheit), 26.6);
    }

    #[test]
    fn unit_parses_short_and_long_names() {
        for unit in TemperatureUnit::all() {
            let parsed = TemperatureUnit::try_from(unit.to_string().as_str())
                .expect("display form should parse");
            assert_eq!(*unit, parsed);
        }
        assert_eq!(TemperatureUnit::try_from("F").unwrap(), TemperatureUnit::Fahrenheit);
        assert!(TemperatureUnit::try_from("kelvin").is_err());
    }

    #[test]
    fn condition_codes_map_to_kinds() {
        assert_eq!(ConditionKind::from_code(1000), ConditionKind::Clear);
        assert_eq!(ConditionKind::from_code(1003), ConditionKind::PartlyCloudy);
        assert_eq!(ConditionKind::from_code(1009), ConditionKind::Cloudy);
        assert_eq!(ConditionKind::from_code(1135), ConditionKind::Fog);
        assert_eq!(ConditionKind::from_code(1189), ConditionKind::Rain);
        assert_eq!(ConditionKind::from_code(1066), ConditionKind::Snow);
        assert_eq!(ConditionKind::from_code(1276), ConditionKind::Thunderstorm);
        assert_eq!(toronto().condition_kind(), ConditionKind::Snow);
    }

    #[test]
    fn unknown_condition_code_falls_back_to_cloudy() {
        assert_eq!(ConditionKind::from_code(1282), ConditionKind::Cloudy);
        assert_eq!(ConditionKind::from_code(-1), ConditionKind::Cloudy);
    }
}
