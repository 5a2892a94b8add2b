use chrono::{DateTime, Utc};
use localwx_core::NetworkError;
use serde::{Deserialize, Serialize};

/// One entry of the locality catalog, as served by the catalog source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalityRecord {
    pub city_name: String,
    pub locality_name: String,
    pub locality_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "device_type", default)]
    pub device_type: String,
}

/// Kind of station a reading comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    AutomatedStation,
    RainGauge,
}

impl DeviceKind {
    /// `1` is an automated weather station; every other code is a rain gauge.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::AutomatedStation,
            _ => Self::RainGauge,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::AutomatedStation => "Automated weather system",
            Self::RainGauge => "Rain gauge system",
        }
    }
}

/// Measurements for one locality. Stations report `null` for values they don't measure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalityWeather {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub rain_intensity: Option<f64>,
    pub rain_accumulation: Option<f64>,
}

/// A validated reading for one locality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub locality_id: String,
    pub status: i64,
    pub message: String,
    pub device_type: i64,
    pub locality_weather: LocalityWeather,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherReading {
    pub fn device_kind(&self) -> DeviceKind {
        DeviceKind::from_code(self.device_type)
    }
}

/// Response body exactly as the weather service sends it
#[derive(Debug, Deserialize)]
pub(crate) struct WireReading {
    pub status: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub device_type: Option<i64>,
    #[serde(default)]
    pub locality_weather_data: Option<LocalityWeather>,
}

impl WireReading {
    /// Check the shape beyond what serde enforces and build a reading.
    ///
    /// A body `status` other than 200 is rejected as [`WeatherError::Api`] even
    /// when the HTTP response itself succeeded; it is never passed through as data.
    pub(crate) fn validate(
        self,
        locality_id: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<WeatherReading, WeatherError> {
        let message = self.message.unwrap_or_default();

        if self.status != 200 {
            return Err(WeatherError::Api {
                status: self.status,
                message,
            });
        }

        let device_type = self
            .device_type
            .ok_or_else(|| WeatherError::Parse("missing field `device_type`".into()))?;
        let locality_weather = self
            .locality_weather_data
            .ok_or_else(|| WeatherError::Parse("missing field `locality_weather_data`".into()))?;

        Ok(WeatherReading {
            locality_id: locality_id.to_string(),
            status: self.status,
            message,
            device_type,
            locality_weather,
            fetched_at,
        })
    }
}

/// Weather client errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("{0}")]
    Network(#[from] NetworkError),
    #[error("Weather service rejected the request ({status}): {message}")]
    Api { status: i64, message: String },
    #[error("Malformed weather response: {0}")]
    Parse(String),
    #[error("No weather API key configured")]
    MissingApiKey,
    #[error("Invalid weather endpoint: {0}")]
    InvalidUrl(String),
}

/// Catalog source errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Network(#[from] NetworkError),
    #[error("Malformed catalog: {0}")]
    Parse(String),
}
