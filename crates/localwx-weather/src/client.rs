//! HTTP client for the locality weather service.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use localwx_core::{NetworkError, ReqwestErrorExt, WeatherConfig};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use crate::types::{WeatherError, WeatherReading, WireReading};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-Zomato-Api-Key";

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Arc<Client>,
    endpoint: Url,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let endpoint = Url::parse(endpoint).map_err(|e| WeatherError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        Ok(Self {
            client: Arc::new(client),
            endpoint,
            api_key,
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::new(
            &config.api_url,
            config.effective_api_key(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Fetch the current reading for one locality.
    ///
    /// Transport failures, non-2xx responses and bodies that don't match the
    /// expected shape are all reported as errors; nothing partial is returned.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, locality_id: &str) -> Result<WeatherReading, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("locality_id", locality_id)])
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Weather request for {} returned {}", locality_id, status);
            return Err(WeatherError::Network(NetworkError::ServerError {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.canonical_reason().unwrap_or("unknown status").to_string()
                } else {
                    body
                },
            }));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        let wire: WireReading =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        let reading = wire.validate(locality_id, Utc::now())?;
        tracing::debug!("Fetched weather for {}", locality_id);
        Ok(reading)
    }
}
