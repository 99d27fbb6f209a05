use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{LookupError, WeatherResult, provider::read_current_weather};

use super::WeatherProvider;

pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org";

/// Direct OpenWeatherMap current-weather lookup, localized to Portuguese with
/// metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_client(api_key, Client::new())
    }

    pub fn with_client(api_key: String, http: Client) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_OPENWEATHER_URL.to_string(),
            http,
        }
    }

    /// Point at a different API host (a proxy, or a mock server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &str) -> Result<WeatherResult, LookupError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        debug!(%url, city, "requesting weather from OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("lang", "pt_br"),
                ("units", "metric"),
            ])
            .send()
            .await?;

        read_current_weather(res).await
    }
}
