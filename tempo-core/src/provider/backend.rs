use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{LookupError, WeatherResult, provider::read_current_weather};

use super::WeatherProvider;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Weather backend service exposing `GET {base_url}/weather?city=...`.
#[derive(Debug, Clone)]
pub struct BackendProvider {
    base_url: String,
    http: Client,
}

impl BackendProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }
}

#[async_trait]
impl WeatherProvider for BackendProvider {
    async fn current_weather(&self, city: &str) -> Result<WeatherResult, LookupError> {
        let url = format!("{}/weather", self.base_url);
        debug!(%url, city, "requesting weather from backend");

        // `query` percent-encodes the city.
        let res = self.http.get(&url).query(&[("city", city)]).send().await?;

        read_current_weather(res).await
    }
}

