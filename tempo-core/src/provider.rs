use crate::{
    Config, LookupError, WeatherResult,
    provider::{backend::BackendProvider, openweather::OpenWeatherProvider},
    text::capitalize_first,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};
use tracing::warn;

pub mod backend;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Backend,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Backend => "backend",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Backend, ProviderId::OpenWeather]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "backend" => Ok(ProviderId::Backend),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => {
                let supported: Vec<&str> = ProviderId::all().iter().map(ProviderId::as_str).collect();
                Err(anyhow::anyhow!(
                    "Unknown provider '{value}'. Supported providers: {}.",
                    supported.join(", ")
                ))
            }
        }
    }
}

/// A source of current weather for a city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Look up the current weather for `city`, passed through as typed.
    async fn current_weather(&self, city: &str) -> Result<WeatherResult, LookupError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let http = http_client(config)?;

    let provider: Arc<dyn WeatherProvider> = match id {
        ProviderId::Backend => Arc::new(BackendProvider::with_client(config.backend_url(), http)),
        ProviderId::OpenWeather => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider '{id}'.\n\
                     Hint: run `tempo configure {id}` and enter your API key."
                )
            })?;
            Arc::new(
                OpenWeatherProvider::with_client(api_key.to_owned(), http)
                    .with_base_url(config.openweather_url()),
            )
        }
    };

    Ok(provider)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

fn http_client(config: &Config) -> anyhow::Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to build HTTP client")
}

/// Response shape shared by the backend and OpenWeather's current-weather
/// endpoint. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct CurrentWeatherPayload {
    name: String,
    main: PayloadMain,
    sys: PayloadSys,
    weather: Vec<PayloadCondition>,
}

#[derive(Debug, Deserialize)]
struct PayloadMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct PayloadSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct PayloadCondition {
    description: String,
    icon: String,
}

impl CurrentWeatherPayload {
    fn into_result(self) -> Result<WeatherResult, LookupError> {
        let Some(first) = self.weather.into_iter().next() else {
            return Err(LookupError::MissingCondition { location: self.name });
        };

        Ok(WeatherResult {
            location_name: self.name,
            temperature_c: self.main.temp,
            country_code: self.sys.country,
            condition: capitalize_first(&first.description),
            icon_id: first.icon,
        })
    }
}

/// Check status, then decode a current-weather body into a display record.
pub(crate) async fn read_current_weather(
    res: reqwest::Response,
) -> Result<WeatherResult, LookupError> {
    let status = res.status();
    let url = res.url().to_string();
    let body = res.text().await?;

    if !status.is_success() {
        warn!(%status, %url, body = %truncate_body(&body), "weather lookup rejected");
        return Err(LookupError::Status { status: status.as_u16(), url });
    }

    parse_current_weather(&body)
}

pub(crate) fn parse_current_weather(body: &str) -> Result<WeatherResult, LookupError> {
    let payload: CurrentWeatherPayload = serde_json::from_str(body)?;
    payload.into_result()
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_parse_ignores_case() {
        assert_eq!(ProviderId::try_from("OpenWeather").unwrap(), ProviderId::OpenWeather);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown provider 'doesnotexist'. Supported providers: backend, openweather."
        );
    }

    #[test]
    fn openweather_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::OpenWeather, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider"));
    }

    #[test]
    fn backend_needs_no_credentials() {
        let cfg = Config::default();
        assert!(provider_from_config(ProviderId::Backend, &cfg).is_ok());
    }

    #[test]
    fn default_provider_from_config_works_when_set_and_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "KEY".to_string());

        let provider = default_provider_from_config(&cfg);
        assert!(provider.is_ok());
    }

    #[test]
    fn parses_the_documented_payload() {
        let body = r#"{
            "name": "Lisboa",
            "main": {"temp": 21.6, "humidity": 40},
            "sys": {"country": "PT"},
            "weather": [
                {"id": 800, "description": "clear sky", "icon": "01d"},
                {"id": 701, "description": "mist", "icon": "50d"}
            ]
        }"#;

        let result = parse_current_weather(body).expect("payload should parse");

        assert_eq!(result.location_name, "Lisboa");
        assert_eq!(result.temperature_c, 21.6);
        assert_eq!(result.country_code, "PT");
        assert_eq!(result.condition, "Clear sky");
        assert_eq!(result.icon_id, "01d");
    }

    #[test]
    fn empty_condition_list_is_malformed() {
        let body = r#"{"name":"Lisboa","main":{"temp":1.0},"sys":{"country":"PT"},"weather":[]}"#;
        let err = parse_current_weather(body).unwrap_err();
        assert!(matches!(err, LookupError::MissingCondition { .. }));
    }

    #[test]
    fn missing_fields_are_decode_errors() {
        let err = parse_current_weather(r#"{"name":"Lisboa"}"#).unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));

        let err = parse_current_weather("<html>502</html>").unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let cut = truncate_body(&body);
        assert!(cut.len() <= 200);
        assert!(body.starts_with(cut));
        assert_eq!(truncate_body("short"), "short");
    }
}
