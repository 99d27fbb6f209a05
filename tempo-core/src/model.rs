use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Display record for one successful lookup.
///
/// Built once from a provider response and replaced wholesale on the next
/// successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub location_name: String,
    pub temperature_c: f64,
    pub country_code: String,
    /// Condition description, first letter capitalized.
    pub condition: String,
    pub icon_id: String,
}

impl WeatherResult {
    pub fn icon_url(&self) -> String {
        format!("{ICON_BASE_URL}/{}.png", self.icon_id)
    }

    /// Temperature rounded half away from zero, e.g. `21.6` -> `"22°C"`.
    pub fn display_temperature(&self) -> String {
        // `as i64` folds -0.0 into 0.
        format!("{}°C", self.temperature_c.round() as i64)
    }
}

/// Outcome of the lookup at any instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(WeatherResult),
    Failure(String),
}

/// What the controller publishes after every change: the query as typed and
/// the state derived from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LookupSnapshot {
    pub query: String,
    pub state: RequestState,
}

impl LookupSnapshot {
    pub fn is_loading(&self) -> bool {
        matches!(self.state, RequestState::Loading)
    }

    pub fn result(&self) -> Option<&WeatherResult> {
        match &self.state {
            RequestState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RequestState::Failure(message) => Some(message),
            _ => None,
        }
    }
}
