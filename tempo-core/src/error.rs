use thiserror::Error;

/// The only message a user ever sees for a failed lookup.
pub const CITY_NOT_FOUND: &str = "Cidade não encontrada";

/// Why a single lookup failed.
///
/// The variants exist for logs and tests. At the UI boundary every variant
/// collapses into [`CITY_NOT_FOUND`] via [`LookupError::user_message`].
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed weather payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("weather payload for {location} has no condition entry")]
    MissingCondition { location: String },
}

/// Returned by [`crate::LookupHandle::set_query`] once the controller task is
/// gone.
#[derive(Debug, Error)]
#[error("lookup controller has shut down")]
pub struct ControllerClosed;

impl LookupError {
    pub fn user_message(&self) -> &'static str {
        CITY_NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_maps_to_the_same_message() {
        let status = LookupError::Status { status: 404, url: "http://x/weather".into() };
        let decode = LookupError::from(serde_json::from_str::<u8>("nope").unwrap_err());
        let missing = LookupError::MissingCondition { location: "Lisboa".into() };

        for err in [status, decode, missing] {
            assert_eq!(err.user_message(), "Cidade não encontrada");
        }
    }

    #[test]
    fn status_error_names_the_url() {
        let err = LookupError::Status { status: 502, url: "http://x/weather?city=a".into() };
        assert_eq!(err.to_string(), "unexpected HTTP status 502 from http://x/weather?city=a");
    }
}
