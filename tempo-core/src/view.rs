//! Pure mapping from a [`LookupSnapshot`] to what the screen shows.

use std::fmt;

use crate::model::{LookupSnapshot, RequestState};

pub const TITLE: &str = "Previsão do Tempo";
pub const PLACEHOLDER: &str = "Digite o nome da cidade";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupView {
    pub title: &'static str,
    /// The query as typed, or the placeholder while it is empty.
    pub input: String,
    pub spinner: bool,
    pub error: Option<String>,
    pub panel: Option<ResultPanel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPanel {
    pub location: String,
    pub temperature: String,
    pub country: String,
    pub icon_url: String,
    pub description: String,
}

pub fn render(snapshot: &LookupSnapshot) -> LookupView {
    let input = if snapshot.query.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        snapshot.query.clone()
    };

    let mut view = LookupView { title: TITLE, input, spinner: false, error: None, panel: None };

    match &snapshot.state {
        RequestState::Idle => {}
        RequestState::Loading => view.spinner = true,
        RequestState::Failure(message) => view.error = Some(message.clone()),
        RequestState::Success(result) => {
            view.panel = Some(ResultPanel {
                location: result.location_name.clone(),
                temperature: result.display_temperature(),
                country: result.country_code.clone(),
                icon_url: result.icon_url(),
                description: result.condition.clone(),
            });
        }
    }

    view
}

impl fmt::Display for LookupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "> {}", self.input)?;

        if self.spinner {
            writeln!(f, "...")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "{error}")?;
        }
        if let Some(panel) = &self.panel {
            write!(f, "{panel}")?;
        }

        Ok(())
    }
}

impl fmt::Display for ResultPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.location)?;
        writeln!(f, "{}", self.temperature)?;
        writeln!(f, "{}", self.country)?;
        writeln!(f, "{}", self.icon_url)?;
        writeln!(f, "{}", self.description)
    }
}
