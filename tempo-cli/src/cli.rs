use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Text};
use tempo_core::{
    Config, LookupController, ProviderId, RequestState, WeatherProvider, lookup_once,
    provider::default_provider_from_config, render,
};

use crate::session;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tempo", version, about = "City weather lookup")]
pub struct Cli {
    /// Defaults to `lookup` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a provider: the backend URL, or an OpenWeather API key.
    Configure {
        /// Provider short name: "backend" or "openweather".
        #[arg(value_parser = parse_provider)]
        provider: ProviderId,
    },

    /// Look up one city right away and print the result.
    Show {
        /// City name; several words are joined with spaces.
        #[arg(required = true)]
        city: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Interactive lookup: every line typed replaces the query.
    Lookup {
        #[command(flatten)]
        source: SourceArgs,

        /// Quiet period after the last edit before a lookup fires.
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

/// Flags that override where weather comes from.
#[derive(Debug, Default, Args)]
pub struct SourceArgs {
    /// Provider to use instead of the configured default.
    #[arg(long, value_parser = parse_provider)]
    pub provider: Option<ProviderId>,

    /// Backend base URL, e.g. http://192.168.0.10:5000.
    #[arg(long)]
    pub backend_url: Option<String>,
}

impl SourceArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.backend_url {
            config.backend_url = Some(url.clone());
        }
        if let Some(id) = self.provider {
            config.set_default_provider(id);
        }
    }

    fn resolve(&self, config: &mut Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
        self.apply(config);
        default_provider_from_config(config)
    }
}

fn parse_provider(s: &str) -> anyhow::Result<ProviderId> {
    ProviderId::try_from(s)
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let command = self
            .command
            .unwrap_or(Command::Lookup { source: SourceArgs::default(), debounce_ms: None });

        match command {
            Command::Configure { provider } => {
                configure(provider)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city, source } => {
                let mut config = Config::load()?;
                let provider = source.resolve(&mut config)?;

                let city = city.join(" ");
                let snapshot = lookup_once(provider.as_ref(), &city).await;
                print!("{}", render(&snapshot));

                Ok(match snapshot.state {
                    RequestState::Failure(_) => ExitCode::FAILURE,
                    _ => ExitCode::SUCCESS,
                })
            }
            Command::Lookup { source, debounce_ms } => {
                let mut config = Config::load()?;
                if let Some(ms) = debounce_ms {
                    config.debounce_ms = Some(ms);
                }
                let provider = source.resolve(&mut config)?;
                let debounce = config.debounce();

                let handle = LookupController::spawn(provider, debounce);
                session::run(handle, debounce).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn configure(provider: ProviderId) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    match provider {
        ProviderId::Backend => {
            let url = Text::new("Backend base URL:")
                .with_default(config.backend_url())
                .prompt()
                .context("Failed to read backend URL")?;
            config.set_backend_url(url.trim().to_string());
        }
        ProviderId::OpenWeather => {
            if config.is_provider_configured(provider) {
                let replace = Confirm::new("An OpenWeather API key is already stored. Replace it?")
                    .with_default(false)
                    .prompt()
                    .context("Failed to read confirmation")?;
                if !replace {
                    println!("Keeping the stored API key.");
                    return Ok(());
                }
            }

            let api_key = Password::new("OpenWeather API key:")
                .with_display_mode(PasswordDisplayMode::Masked)
                .without_confirmation()
                .prompt()
                .context("Failed to read API key")?;
            config.upsert_provider_api_key(provider, api_key.trim().to_string());
        }
    }

    if config.default_provider_id()? != provider {
        let make_default = Confirm::new(&format!("Make '{provider}' the default provider?"))
            .with_default(false)
            .prompt()
            .context("Failed to read confirmation")?;
        if make_default {
            config.set_default_provider(provider);
        }
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}
