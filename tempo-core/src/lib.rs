//! Core library for the `tempo` weather lookup.
//!
//! This crate defines:
//! - Configuration handling
//! - Abstraction over weather providers (backend service, OpenWeather)
//! - The debounced lookup controller and its request state
//! - A pure view of the controller's state
//!
//! It is used by `tempo-cli`, but can also be driven by any other front end
//! that can feed query edits and redraw on snapshot changes.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod text;
pub mod view;

pub use config::{Config, ProviderConfig};
pub use controller::{LookupController, LookupHandle, lookup_once};
pub use error::{CITY_NOT_FOUND, ControllerClosed, LookupError};
pub use model::{LookupSnapshot, RequestState, WeatherResult};
pub use provider::{ProviderId, WeatherProvider};
pub use view::{LookupView, ResultPanel, render};
