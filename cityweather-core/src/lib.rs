//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Place search: query normalization, geocoding and candidate filtering
//! - Current conditions for a selected place, in metric or imperial units
//! - The session state machine tying the two together
//! - Configuration and the recent-searches store
//!
//! It is used by `cityweather-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod provider;
pub mod query;
pub mod recent;
pub mod resolver;
pub mod session;
pub mod weather_code;

pub use app::App;
pub use config::{Config, Endpoints};
pub use error::NetworkError;
pub use fetcher::ConditionsFetcher;
pub use model::{CurrentConditions, Place, UnitSystem, compass_point};
pub use provider::{ConditionsProvider, PlaceLookup};
pub use recent::{FileRecentStore, MemoryRecentStore, RecentStore};
pub use resolver::{PlaceResolver, Resolution};
pub use session::{Session, SessionState};
