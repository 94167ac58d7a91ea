//! Services layer for a flight-tracking and travel-information dashboard:
//! typed fetchers over third-party REST APIs (flights, weather, currency),
//! an in-memory TTL cache, airline-name enrichment, and a sample-data
//! fallback so views never render empty on an upstream outage.

pub mod aviation;
pub mod cache;
pub mod config;
pub mod currency;
pub mod enrich;
pub mod error;
pub mod fallback;
pub mod http;
pub mod location;
pub mod logging;
pub mod models;
pub mod notify;
pub mod poll;
pub mod samples;
pub mod store;
pub mod weather;

pub use aviation::{AviationClient, FlightFilter};
pub use currency::CurrencyClient;
pub use error::{Error, Result};
pub use notify::{Notice, NoticeSink};
pub use weather::WeatherClient;
