//! Typed fetchers for the aviation API.
//!
//! Each fetcher delegates to the shared [`ApiClient`], coerces the payload
//! into the matching entity shape, and catches its own errors at the
//! boundary: callers only ever see an empty or populated collection plus a
//! queued notice, never a propagated error. This keeps an API outage from
//! crash-looping whatever sits on top.

use crate::error::{Error, Result};
use crate::fallback::{merge_with_samples, Merged};
use crate::http::ApiClient;
use crate::models::{
    Aircraft, Airline, Airport, City, Country, Flight, Route, Suggestion, Tax, TimezoneInfo,
};
use crate::notify::{Notice, NoticeSink};
use crate::samples;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};

/// Freshness window for live resources (flights, schedules).
pub const LIVE_TTL: Duration = Duration::from_secs(60);
/// Freshness window for slow-moving directory resources.
pub const STATIC_TTL: Duration = Duration::from_secs(30 * 60);

/// Minimum rows the delayed-flights view shows before samples top it up.
pub const DELAYED_VIEW_MIN: usize = 3;

/// Optional filters accepted by the flight-list fetchers.
#[derive(Debug, Clone, Default)]
pub struct FlightFilter {
    pub dep_iata: Option<String>,
    pub arr_iata: Option<String>,
    pub airline_iata: Option<String>,
    pub flight_date: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl FlightFilter {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(v) = &self.dep_iata {
            params.push(("dep_iata", v.clone()));
        }
        if let Some(v) = &self.arr_iata {
            params.push(("arr_iata", v.clone()));
        }
        if let Some(v) = &self.airline_iata {
            params.push(("airline_iata", v.clone()));
        }
        if let Some(v) = &self.flight_date {
            params.push(("flight_date", v.clone()));
        }
        if let Some(v) = self.limit {
            params.push(("limit", v.to_string()));
        }
        if let Some(v) = self.offset {
            params.push(("offset", v.to_string()));
        }
        params
    }
}

/// Why a flight is late. Derived from delay duration alone because the
/// upstream feed carries no cause field; the thresholds are illustrative
/// placeholders pending product confirmation, and nothing else keys off
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayReason {
    Weather,
    AirTraffic,
    Technical,
}

const WEATHER_DELAY_MIN: i64 = 100;
const AIR_TRAFFIC_DELAY_MIN: i64 = 60;

pub fn delay_reason(delay_minutes: i64) -> DelayReason {
    if delay_minutes > WEATHER_DELAY_MIN {
        DelayReason::Weather
    } else if delay_minutes > AIR_TRAFFIC_DELAY_MIN {
        DelayReason::AirTraffic
    } else {
        DelayReason::Technical
    }
}

/// Returns true when `code` is a plausible IATA airport code: exactly
/// three ASCII letters, case-insensitive.
pub fn is_valid_iata(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

pub struct AviationClient {
    pub(crate) http: ApiClient,
    pub(crate) notices: Arc<NoticeSink>,
    /// Resolved carrier names, keyed by IATA code. Never invalidated for
    /// the life of the process.
    pub(crate) airline_names: Mutex<HashMap<String, String>>,
    pub(crate) live_ttl: Duration,
    pub(crate) static_ttl: Duration,
}

impl AviationClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, notices: Arc<NoticeSink>) -> Self {
        Self {
            http: ApiClient::new(base_url, api_key),
            notices,
            airline_names: Mutex::new(HashMap::new()),
            live_ttl: LIVE_TTL,
            static_ttl: STATIC_TTL,
        }
    }

    /// Overrides the freshness windows. Tests use zero TTLs to force
    /// network traffic on every call.
    pub fn with_ttls(mut self, live: Duration, directory: Duration) -> Self {
        self.live_ttl = live;
        self.static_ttl = directory;
        self
    }

    pub fn notices(&self) -> &NoticeSink {
        &self.notices
    }

    /// Shared boundary for all list fetchers: any failure becomes a log
    /// line, a queued notice and an empty vec.
    async fn fetch_list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        ttl: Duration,
    ) -> Vec<T> {
        match self.try_fetch_list(endpoint, params, ttl).await {
            Ok(items) => items,
            Err(e) => {
                error!(endpoint, kind = %e.kind(), "fetch failed: {}", e);
                self.notices.push(Notice::FetchFailed {
                    resource: endpoint.to_string(),
                    detail: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    async fn try_fetch_list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        ttl: Duration,
    ) -> Result<Vec<T>> {
        let payload = self.http.fetch_resource(endpoint, params, ttl).await?;
        coerce_list(endpoint, payload)
    }

    pub async fn flights(&self, filter: &FlightFilter) -> Vec<Flight> {
        self.fetch_list("flights", &filter.params(), self.live_ttl).await
    }

    /// Single-flight lookup by IATA flight number.
    pub async fn flight(&self, flight_iata: &str) -> Option<Flight> {
        let params = [("flight_iata", flight_iata.to_string())];
        match self.http.fetch_resource("flight", &params, self.live_ttl).await {
            Ok(payload) => match coerce_one::<Flight>("flight", payload) {
                Ok(flight) => flight,
                Err(e) => {
                    error!(endpoint = "flight", kind = %e.kind(), "coercion failed: {}", e);
                    self.notices.push(Notice::FetchFailed {
                        resource: "flight".to_string(),
                        detail: e.to_string(),
                    });
                    None
                }
            },
            Err(e) => {
                error!(endpoint = "flight", kind = %e.kind(), "fetch failed: {}", e);
                self.notices.push(Notice::FetchFailed {
                    resource: "flight".to_string(),
                    detail: e.to_string(),
                });
                None
            }
        }
    }

    pub async fn arrivals(&self, airport_iata: &str, filter: &FlightFilter) -> Vec<Flight> {
        let mut params = vec![("arr_iata", airport_iata.to_uppercase())];
        params.extend(filter.params());
        self.fetch_list("arrivals", &params, self.live_ttl).await
    }

    pub async fn departures(&self, airport_iata: &str, filter: &FlightFilter) -> Vec<Flight> {
        let mut params = vec![("dep_iata", airport_iata.to_uppercase())];
        params.extend(filter.params());
        self.fetch_list("departures", &params, self.live_ttl).await
    }

    /// Delayed-flights view: live flights filtered to delayed ones, topped
    /// up with sample data when sparse. The sample notice is queued at
    /// most once per call.
    pub async fn delayed_flights(&self, filter: &FlightFilter) -> Merged<Flight> {
        let live: Vec<Flight> = self
            .flights(filter)
            .await
            .into_iter()
            .filter(Flight::is_delayed)
            .collect();

        let merged = merge_with_samples(
            live,
            samples::sample_delayed_flights(),
            DELAYED_VIEW_MIN,
            |f: &Flight| f.display_number().to_string(),
        );
        if merged.used_samples {
            info!(resource = "flights", "sparse live data, merged samples");
            self.notices.push(Notice::UsingSampleData {
                resource: "flights".to_string(),
            });
        }
        merged
    }

    pub async fn airports(&self, country_code: Option<&str>, limit: Option<u32>) -> Vec<Airport> {
        let mut params = Vec::new();
        if let Some(cc) = country_code {
            params.push(("country_code", cc.to_uppercase()));
        }
        if let Some(n) = limit {
            params.push(("limit", n.to_string()));
        }
        self.fetch_list("airports", &params, self.static_ttl).await
    }

    /// Exact airport lookup by IATA code.
    ///
    /// Malformed codes short-circuit to `None` without touching the
    /// network: fast feedback for the caller and no wasted quota.
    pub async fn airport_by_code(&self, code: &str) -> Option<Airport> {
        if !is_valid_iata(code) {
            self.notices.push(Notice::InvalidInput {
                detail: format!("'{}' is not a valid IATA airport code", code),
            });
            return None;
        }
        let code = code.to_uppercase();
        let params = [("iata_code", code.clone())];
        let airports: Vec<Airport> = self.fetch_list("airports", &params, self.static_ttl).await;
        // The upstream matches loosely; keep only the exact code match.
        airports
            .into_iter()
            .find(|a| a.iata_code.as_deref() == Some(code.as_str()))
    }

    pub async fn airlines(&self, country_code: Option<&str>, limit: Option<u32>) -> Vec<Airline> {
        let mut params = Vec::new();
        if let Some(cc) = country_code {
            params.push(("country_code", cc.to_uppercase()));
        }
        if let Some(n) = limit {
            params.push(("limit", n.to_string()));
        }
        self.fetch_list("airlines", &params, self.static_ttl).await
    }

    pub async fn airline_by_code(&self, iata_code: &str) -> Option<Airline> {
        let code = iata_code.to_uppercase();
        let params = [("iata_code", code.clone())];
        let airlines: Vec<Airline> = self.fetch_list("airlines", &params, self.static_ttl).await;
        airlines
            .into_iter()
            .find(|a| a.iata_code.as_deref() == Some(code.as_str()))
    }

    /// Airports within `radius_km` of a coordinate. Out-of-range inputs
    /// are rejected before any network call.
    pub async fn nearby_airports(&self, lat: f64, lon: f64, radius_km: f64) -> Vec<Airport> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) || radius_km <= 0.0 {
            self.notices.push(Notice::InvalidInput {
                detail: format!("out-of-range nearby query ({}, {}, {} km)", lat, lon, radius_km),
            });
            return Vec::new();
        }
        let params = [
            ("lat", lat.to_string()),
            ("lng", lon.to_string()),
            ("distance", radius_km.to_string()),
        ];
        self.fetch_list("nearby", &params, self.static_ttl).await
    }

    pub async fn cities(&self, country_code: Option<&str>) -> Vec<City> {
        let mut params = Vec::new();
        if let Some(cc) = country_code {
            params.push(("country_code", cc.to_uppercase()));
        }
        self.fetch_list("cities", &params, self.static_ttl).await
    }

    pub async fn countries(&self) -> Vec<Country> {
        self.fetch_list("countries", &[], self.static_ttl).await
    }

    pub async fn routes(&self, dep_iata: Option<&str>, arr_iata: Option<&str>) -> Vec<Route> {
        let mut params = Vec::new();
        if let Some(d) = dep_iata {
            params.push(("dep_iata", d.to_uppercase()));
        }
        if let Some(a) = arr_iata {
            params.push(("arr_iata", a.to_uppercase()));
        }
        self.fetch_list("routes", &params, self.static_ttl).await
    }

    pub async fn fleets(&self, airline_iata: Option<&str>) -> Vec<Aircraft> {
        let mut params = Vec::new();
        if let Some(code) = airline_iata {
            params.push(("airline_iata", code.to_uppercase()));
        }
        self.fetch_list("fleets", &params, self.static_ttl).await
    }

    pub async fn timezones(&self, country_code: Option<&str>) -> Vec<TimezoneInfo> {
        let mut params = Vec::new();
        if let Some(cc) = country_code {
            params.push(("country_code", cc.to_uppercase()));
        }
        self.fetch_list("timezones", &params, self.static_ttl).await
    }

    pub async fn taxes(&self, country_code: Option<&str>) -> Vec<Tax> {
        let mut params = Vec::new();
        if let Some(cc) = country_code {
            params.push(("country_code", cc.to_uppercase()));
        }
        self.fetch_list("taxes", &params, self.static_ttl).await
    }

    pub async fn suggest(&self, query: &str) -> Vec<Suggestion> {
        let params = [("q", query.to_string())];
        self.fetch_list("suggest", &params, self.static_ttl).await
    }
}

/// Coerces an upstream payload into a typed list. Accepts either a bare
/// JSON array or an object wrapping the array in a `response` field.
fn coerce_list<T: DeserializeOwned>(endpoint: &str, payload: Value) -> Result<Vec<T>> {
    let list = match payload {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove("response") {
            Some(inner) => inner,
            None => {
                return Err(Error::Schema {
                    endpoint: endpoint.to_string(),
                    source: serde::de::Error::custom("expected an array or a `response` field"),
                })
            }
        },
        other => {
            return Err(Error::Schema {
                endpoint: endpoint.to_string(),
                source: serde::de::Error::custom(format!(
                    "expected an array, got {}",
                    json_kind(&other)
                )),
            })
        }
    };
    serde_json::from_value(list).map_err(|source| Error::Schema {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Coerces a payload expected to hold a single record; a one-element
/// array is accepted as well.
fn coerce_one<T: DeserializeOwned>(endpoint: &str, payload: Value) -> Result<Option<T>> {
    let value = match payload {
        Value::Object(mut map) if map.contains_key("response") => {
            map.remove("response").unwrap_or(Value::Null)
        }
        other => other,
    };
    match value {
        Value::Null => Ok(None),
        Value::Array(mut items) => {
            if items.is_empty() {
                Ok(None)
            } else {
                let first = items.swap_remove(0);
                serde_json::from_value(first)
                    .map(Some)
                    .map_err(|source| Error::Schema {
                        endpoint: endpoint.to_string(),
                        source,
                    })
            }
        }
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(|source| Error::Schema {
                endpoint: endpoint.to_string(),
                source,
            }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
