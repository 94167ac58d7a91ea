//! Weather fetchers: current conditions and a five-day forecast derived
//! from the upstream's raw 3-hourly samples.

use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::models::{CurrentWeather, DailyForecast, ForecastSample};
use crate::notify::{Notice, NoticeSink};
use chrono::Timelike;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

pub const WEATHER_TTL: Duration = Duration::from_secs(10 * 60);

/// Number of days the grouped forecast exposes.
pub const FORECAST_DAYS: usize = 5;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastSample>,
}

pub struct WeatherClient {
    http: ApiClient,
    notices: Arc<NoticeSink>,
    ttl: Duration,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, notices: Arc<NoticeSink>) -> Self {
        Self {
            http: ApiClient::new(base_url, api_key),
            notices,
            ttl: WEATHER_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub async fn current_by_city(&self, city: &str) -> Option<CurrentWeather> {
        if city.trim().is_empty() {
            self.notices.push(Notice::InvalidInput {
                detail: "city name must not be empty".to_string(),
            });
            return None;
        }
        let params = [("city", city.to_string())];
        self.fetch_current(&params).await
    }

    pub async fn current_by_coords(&self, lat: f64, lon: f64) -> Option<CurrentWeather> {
        if !coords_in_range(lat, lon) {
            self.notices.push(Notice::InvalidInput {
                detail: format!("coordinates ({}, {}) out of range", lat, lon),
            });
            return None;
        }
        let params = [("lat", lat.to_string()), ("lon", lon.to_string())];
        self.fetch_current(&params).await
    }

    async fn fetch_current(&self, params: &[(&str, String)]) -> Option<CurrentWeather> {
        match self.try_fetch_current(params).await {
            Ok(weather) => Some(weather),
            Err(e) => {
                error!(endpoint = "weather", kind = %e.kind(), "fetch failed: {}", e);
                self.notices.push(Notice::FetchFailed {
                    resource: "weather".to_string(),
                    detail: e.to_string(),
                });
                None
            }
        }
    }

    async fn try_fetch_current(&self, params: &[(&str, String)]) -> Result<CurrentWeather> {
        let payload = self.http.fetch_resource("weather", params, self.ttl).await?;
        serde_json::from_value(payload).map_err(|source| Error::Schema {
            endpoint: "weather".to_string(),
            source,
        })
    }

    /// Five-day forecast grouped from 3-hourly samples. Failures yield an
    /// empty list, never an error.
    pub async fn forecast_by_city(&self, city: &str) -> Vec<DailyForecast> {
        if city.trim().is_empty() {
            self.notices.push(Notice::InvalidInput {
                detail: "city name must not be empty".to_string(),
            });
            return Vec::new();
        }
        let params = [("city", city.to_string())];
        match self.try_fetch_forecast(&params).await {
            Ok(days) => days,
            Err(e) => {
                error!(endpoint = "forecast", kind = %e.kind(), "fetch failed: {}", e);
                self.notices.push(Notice::FetchFailed {
                    resource: "forecast".to_string(),
                    detail: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    async fn try_fetch_forecast(&self, params: &[(&str, String)]) -> Result<Vec<DailyForecast>> {
        let payload = self.http.fetch_resource("forecast", params, self.ttl).await?;
        let response: ForecastResponse =
            serde_json::from_value(payload).map_err(|source| Error::Schema {
                endpoint: "forecast".to_string(),
                source,
            })?;
        Ok(group_daily(response.list))
    }
}

fn coords_in_range(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Aggregates 3-hourly samples into per-day min/max entries, capped at
/// [`FORECAST_DAYS`]. The representative condition comes from the sample
/// closest to midday, which tends to describe the day better than the
/// 03:00 one.
pub fn group_daily(samples: Vec<ForecastSample>) -> Vec<DailyForecast> {
    let mut by_day: BTreeMap<chrono::NaiveDate, Vec<ForecastSample>> = BTreeMap::new();
    for sample in samples {
        by_day
            .entry(sample.timestamp.date_naive())
            .or_default()
            .push(sample);
    }

    by_day
        .into_iter()
        .take(FORECAST_DAYS)
        .map(|(date, samples)| {
            let temps: Vec<f64> = samples.iter().filter_map(|s| s.temperature_c).collect();
            let min_temp_c = temps.iter().cloned().fold(None, |acc: Option<f64>, t| {
                Some(acc.map_or(t, |m| m.min(t)))
            });
            let max_temp_c = temps.iter().cloned().fold(None, |acc: Option<f64>, t| {
                Some(acc.map_or(t, |m| m.max(t)))
            });
            let condition = samples
                .iter()
                .min_by_key(|s| s.timestamp.hour().abs_diff(12))
                .and_then(|s| s.condition.clone());
            DailyForecast {
                date,
                min_temp_c,
                max_temp_c,
                condition,
            }
        })
        .collect()
}
