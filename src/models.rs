use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single flight record as returned by the aviation API.
///
/// Every field is optional: the upstream feed routinely omits telemetry,
/// timing or route data, and consumers must render a placeholder rather
/// than fail. Records are rebuilt wholesale on every poll; there is no
/// merge/patch lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    #[serde(default)]
    pub flight_iata: Option<String>,
    #[serde(default)]
    pub flight_icao: Option<String>,
    #[serde(default, rename = "reg_number")]
    pub registration: Option<String>,

    #[serde(default)]
    pub airline_iata: Option<String>,
    #[serde(default)]
    pub airline_icao: Option<String>,
    #[serde(default)]
    pub airline_name: Option<String>,

    #[serde(default)]
    pub dep_iata: Option<String>,
    #[serde(default)]
    pub dep_name: Option<String>,
    #[serde(default)]
    pub arr_iata: Option<String>,
    #[serde(default)]
    pub arr_name: Option<String>,

    #[serde(default)]
    pub dep_scheduled: Option<String>,
    #[serde(default)]
    pub dep_estimated: Option<String>,
    #[serde(default)]
    pub dep_actual: Option<String>,
    #[serde(default)]
    pub arr_scheduled: Option<String>,
    #[serde(default)]
    pub arr_estimated: Option<String>,
    /// Delay in minutes. `None` means "no data", which is not the same
    /// as an on-time zero.
    #[serde(default)]
    pub delay: Option<i64>,

    #[serde(default, rename = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, rename = "lng")]
    pub longitude: Option<f64>,
    #[serde(default, rename = "alt")]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default, rename = "dir")]
    pub heading: Option<f64>,
    #[serde(default, rename = "v_speed")]
    pub vertical_speed: Option<f64>,

    /// Raw upstream status string; see [`FlightStatus::from_upstream`]
    /// for the display vocabulary.
    #[serde(default)]
    pub status: Option<String>,
}

impl Flight {
    /// Display identity: IATA flight number, then ICAO, then registration.
    pub fn display_number(&self) -> &str {
        self.flight_iata
            .as_deref()
            .or(self.flight_icao.as_deref())
            .or(self.registration.as_deref())
            .unwrap_or("N/A")
    }

    pub fn display_airline(&self) -> &str {
        self.airline_name.as_deref().unwrap_or("N/A")
    }

    pub fn display_route(&self) -> String {
        format!(
            "{} -> {}",
            self.dep_iata.as_deref().unwrap_or("???"),
            self.arr_iata.as_deref().unwrap_or("???"),
        )
    }

    /// Delay rendered for display: absent data reads "N/A", never "0".
    pub fn display_delay(&self) -> String {
        match self.delay {
            Some(mins) => format!("{} min", mins),
            None => "N/A".to_string(),
        }
    }

    pub fn display_status(&self) -> FlightStatus {
        match &self.status {
            Some(raw) => FlightStatus::from_upstream(raw),
            None => FlightStatus::Unknown,
        }
    }

    pub fn is_delayed(&self) -> bool {
        self.delay.map(|d| d > 0).unwrap_or(false)
            || self.display_status() == FlightStatus::Delayed
    }
}

/// The small display vocabulary flight statuses are normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlightStatus {
    OnTime,
    Delayed,
    Boarding,
    Landed,
    Cancelled,
    Diverted,
    InAir,
    Unknown,
}

impl FlightStatus {
    /// Loose normalization of the upstream free-form status string.
    /// Anything unrecognized maps to `Unknown` rather than failing.
    pub fn from_upstream(raw: &str) -> Self {
        let s = raw.trim().to_ascii_lowercase();
        match s.as_str() {
            "scheduled" | "on-time" | "on time" | "active" => FlightStatus::OnTime,
            "delayed" | "late" => FlightStatus::Delayed,
            "boarding" => FlightStatus::Boarding,
            "landed" | "arrived" => FlightStatus::Landed,
            "cancelled" | "canceled" => FlightStatus::Cancelled,
            "diverted" => FlightStatus::Diverted,
            "en-route" | "en route" | "in-air" | "airborne" => FlightStatus::InAir,
            _ => FlightStatus::Unknown,
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlightStatus::OnTime => "on-time",
            FlightStatus::Delayed => "delayed",
            FlightStatus::Boarding => "boarding",
            FlightStatus::Landed => "landed",
            FlightStatus::Cancelled => "cancelled",
            FlightStatus::Diverted => "diverted",
            FlightStatus::InAir => "in-air",
            FlightStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iata_code: Option<String>,
    #[serde(default)]
    pub icao_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default, rename = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, rename = "lng")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl Airport {
    /// Identity used for display and de-duplication: IATA code, falling
    /// back to ICAO code, falling back to the caller's list index. Not
    /// guaranteed unique.
    pub fn display_key(&self, index: usize) -> String {
        self.iata_code
            .clone()
            .or_else(|| self.icao_code.clone())
            .unwrap_or_else(|| format!("#{}", index))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Airline {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iata_code: Option<String>,
    #[serde(default)]
    pub icao_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub fleet_size: Option<u32>,
    #[serde(default)]
    pub fleet_average_age: Option<f64>,
    #[serde(default)]
    pub callsign: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Autocomplete suggestion, discriminated by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Suggestion {
    Airport {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        iata_code: Option<String>,
        #[serde(default)]
        city: Option<String>,
    },
    City {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        country_code: Option<String>,
    },
    Airline {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        iata_code: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default, rename = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, rename = "lng")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Country {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub airline_iata: Option<String>,
    #[serde(default)]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub dep_iata: Option<String>,
    #[serde(default)]
    pub arr_iata: Option<String>,
    #[serde(default)]
    pub days: Option<Vec<String>>,
    #[serde(default)]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    #[serde(default, rename = "reg_number")]
    pub registration: Option<String>,
    #[serde(default)]
    pub airline_iata: Option<String>,
    #[serde(default)]
    pub icao24: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub age: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimezoneInfo {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub gmt_offset: Option<i64>,
    #[serde(default)]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tax {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iata_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// Current conditions from the weather API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub feels_like_c: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub condition: Option<String>,
}

/// One raw 3-hourly forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub condition: Option<String>,
}

/// One forecast day aggregated from its 3-hourly samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: chrono::NaiveDate,
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    /// Condition of the midday-most sample, as a representative label.
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Result of a currency conversion, carrying the rate actually applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub rate: f64,
    pub converted: f64,
    /// True when the rate was composed from two USD legs rather than a
    /// direct quote.
    pub via_usd: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flight_tolerates_missing_everything() {
        let flight: Flight = serde_json::from_value(json!({})).unwrap();
        assert_eq!(flight.display_number(), "N/A");
        assert_eq!(flight.display_airline(), "N/A");
        assert_eq!(flight.display_delay(), "N/A");
        assert_eq!(flight.display_status(), FlightStatus::Unknown);
    }

    #[test]
    fn absent_delay_is_not_zero() {
        let no_data: Flight = serde_json::from_value(json!({})).unwrap();
        let on_time: Flight = serde_json::from_value(json!({"delay": 0})).unwrap();
        assert_eq!(no_data.display_delay(), "N/A");
        assert_eq!(on_time.display_delay(), "0 min");
    }

    #[test]
    fn status_normalization_is_loose() {
        assert_eq!(FlightStatus::from_upstream("  EN-ROUTE "), FlightStatus::InAir);
        assert_eq!(FlightStatus::from_upstream("canceled"), FlightStatus::Cancelled);
        assert_eq!(FlightStatus::from_upstream("Scheduled"), FlightStatus::OnTime);
        assert_eq!(FlightStatus::from_upstream("weird-new-state"), FlightStatus::Unknown);
    }

    #[test]
    fn airport_display_key_falls_back() {
        let a: Airport = serde_json::from_value(json!({"iata_code": "CGK"})).unwrap();
        let b: Airport = serde_json::from_value(json!({"icao_code": "WIII"})).unwrap();
        let c = Airport::default();
        assert_eq!(a.display_key(0), "CGK");
        assert_eq!(b.display_key(1), "WIII");
        assert_eq!(c.display_key(7), "#7");
    }

    #[test]
    fn suggestion_is_tag_discriminated() {
        let s: Suggestion =
            serde_json::from_value(json!({"type": "city", "name": "Jakarta"})).unwrap();
        assert!(matches!(s, Suggestion::City { .. }));
    }
}
