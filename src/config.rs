use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub aviation: AviationConfig,
    pub weather: WeatherConfig,
    pub currency: CurrencyConfig,
    pub location: LocationConfig,
    pub polling: PollingConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AviationConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CurrencyConfig {
    pub base_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LocationConfig {
    pub auto_locate: bool, // Use IP geolocation if true
    pub manual_lat: f64,   // Latitude used if auto_locate is false
    pub manual_lon: f64,   // Longitude used if auto_locate is false
    pub nearby_radius_km: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PollingConfig {
    pub poll_interval_seconds: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UiConfig {
    pub language: String, // BCP-47 tag, e.g. "en" or "id"
}

impl Config {
    /// Loads config.toml from the working directory.
    /// If it doesn't exist, creates a default one.
    pub fn load() -> Self {
        let config_path = "config.toml";

        if let Ok(content) = fs::read_to_string(config_path) {
            match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => warn!("Failed to parse config.toml: {}. Using defaults.", e),
            }
        }

        let default_config = Config::default();

        // Save default config to disk for the user to edit later
        match toml::to_string_pretty(&default_config) {
            Ok(toml_string) => {
                if fs::write(config_path, toml_string).is_err() {
                    warn!("Could not write default config.toml to disk.");
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }

        info!("Loaded default configuration.");
        default_config
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            aviation: AviationConfig {
                base_url: "https://airlabs.co/api/v9".to_string(),
                api_key: None,
            },
            weather: WeatherConfig {
                base_url: "https://api.openweathermap.org/data/2.5".to_string(),
                api_key: None,
            },
            currency: CurrencyConfig {
                base_url: "https://api.coingecko.com/api/v3".to_string(),
            },
            location: LocationConfig {
                auto_locate: true,
                manual_lat: -6.1256,
                manual_lon: 106.6559,
                nearby_radius_km: 100.0,
            },
            polling: PollingConfig {
                poll_interval_seconds: 30,
            },
            ui: UiConfig {
                language: "en".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.polling.poll_interval_seconds, 30);
        assert_eq!(back.ui.language, "en");
        assert!(back.location.auto_locate);
    }
}
