//! HTTP fetch wrapper shared by all domain fetchers.
//!
//! Builds `{base}/{endpoint}?{query}` from an ordered parameter list,
//! issues one GET, rejects application-level error envelopes (the upstream
//! APIs report failures inside an HTTP 200 body), and stores successful
//! payloads in the TTL cache keyed by the full URL.

use crate::cache::TtlCache;
use crate::error::{Error, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    cache: TtlCache,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("reqwest client with static configuration"),
            base_url: base_url.into(),
            api_key,
            cache: TtlCache::new(),
        }
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    /// Serializes `params` in caller order so the same logical query always
    /// produces the same URL, hence the same cache key.
    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
        let mut sep = '?';
        if let Some(key) = &self.api_key {
            url.push(sep);
            url.push_str("api_key=");
            url.push_str(key);
            sep = '&';
        }
        for (name, value) in params {
            url.push(sep);
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencode(value));
            sep = '&';
        }
        url
    }

    /// Fetches `endpoint` with `params`, serving from cache while the entry
    /// is younger than `ttl`. Two concurrent misses for the same URL both
    /// hit the network; the later cache write wins.
    pub async fn fetch_resource(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        ttl: Duration,
    ) -> Result<Value> {
        let url = self.build_url(endpoint, params);

        if let Some(payload) = self.cache.get(&url, ttl) {
            info!(endpoint, outcome = "cache-hit", "fetch");
            return Ok(payload);
        }

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(endpoint, outcome = "network-error", error = %e, "fetch");
                return Err(Error::Network(e));
            }
        };

        let response = match response.error_for_status() {
            Ok(r) => r,
            Err(e) => {
                warn!(endpoint, outcome = "http-error", error = %e, "fetch");
                return Err(Error::Network(e));
            }
        };

        let payload: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!(endpoint, outcome = "bad-body", error = %e, "fetch");
                return Err(Error::Network(e));
            }
        };

        // Upstream signals application failures with HTTP 200 + an error
        // envelope, so the status check alone is not enough.
        if let Some(message) = extract_error_envelope(&payload) {
            warn!(endpoint, outcome = "api-error", error = %message, "fetch");
            return Err(Error::Api {
                endpoint: endpoint.to_string(),
                message,
            });
        }

        info!(endpoint, outcome = "ok", "fetch");
        self.cache.put(&url, payload.clone());
        Ok(payload)
    }
}

/// Returns the embedded error message when the payload is an envelope of
/// the form `{"error": ...}`. The error field may be a bare string or an
/// object with a `message`/`text` field.
fn extract_error_envelope(payload: &Value) -> Option<String> {
    let error = payload.as_object()?.get("error")?;
    match error {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => {
            let msg = map
                .get("message")
                .or_else(|| map.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("unspecified upstream error");
            Some(msg.to_string())
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Minimal percent-encoding for query values: keeps unreserved characters,
/// escapes everything else as UTF-8 bytes.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push_str("%20"),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_is_deterministic_in_caller_order() {
        let client = ApiClient::new("https://api.example.com/v1/", None);
        let params = [
            ("dep_iata", "CGK".to_string()),
            ("limit", "25".to_string()),
        ];
        assert_eq!(
            client.build_url("flights", &params),
            "https://api.example.com/v1/flights?dep_iata=CGK&limit=25"
        );
    }

    #[test]
    fn api_key_comes_first_when_present() {
        let client = ApiClient::new("http://h", Some("secret".into()));
        assert_eq!(
            client.build_url("airlines", &[("iata_code", "GA".to_string())]),
            "http://h/airlines?api_key=secret&iata_code=GA"
        );
    }

    #[test]
    fn query_values_are_escaped() {
        let client = ApiClient::new("http://h", None);
        assert_eq!(
            client.build_url("suggest", &[("q", "new york".to_string())]),
            "http://h/suggest?q=new%20york"
        );
    }

    #[test]
    fn envelope_extraction_variants() {
        assert_eq!(
            extract_error_envelope(&json!({"error": "rate limited"})),
            Some("rate limited".to_string())
        );
        assert_eq!(
            extract_error_envelope(&json!({"error": {"message": "bad key"}})),
            Some("bad key".to_string())
        );
        assert_eq!(extract_error_envelope(&json!({"data": []})), None);
        assert_eq!(extract_error_envelope(&json!([1, 2])), None);
    }
}
