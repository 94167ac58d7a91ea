//! Currency and crypto price fetchers.
//!
//! Spot rates move fast, the catalog of supported currencies does not, so
//! the two use different freshness windows: 60 seconds per price leg,
//! five minutes for the coin list and supported-currency list. When a
//! direct pair quote is unavailable the conversion is composed from two
//! USD legs, each cached independently.

use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::models::{Coin, Conversion};
use crate::notify::{Notice, NoticeSink};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

pub const RATE_TTL: Duration = Duration::from_secs(60);
pub const CATALOG_TTL: Duration = Duration::from_secs(5 * 60);

pub struct CurrencyClient {
    http: ApiClient,
    notices: Arc<NoticeSink>,
    rate_ttl: Duration,
    catalog_ttl: Duration,
}

impl CurrencyClient {
    pub fn new(base_url: impl Into<String>, notices: Arc<NoticeSink>) -> Self {
        Self {
            http: ApiClient::new(base_url, None),
            notices,
            rate_ttl: RATE_TTL,
            catalog_ttl: CATALOG_TTL,
        }
    }

    pub fn with_ttls(mut self, rate: Duration, catalog: Duration) -> Self {
        self.rate_ttl = rate;
        self.catalog_ttl = catalog;
        self
    }

    /// Catalog of known coins/currencies.
    pub async fn coins(&self) -> Vec<Coin> {
        match self.try_coins().await {
            Ok(coins) => coins,
            Err(e) => {
                error!(endpoint = "coins/list", kind = %e.kind(), "fetch failed: {}", e);
                self.notices.push(Notice::FetchFailed {
                    resource: "coins/list".to_string(),
                    detail: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    async fn try_coins(&self) -> Result<Vec<Coin>> {
        let payload = self
            .http
            .fetch_resource("coins/list", &[], self.catalog_ttl)
            .await?;
        serde_json::from_value(payload).map_err(|source| Error::Schema {
            endpoint: "coins/list".to_string(),
            source,
        })
    }

    /// Tickers a price can be quoted in.
    pub async fn supported(&self) -> Vec<String> {
        let result: Result<Vec<String>> = async {
            let payload = self
                .http
                .fetch_resource("simple/supported_vs_currencies", &[], self.catalog_ttl)
                .await?;
            serde_json::from_value(payload).map_err(|source| Error::Schema {
                endpoint: "simple/supported_vs_currencies".to_string(),
                source,
            })
        }
        .await;

        match result {
            Ok(list) => list,
            Err(e) => {
                error!(endpoint = "simple/supported_vs_currencies", kind = %e.kind(), "fetch failed: {}", e);
                self.notices.push(Notice::FetchFailed {
                    resource: "simple/supported_vs_currencies".to_string(),
                    detail: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Raw quote: price of `id` expressed in `vs`, if the upstream knows
    /// the pair. A missing pair is not an error.
    async fn quote(&self, id: &str, vs: &str) -> Result<Option<f64>> {
        let params = [
            ("ids", id.to_lowercase()),
            ("vs_currencies", vs.to_lowercase()),
        ];
        let payload = self
            .http
            .fetch_resource("simple/price", &params, self.rate_ttl)
            .await?;
        Ok(extract_price(&payload, &id.to_lowercase(), &vs.to_lowercase()))
    }

    /// Converts `amount` from one currency to another.
    ///
    /// Tries the direct pair first; when the upstream has no quote for it,
    /// composes `from -> USD` and `USD -> to` (the inverse of `to -> USD`)
    /// and multiplies. Failures are contained: the caller gets `None` and
    /// a queued notice.
    pub async fn convert(&self, from: &str, to: &str, amount: f64) -> Option<Conversion> {
        if from.trim().is_empty() || to.trim().is_empty() {
            self.notices.push(Notice::InvalidInput {
                detail: "currency identifiers must not be empty".to_string(),
            });
            return None;
        }
        if !amount.is_finite() || amount < 0.0 {
            self.notices.push(Notice::InvalidInput {
                detail: format!("amount {} is not convertible", amount),
            });
            return None;
        }

        match self.try_convert(from, to, amount).await {
            Ok(conversion) => conversion,
            Err(e) => {
                error!(endpoint = "simple/price", kind = %e.kind(), "conversion failed: {}", e);
                self.notices.push(Notice::FetchFailed {
                    resource: "simple/price".to_string(),
                    detail: e.to_string(),
                });
                None
            }
        }
    }

    async fn try_convert(&self, from: &str, to: &str, amount: f64) -> Result<Option<Conversion>> {
        if let Some(rate) = self.quote(from, to).await? {
            return Ok(Some(Conversion {
                from: from.to_lowercase(),
                to: to.to_lowercase(),
                amount,
                rate,
                converted: amount * rate,
                via_usd: false,
            }));
        }

        // No direct pair: go through USD. Each leg has its own cache key
        // and 60s window, so two conversions sharing a leg reuse it.
        let from_usd = self.quote(from, "usd").await?;
        let to_usd = self.quote(to, "usd").await?;
        let (Some(from_usd), Some(to_usd)) = (from_usd, to_usd) else {
            return Ok(None);
        };
        if to_usd == 0.0 {
            return Ok(None);
        }

        let rate = from_usd / to_usd;
        Ok(Some(Conversion {
            from: from.to_lowercase(),
            to: to.to_lowercase(),
            amount,
            rate,
            converted: amount * rate,
            via_usd: true,
        }))
    }
}

/// Pulls `payload[id][vs]` out of a `/simple/price` response.
fn extract_price(payload: &Value, id: &str, vs: &str) -> Option<f64> {
    payload.as_object()?.get(id)?.as_object()?.get(vs)?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_extraction() {
        let payload = json!({"bitcoin": {"usd": 64250.5, "eur": 59000.0}});
        assert_eq!(extract_price(&payload, "bitcoin", "usd"), Some(64250.5));
        assert_eq!(extract_price(&payload, "bitcoin", "idr"), None);
        assert_eq!(extract_price(&payload, "ethereum", "usd"), None);
        assert_eq!(extract_price(&json!([]), "bitcoin", "usd"), None);
    }

    #[tokio::test]
    async fn rejects_bad_amounts_without_network() {
        let notices = Arc::new(NoticeSink::new());
        let client = CurrencyClient::new("http://unused.invalid", notices.clone());
        assert!(client.convert("btc", "usd", f64::NAN).await.is_none());
        assert!(client.convert("btc", "usd", -1.0).await.is_none());
        assert!(client.convert("", "usd", 1.0).await.is_none());
        assert_eq!(notices.count(), 3);
    }
}
