//! User location resolution.
//!
//! Provides [`current_location`], which returns the coordinates used as
//! the center for nearby-airport and local-flight queries. Location is
//! determined via IP geolocation (IpApi) under an explicit timeout;
//! `None` means "unavailable" and callers fall back to the configured
//! manual coordinates.

use ipgeolocate::{Locator, Service};
use std::time::Duration;
use tracing::{error, info};

/// Hard ceiling on how long a geolocation query may take before it
/// resolves to "unavailable" instead of hanging the caller.
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves the user's approximate location via IP geolocation.
///
/// Uses the [IpApi](https://ip-api.com/) service. On success, returns the
/// reported `(latitude, longitude)` in decimal degrees (WGS84); on
/// timeout, network failure or an unparseable response, logs the problem
/// and returns `None` so the caller can substitute its configured
/// coordinates.
pub async fn current_location() -> Option<(f64, f64)> {
    let lookup = Locator::get("1.1.1.1", Service::IpApi);
    match tokio::time::timeout(GEOLOCATION_TIMEOUT, lookup).await {
        Ok(Ok(loc)) => {
            let lat = loc.latitude.parse::<f64>().ok()?;
            let lon = loc.longitude.parse::<f64>().ok()?;
            info!("Geolocation successful - ({}, {})", lat, lon);
            Some((lat, lon))
        }
        Ok(Err(e)) => {
            error!("Error using geolocation service: {}", e);
            None
        }
        Err(_) => {
            error!(
                "Geolocation timed out after {}s",
                GEOLOCATION_TIMEOUT.as_secs()
            );
            None
        }
    }
}
