//! Airline-name enrichment.
//!
//! Flight feeds carry carrier codes but usually no human-readable airline
//! name. This pass collects the distinct unresolved codes, looks each up
//! once (all lookups in flight at the same time, then a join-all barrier
//! before merging), and writes the names back. A code the lookup cannot
//! resolve gets the synthetic label `"<CODE> Airlines"` so the carrier
//! column is never blank.

use crate::aviation::AviationClient;
use crate::models::Flight;
use futures::future::join_all;
use tracing::debug;

impl AviationClient {
    /// Fills `airline_name` on every flight that has a carrier code.
    ///
    /// Idempotent: an already-present name is never overwritten, so
    /// running the pass twice yields the same output.
    pub async fn enhance(&self, mut flights: Vec<Flight>) -> Vec<Flight> {
        let missing = self.unresolved_codes(&flights);

        if !missing.is_empty() {
            debug!(count = missing.len(), "resolving carrier codes");
            let lookups = missing.iter().map(|code| self.airline_by_code(code));
            let airlines = join_all(lookups).await;

            let mut names = self.airline_names.lock().unwrap();
            for (code, airline) in missing.iter().zip(airlines) {
                if let Some(name) = airline.and_then(|a| a.name) {
                    names.insert(code.clone(), name);
                }
            }
        }

        let names = self.airline_names.lock().unwrap();
        for flight in &mut flights {
            if flight.airline_name.is_some() {
                continue;
            }
            if let Some(code) = normalized_code(flight) {
                let name = names
                    .get(&code)
                    .cloned()
                    .unwrap_or_else(|| format!("{} Airlines", code));
                flight.airline_name = Some(name);
            }
        }
        drop(names);

        flights
    }

    /// Fetch-and-enhance pipeline used by the live views.
    pub async fn flights_enhanced(&self, filter: &crate::aviation::FlightFilter) -> Vec<Flight> {
        let flights = self.flights(filter).await;
        self.enhance(flights).await
    }

    /// Distinct carrier codes that lack a resolved name and are not in
    /// the name cache yet, in first-appearance order.
    fn unresolved_codes(&self, flights: &[Flight]) -> Vec<String> {
        let names = self.airline_names.lock().unwrap();
        let mut seen = std::collections::HashSet::new();
        let mut codes = Vec::new();
        for flight in flights {
            if flight.airline_name.is_some() {
                continue;
            }
            let Some(code) = normalized_code(flight) else {
                continue;
            };
            if names.contains_key(&code) || !seen.insert(code.clone()) {
                continue;
            }
            codes.push(code);
        }
        codes
    }
}

fn normalized_code(flight: &Flight) -> Option<String> {
    flight
        .airline_iata
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(|c| c.trim().to_uppercase())
}
