//! Bundled sample datasets.
//!
//! Used by the fallback policy when live data is missing or sparse. The
//! records are compiled into the binary so the fallback path never depends
//! on the filesystem.

use crate::models::{Airport, Flight};
use csv::ReaderBuilder;
use tracing::error;

const SAMPLE_FLIGHTS_CSV: &str = include_str!("../data/sample_flights.csv");
const SAMPLE_AIRPORTS_CSV: &str = include_str!("../data/sample_airports.csv");

#[derive(Debug, serde::Deserialize)]
struct FlightRow {
    flight_iata: String,
    airline_iata: String,
    airline_name: String,
    dep_iata: String,
    arr_iata: String,
    status: String,
    delay: Option<i64>,
}

#[derive(Debug, serde::Deserialize)]
struct AirportRow {
    name: String,
    iata_code: String,
    icao_code: String,
    city: String,
    country_code: String,
    lat: f64,
    lng: f64,
    timezone: String,
}

pub fn sample_flights() -> Vec<Flight> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(SAMPLE_FLIGHTS_CSV.as_bytes());

    let mut flights = Vec::new();
    for result in rdr.deserialize::<FlightRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                error!("Malformed sample flight row: {}", e);
                continue;
            }
        };
        flights.push(Flight {
            flight_iata: Some(row.flight_iata),
            airline_iata: Some(row.airline_iata),
            airline_name: Some(row.airline_name),
            dep_iata: Some(row.dep_iata),
            arr_iata: Some(row.arr_iata),
            status: Some(row.status),
            delay: row.delay,
            ..Flight::default()
        });
    }
    flights
}

pub fn sample_delayed_flights() -> Vec<Flight> {
    sample_flights().into_iter().filter(Flight::is_delayed).collect()
}

pub fn sample_airports() -> Vec<Airport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(SAMPLE_AIRPORTS_CSV.as_bytes());

    let mut airports = Vec::new();
    for result in rdr.deserialize::<AirportRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                error!("Malformed sample airport row: {}", e);
                continue;
            }
        };
        airports.push(Airport {
            name: Some(row.name),
            iata_code: Some(row.iata_code),
            icao_code: Some(row.icao_code),
            city: Some(row.city),
            country_code: Some(row.country_code),
            latitude: Some(row.lat),
            longitude: Some(row.lng),
            timezone: Some(row.timezone),
            ..Airport::default()
        });
    }
    airports
}
