//! End-to-end scenarios for the aviation fetch/cache/enrich pipeline,
//! with the upstream API mocked.

use flightdeck::models::Flight;
use flightdeck::{AviationClient, FlightFilter, Notice, NoticeSink};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AviationClient {
    AviationClient::new(server.uri(), None, Arc::new(NoticeSink::new()))
}

/// Client whose cache never serves a hit, so every call reaches the mock.
fn uncached_client_for(server: &MockServer) -> AviationClient {
    client_for(server).with_ttls(Duration::ZERO, Duration::ZERO)
}

fn ga_flight(number: &str) -> serde_json::Value {
    json!({
        "flight_iata": number,
        "airline_iata": "GA",
        "dep_iata": "CGK",
        "arr_iata": "DPS",
        "status": "en-route"
    })
}

#[tokio::test]
async fn fetch_and_enhance_resolves_names_with_one_lookup() {
    let server = MockServer::start().await;

    let flights: Vec<_> = (0..12).map(|i| ga_flight(&format!("GA{}", 700 + i))).collect();
    Mock::given(method("GET"))
        .and(path("/flights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(flights)))
        .expect(1)
        .mount(&server)
        .await;

    // Twelve flights share one carrier; the lookup endpoint must be hit
    // exactly once, not twelve times.
    Mock::given(method("GET"))
        .and(path("/airlines"))
        .and(query_param("iata_code", "GA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"iata_code": "GA", "icao_code": "GIA", "name": "Garuda Indonesia"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let enhanced = client.flights_enhanced(&FlightFilter::default()).await;

    assert_eq!(enhanced.len(), 12);
    for flight in &enhanced {
        assert_eq!(flight.airline_name.as_deref(), Some("Garuda Indonesia"));
    }
}

#[tokio::test]
async fn enhancement_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/airlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"iata_code": "GA", "name": "Garuda Indonesia"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let input: Vec<Flight> = vec![
        serde_json::from_value(ga_flight("GA715")).unwrap(),
        serde_json::from_value(ga_flight("GA403")).unwrap(),
    ];

    let once = client.enhance(input).await;
    let twice = client.enhance(once.clone()).await;
    assert_eq!(once, twice);
}

#[tokio::test]
async fn invalid_iata_code_issues_zero_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/airports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    for code in ["C", "CG", "CGKX", "C1K", "", "12"] {
        assert!(client.airport_by_code(code).await.is_none(), "code {:?}", code);
    }

    let notices = client.notices().drain();
    assert_eq!(notices.len(), 6);
    assert!(notices
        .iter()
        .all(|n| matches!(n, Notice::InvalidInput { .. })));
}

#[tokio::test]
async fn airport_lookup_is_exact_even_when_upstream_matches_loosely() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/airports"))
        .and(query_param("iata_code", "CGK"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"iata_code": "HLP", "name": "Halim Perdanakusuma (near CGK)"},
            {"iata_code": "CGK", "name": "Soekarno-Hatta International Airport"},
            {"iata_code": "DPS", "name": "CGK alternate routing test row"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let airport = client.airport_by_code("cgk").await.unwrap();
    assert_eq!(airport.iata_code.as_deref(), Some("CGK"));
    assert_eq!(
        airport.name.as_deref(),
        Some("Soekarno-Hatta International Airport")
    );
}

#[tokio::test]
async fn network_failure_yields_empty_collections_not_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = uncached_client_for(&server);
    assert!(client.flights(&FlightFilter::default()).await.is_empty());
    assert!(client.airlines(None, None).await.is_empty());
    assert!(client.countries().await.is_empty());
    assert!(client.suggest("jakarta").await.is_empty());
    assert!(client.flight("GA715").await.is_none());

    let notices = client.notices().drain();
    assert_eq!(notices.len(), 5);
    assert!(notices
        .iter()
        .all(|n| matches!(n, Notice::FetchFailed { .. })));
}

#[tokio::test]
async fn http_200_error_envelope_is_contained_too() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"message": "rate limit exceeded"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.flights(&FlightFilter::default()).await.is_empty());

    let notices = client.notices().drain();
    assert_eq!(notices.len(), 1);
    match &notices[0] {
        Notice::FetchFailed { resource, detail } => {
            assert_eq!(resource, "flights");
            assert!(detail.contains("rate limit exceeded"));
        }
        other => panic!("unexpected notice {:?}", other),
    }
}

#[tokio::test]
async fn fresh_cache_serves_repeat_queries_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Indonesia", "code": "ID"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.countries().await;
    let second = client.countries().await;
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

#[tokio::test]
async fn expired_ttl_forces_a_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let client = uncached_client_for(&server);
    client.countries().await;
    client.countries().await;
}

#[tokio::test]
async fn sparse_delayed_view_tops_up_with_samples_and_notices_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"flight_iata": "XX100", "airline_iata": "XX", "delay": 45, "status": "delayed"},
            {"flight_iata": "YY200", "airline_iata": "YY", "status": "en-route"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let merged = client.delayed_flights(&FlightFilter::default()).await;

    // One live delayed flight, topped up to the 3-row minimum.
    assert!(merged.items.len() >= 3);
    assert!(merged.used_samples);
    assert_eq!(merged.items[0].flight_iata.as_deref(), Some("XX100"));
    assert!(merged.items[1..].iter().all(Flight::is_delayed));

    let sample_notices = client
        .notices()
        .drain()
        .into_iter()
        .filter(|n| matches!(n, Notice::UsingSampleData { .. }))
        .count();
    assert_eq!(sample_notices, 1);
}

#[tokio::test]
async fn malformed_payload_surfaces_as_schema_containment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("not a list")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.flights(&FlightFilter::default()).await.is_empty());
    assert_eq!(client.notices().count(), 1);
}

#[tokio::test]
async fn out_of_range_nearby_query_skips_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.nearby_airports(91.0, 0.0, 50.0).await.is_empty());
    assert!(client.nearby_airports(0.0, 200.0, 50.0).await.is_empty());
    assert!(client.nearby_airports(0.0, 0.0, -1.0).await.is_empty());
    assert_eq!(client.notices().count(), 3);
}
