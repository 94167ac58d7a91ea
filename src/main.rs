use color_eyre::Result;
use flightdeck::config::Config;
use flightdeck::models::Flight;
use flightdeck::poll::Poller;
use flightdeck::store::Store;
use flightdeck::{location, logging, AviationClient, CurrencyClient, FlightFilter, NoticeSink, WeatherClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    color_eyre::install()?;

    let config = Config::load();
    let store = Store::open("flightdeck.db")?;
    if let Some(language) = store.language()? {
        info!("Restored language preference: {}", language);
    } else {
        store.set_language(&config.ui.language)?;
    }

    let notices = Arc::new(NoticeSink::new());
    let aviation = Arc::new(AviationClient::new(
        &config.aviation.base_url,
        config.aviation.api_key.clone(),
        notices.clone(),
    ));
    let weather = WeatherClient::new(
        &config.weather.base_url,
        config.weather.api_key.clone(),
        notices.clone(),
    );
    let currency = CurrencyClient::new(&config.currency.base_url, notices.clone());

    // Where are we?
    let (lat, lon) = if config.location.auto_locate {
        location::current_location()
            .await
            .unwrap_or((config.location.manual_lat, config.location.manual_lon))
    } else {
        (config.location.manual_lat, config.location.manual_lon)
    };
    println!("Dashboard centered on ({:.4}, {:.4})\n", lat, lon);

    // Nearby airports and the delayed-flights board
    let airports = aviation
        .nearby_airports(lat, lon, config.location.nearby_radius_km)
        .await;
    println!("Nearby airports ({}):", airports.len());
    for (i, airport) in airports.iter().take(5).enumerate() {
        println!(
            "  {:<4} {}",
            airport.display_key(i),
            airport.name.as_deref().unwrap_or("N/A")
        );
    }

    let delayed = aviation.delayed_flights(&FlightFilter::default()).await;
    let delayed_flights = aviation.enhance(delayed.items).await;
    println!("\nDelayed flights:");
    print_flights(&delayed_flights);

    // Weather and a sample conversion
    if let Some(current) = weather.current_by_coords(lat, lon).await {
        println!(
            "\nWeather: {} {}",
            current
                .temperature_c
                .map(|t| format!("{:.1}C", t))
                .unwrap_or_else(|| "N/A".to_string()),
            current.condition.as_deref().unwrap_or("")
        );
    }
    if let Some(conversion) = currency.convert("bitcoin", "usd", 1.0).await {
        println!("1 {} = {:.2} {}", conversion.from, conversion.converted, conversion.to);
    }

    // One background poll cycle; the handle aborts the task on drop.
    let poller_client = aviation.clone();
    let poller = Poller::spawn(
        Duration::from_secs(config.polling.poll_interval_seconds),
        move || {
            let client = poller_client.clone();
            async move {
                let flights = client.flights_enhanced(&FlightFilter::default()).await;
                info!(count = flights.len(), "poll tick");
            }
        },
    );
    tokio::time::sleep(Duration::from_secs(1)).await;
    poller.stop();

    for notice in notices.drain() {
        println!("notice: {:?}", notice);
    }
    Ok(())
}

fn print_flights(flights: &[Flight]) {
    for flight in flights {
        println!(
            "  {:<8} {:<24} {:<12} {:<10} delay: {}",
            flight.display_number(),
            flight.display_airline(),
            flight.display_route(),
            flight.display_status(),
            flight.display_delay(),
        );
    }
}
