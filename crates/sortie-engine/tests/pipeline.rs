//! End-to-end pipeline tests against mocked providers.
//!
//! One wiremock server hosts both the place-search and forecast endpoints;
//! jitter and sampling temperature are zeroed so runs are deterministic.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sortie_core::{Category, RecommendRequest, Vibe};
use sortie_engine::{Engine, EngineConfig, FallbackCopywriter};
use sortie_places::PlacesClient;
use sortie_weather::WeatherClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Tuesday 2026-03-03 13:00 UTC → 14:00 local at +1h.
fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 3, 13, 0, 0).unwrap()
}

fn deterministic_config() -> EngineConfig {
    EngineConfig {
        jitter: 0.0,
        temperature: 0.0,
        ..EngineConfig::default()
    }
}

fn engine_for(server: &MockServer) -> Engine {
    let places =
        PlacesClient::with_base_url("test-key", 10, &server.uri()).expect("places client");
    let weather = WeatherClient::new(&server.uri(), 5).expect("weather client");
    Engine::new(
        places,
        weather,
        None,
        Arc::new(FallbackCopywriter),
        deterministic_config(),
    )
}

fn request(vibe: &str, swapped: Vec<String>) -> RecommendRequest {
    RecommendRequest {
        city: "Amsterdam".into(),
        vibe: vibe.into(),
        with_who: "friends".into(),
        veg_friendly: false,
        seen_ids: vec![],
        swapped_ids: swapped,
    }
}

async fn mount_weather(server: &MockServer, precip_probability: f64) {
    let body = serde_json::json!({
        "utc_offset_seconds": 3600,
        "hourly": {
            "time": (0..48).map(|h| format!("t{h}")).collect::<Vec<_>>(),
            "temperature_2m": vec![14.0; 48],
            "precipitation_probability": vec![precip_probability; 48],
            "precipitation": vec![0.0; 48],
            "wind_speed_10m": vec![10.0; 48]
        }
    });
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

fn search_result(place_id: &str, name: &str, lat: f64, lng: f64) -> serde_json::Value {
    serde_json::json!({
        "place_id": place_id,
        "name": name,
        "geometry": { "location": { "lat": lat, "lng": lng } }
    })
}

async fn mount_search(server: &MockServer, results: &[serde_json::Value]) {
    let body = serde_json::json!({ "status": "OK", "results": results });
    Mock::given(method("GET"))
        .and(path("/maps/api/place/textsearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

#[allow(clippy::too_many_arguments)]
async fn mount_details(
    server: &MockServer,
    place_id: &str,
    name: &str,
    lat: f64,
    lng: f64,
    types: &[&str],
    rating: f64,
    rating_count: u32,
    open_close: (&str, &str),
) {
    let body = serde_json::json!({
        "status": "OK",
        "result": {
            "place_id": place_id,
            "name": name,
            "rating": rating,
            "user_ratings_total": rating_count,
            "price_level": 2,
            "types": types,
            "business_status": "OPERATIONAL",
            "formatted_address": format!("{name} street 1, Amsterdam"),
            "geometry": { "location": { "lat": lat, "lng": lng } },
            "utc_offset": 60,
            "opening_hours": {
                "open_now": true,
                "periods": [{
                    "open": { "day": 2, "time": open_close.0 },
                    "close": { "day": 2, "time": open_close.1 }
                }]
            },
            "photos": [{ "photo_reference": format!("photo-{place_id}") }]
        }
    });
    Mock::given(method("GET"))
        .and(path("/maps/api/place/details/json"))
        .and(query_param("place_id", place_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn cozy_request_honors_strict_and_relaxed_policies() {
    let server = MockServer::start().await;
    mount_weather(&server, 5.0).await;
    mount_search(
        &server,
        &[
            search_result("cafe-alpha", "Cafe Alpha", 52.3700, 4.9000),
            search_result("dessert-beta", "Dessert Beta", 52.3650, 4.9100),
            search_result("books-gamma", "Bookshop Gamma", 52.3600, 4.8950),
            search_result("cafe-far", "Far Cafe", 52.4700, 4.9300),
            search_result("cafe-swapped", "Swapped Cafe", 52.3640, 4.9080),
        ],
    )
    .await;

    // Open comfortably into the evening.
    mount_details(
        &server, "cafe-alpha", "Cafe Alpha", 52.3700, 4.9000,
        &["cafe", "food"], 4.6, 500, ("0800", "2200"),
    )
    .await;
    // Closes at 15:00 local — one hour away: out of the shortlist, into the
    // pool.
    mount_details(
        &server, "dessert-beta", "Dessert Beta", 52.3650, 4.9100,
        &["bakery", "food"], 4.3, 150, ("0800", "1500"),
    )
    .await;
    mount_details(
        &server, "books-gamma", "Bookshop Gamma", 52.3600, 4.8950,
        &["book_store"], 4.4, 200, ("0900", "1800"),
    )
    .await;
    // ~11.5 km out: beyond the strict 10 km, inside the relaxed 14 km.
    mount_details(
        &server, "cafe-far", "Far Cafe", 52.4700, 4.9300,
        &["cafe"], 4.5, 300, ("0800", "2200"),
    )
    .await;
    mount_details(
        &server, "cafe-swapped", "Swapped Cafe", 52.3640, 4.9080,
        &["cafe"], 4.8, 1000, ("0900", "2300"),
    )
    .await;

    let engine = engine_for(&server);
    let mut rng = StdRng::seed_from_u64(1);
    let response = engine
        .recommend(
            request("Cozy", vec!["cafe-swapped".into()]),
            test_now(),
            &mut rng,
        )
        .await
        .expect("recommend");

    // Strict shortlist properties: allowed category, explicit open with a
    // known close, ≥75 minutes remaining, ≤10 km out.
    assert!(!response.options.is_empty());
    for option in &response.options {
        assert!(Vibe::Cozy.allowed_categories().contains(&option.category));
        assert!(option.distance_km <= 10.0);
        let close_ts = option.close_ts.expect("strict options have a close instant");
        assert!((close_ts - test_now()).num_minutes() >= 75);
        assert!(option.open_status.starts_with("Open until"));
        assert!(option.why.is_some());
    }

    let option_ids: Vec<&str> = response.options.iter().map(|o| o.id.as_str()).collect();
    assert!(option_ids.contains(&"cafe-alpha"));
    assert!(option_ids.contains(&"books-gamma"));
    assert!(!option_ids.contains(&"dessert-beta"));
    assert!(!option_ids.contains(&"cafe-far"));

    // Thin shortlist is reported, not an error; the dominant filtered-out
    // cause names the reason.
    assert!(response.meta.limited_availability);
    let reason = response.meta.reason.as_deref().expect("reason");
    assert!(reason.contains("closing"), "unexpected reason: {reason}");

    // Pool: relaxed policy, hard-excludes swapped ids and shortlist members.
    let pool_ids: Vec<&str> = response.meta.pool.iter().map(|o| o.id.as_str()).collect();
    assert!(pool_ids.contains(&"dessert-beta"));
    assert!(pool_ids.contains(&"cafe-far"));
    assert!(!pool_ids.contains(&"cafe-swapped"));
    for option in &response.meta.pool {
        assert!(option.distance_km <= 14.0);
        assert!(!option_ids.contains(&option.id.as_str()));
        if let Some(close_ts) = option.close_ts {
            assert!((close_ts - test_now()).num_minutes() >= 45);
        }
    }

    assert!(response.weather.available);
}

#[tokio::test]
async fn identical_requests_yield_identical_results_without_jitter() {
    let server = MockServer::start().await;
    mount_weather(&server, 5.0).await;
    mount_search(
        &server,
        &[
            search_result("cafe-alpha", "Cafe Alpha", 52.3700, 4.9000),
            search_result("books-gamma", "Bookshop Gamma", 52.3600, 4.8950),
        ],
    )
    .await;
    mount_details(
        &server, "cafe-alpha", "Cafe Alpha", 52.3700, 4.9000,
        &["cafe"], 4.6, 500, ("0800", "2200"),
    )
    .await;
    mount_details(
        &server, "books-gamma", "Bookshop Gamma", 52.3600, 4.8950,
        &["book_store"], 4.4, 200, ("0900", "2200"),
    )
    .await;

    let engine = engine_for(&server);
    let mut rng_a = StdRng::seed_from_u64(7);
    let mut rng_b = StdRng::seed_from_u64(4242);
    let first = engine
        .recommend(request("Cozy", vec![]), test_now(), &mut rng_a)
        .await
        .expect("first run");
    let second = engine
        .recommend(request("Cozy", vec![]), test_now(), &mut rng_b)
        .await
        .expect("second run");

    let first_ids: Vec<&str> = first.options.iter().map(|o| o.id.as_str()).collect();
    let second_ids: Vec<&str> = second.options.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn rain_blocks_outdoor_venues_from_both_pools() {
    let server = MockServer::start().await;
    mount_weather(&server, 80.0).await;
    mount_search(
        &server,
        &[
            search_result("park-delta", "Park Delta", 52.3700, 4.9000),
            search_result("cafe-alpha", "Cafe Alpha", 52.3650, 4.9100),
        ],
    )
    .await;
    mount_details(
        &server, "park-delta", "Park Delta", 52.3700, 4.9000,
        &["park"], 4.7, 900, ("0700", "2200"),
    )
    .await;
    mount_details(
        &server, "cafe-alpha", "Cafe Alpha", 52.3650, 4.9100,
        &["cafe"], 4.6, 500, ("0800", "2200"),
    )
    .await;

    let engine = engine_for(&server);
    let mut rng = StdRng::seed_from_u64(1);
    let response = engine
        .recommend(request("Outdoorsy", vec![]), test_now(), &mut rng)
        .await
        .expect("recommend");

    let all_ids: Vec<&str> = response
        .options
        .iter()
        .chain(response.meta.pool.iter())
        .map(|o| o.id.as_str())
        .collect();
    assert!(!all_ids.contains(&"park-delta"));
    assert!(all_ids.contains(&"cafe-alpha"));
    assert!(response.meta.limited_availability);
    let reason = response.meta.reason.as_deref().expect("reason");
    assert!(reason.contains("weather"), "unexpected reason: {reason}");
    assert!(response.options.iter().all(|o| o.category != Category::Park));
}

#[tokio::test]
async fn empty_supply_reports_limited_availability() {
    let server = MockServer::start().await;
    mount_weather(&server, 5.0).await;
    let body = serde_json::json!({ "status": "ZERO_RESULTS", "results": [] });
    Mock::given(method("GET"))
        .and(path("/maps/api/place/textsearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let mut rng = StdRng::seed_from_u64(1);
    let response = engine
        .recommend(request("Social", vec![]), test_now(), &mut rng)
        .await
        .expect("recommend");

    assert!(response.options.is_empty());
    assert!(response.meta.pool.is_empty());
    assert!(response.meta.limited_availability);
    assert!(response.meta.reason.is_some());
}

#[tokio::test]
async fn provider_outage_degrades_to_empty_supply_not_an_error() {
    let server = MockServer::start().await;
    mount_weather(&server, 5.0).await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/textsearch/json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    let mut rng = StdRng::seed_from_u64(1);
    let response = engine
        .recommend(request("Cozy", vec![]), test_now(), &mut rng)
        .await
        .expect("degraded run still succeeds");
    assert!(response.options.is_empty());
    assert!(response.meta.limited_availability);
}
