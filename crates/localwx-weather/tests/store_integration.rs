//! Store behavior against a mock weather service and catalog.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use localwx_core::{NetworkError, Phase};
use localwx_weather::{
    filter, CatalogError, CatalogSource, LocalityStore, WeatherClient, WeatherStore,
};
use tokio::runtime::Handle;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reading_body(temperature: f64) -> serde_json::Value {
    serde_json::json!({
        "status": 200,
        "device_type": 1,
        "locality_weather_data": {
            "temperature": temperature,
            "humidity": 60,
            "wind_speed": 3.2,
            "wind_direction": 180,
            "rain_intensity": 0,
            "rain_accumulation": 0
        }
    })
}

fn catalog_body() -> serde_json::Value {
    serde_json::json!([
        {"cityName": "Bengaluru", "localityName": "Koramangala", "localityId": "X1",
         "latitude": 12.9352, "longitude": 77.6245, "device_type": "1"},
        {"cityName": "Bengaluru", "localityName": "Koramangala 5th Block", "localityId": "X2",
         "latitude": 12.9348, "longitude": 77.6189, "device_type": "1"},
        {"cityName": "Bengaluru", "localityName": "Indiranagar", "localityId": "Y1",
         "latitude": 12.9784, "longitude": 77.6408, "device_type": "2"}
    ])
}

fn weather_store(server: &MockServer) -> WeatherStore {
    let client = WeatherClient::new(
        &format!("{}/weather", server.uri()),
        Some("secret".into()),
        Duration::from_secs(5),
    )
    .unwrap();
    WeatherStore::new(Arc::new(client), Handle::current())
}

async fn mount_reading(server: &MockServer, locality_id: &str, temperature: f64, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("locality_id", locality_id))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reading_body(temperature))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_by_locality_success() {
    let mock_server = MockServer::start().await;
    mount_reading(&mock_server, "X1", 27.5, Duration::ZERO).await;

    let mut store = weather_store(&mock_server);
    store.fetch_by_locality("X1");
    assert!(store.state().loading);

    store.settle().await;

    let state = store.state();
    assert_eq!(state.phase(), Phase::Success);
    assert!(!state.loading);
    let data = state.data.as_ref().unwrap();
    assert_eq!(data.device_type, 1);
    assert_eq!(data.locality_weather.temperature, Some(27.5));
}

#[tokio::test]
async fn test_server_error_keeps_previous_reading() {
    let mock_server = MockServer::start().await;
    mount_reading(&mock_server, "X1", 27.5, Duration::ZERO).await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("locality_id", "X9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut store = weather_store(&mock_server);
    store.fetch_by_locality("X1");
    store.settle().await;
    let before = store.state().data.clone();

    store.fetch_by_locality("X9");
    store.settle().await;

    let state = store.state();
    assert_eq!(state.phase(), Phase::Failure);
    assert!(!state.loading);
    assert!(!state.error.as_deref().unwrap_or_default().is_empty());
    assert_eq!(state.data, before);
}

#[tokio::test]
async fn test_slow_earlier_request_does_not_overwrite_later() {
    let mock_server = MockServer::start().await;
    mount_reading(&mock_server, "A", 11.0, Duration::from_millis(400)).await;
    mount_reading(&mock_server, "B", 22.0, Duration::ZERO).await;

    let mut store = weather_store(&mock_server);
    store.fetch_by_locality("A");
    store.fetch_by_locality("B");
    store.settle().await;

    let state = store.state();
    assert_eq!(state.phase(), Phase::Success);
    let data = state.data.as_ref().unwrap();
    assert_eq!(data.locality_id, "B");
    assert_eq!(data.locality_weather.temperature, Some(22.0));
}

#[tokio::test]
async fn test_same_locality_is_fetched_again() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("locality_id", "X1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reading_body(25.0)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut store = weather_store(&mock_server);
    store.fetch_by_locality("X1");
    store.settle().await;
    store.fetch_by_locality("X1");
    store.settle().await;

    assert_eq!(store.state().phase(), Phase::Success);
}

#[tokio::test]
async fn test_reset_while_in_flight_stays_idle() {
    let mock_server = MockServer::start().await;
    mount_reading(&mock_server, "X1", 27.5, Duration::from_millis(100)).await;

    let mut store = weather_store(&mock_server);
    store.fetch_by_locality("X1");
    store.reset();
    store.settle().await;

    assert_eq!(store.state().phase(), Phase::Idle);
    assert!(store.state().data.is_none());
}

#[tokio::test]
async fn test_remote_catalog_feeds_search() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/localities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = CatalogSource::remote(
        &format!("{}/api/localities", mock_server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    let mut store = LocalityStore::new(source, Handle::current());
    assert!(store.mount());
    store.settle().await;

    assert_eq!(store.state().phase(), Phase::Success);
    let ids: Vec<&str> = filter("kor", store.catalog())
        .iter()
        .map(|r| r.locality_id.as_str())
        .collect();
    assert_eq!(ids, vec!["X1", "X2"]);
    assert!(filter("zz", store.catalog()).is_empty());

    // Already loaded: mounting again does not refetch.
    assert!(!store.mount());
}

#[tokio::test]
async fn test_remote_catalog_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/localities"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let source = CatalogSource::remote(
        &format!("{}/api/localities", mock_server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    let mut store = LocalityStore::new(source, Handle::current());
    store.mount();
    store.settle().await;

    assert_eq!(store.state().phase(), Phase::Failure);
    assert!(store.state().error.as_deref().unwrap().contains("503"));
    assert!(filter("kor", store.catalog()).is_empty());
}

#[tokio::test]
async fn test_remote_catalog_uses_configured_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/localities"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(catalog_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let source = CatalogSource::remote(
        &format!("{}/api/localities", mock_server.uri()),
        Duration::from_millis(200),
    )
    .unwrap();
    let err = source.load().await.unwrap_err();
    assert!(matches!(err, CatalogError::Network(NetworkError::Timeout)));
}

#[tokio::test]
async fn test_file_catalog_loads() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", catalog_body()).unwrap();

    let mut store = LocalityStore::new(CatalogSource::file(file.path()), Handle::current());
    store.mount();
    store.settle().await;

    assert_eq!(store.catalog().len(), 3);
    assert_eq!(store.catalog()[2].locality_name, "Indiranagar");
}

#[tokio::test]
async fn test_poll_applies_without_waiting() {
    let mock_server = MockServer::start().await;
    mount_reading(&mock_server, "X1", 27.5, Duration::ZERO).await;

    let mut store = weather_store(&mock_server);
    store.fetch_by_locality("X1");
    assert_eq!(store.poll(), 0);
    assert!(store.state().loading);

    for _ in 0..100 {
        if store.poll() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(store.state().phase(), Phase::Success);
}
