use civica_lib::geocode::Geocoder;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ok_body() -> serde_json::Value {
    json!({
        "status": "OK",
        "results": [{
            "formatted_address": "1600 Pennsylvania Avenue NW, Washington, DC 20500, USA",
            "geometry": { "location": { "lat": 38.8977, "lng": -77.0365 } },
            "address_components": [
                { "short_name": "DC", "types": ["administrative_area_level_1", "political"] },
                { "short_name": "20500", "types": ["postal_code"] }
            ]
        }]
    })
}

#[tokio::test]
async fn geocode_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("key", "geo-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&mock_server)
        .await;

    let geocoder = Geocoder::with_base_url(&mock_server.uri(), "geo-key".into()).unwrap();
    let result = geocoder
        .geocode("1600 Pennsylvania Ave NW, Washington, DC")
        .await
        .unwrap()
        .unwrap();
    assert!((result.lat - 38.8977).abs() < 1e-6);
    assert!((result.lng - -77.0365).abs() < 1e-6);
    assert_eq!(result.state.as_deref(), Some("DC"));
    assert_eq!(result.postal.as_deref(), Some("20500"));
}

#[tokio::test]
async fn geocode_zero_results_is_none() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .mount(&mock_server)
        .await;

    let geocoder = Geocoder::with_base_url(&mock_server.uri(), "geo-key".into()).unwrap();
    let result = geocoder.geocode("nowhere at all").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn geocode_denied_is_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "REQUEST_DENIED", "results": [] })),
        )
        .mount(&mock_server)
        .await;

    let geocoder = Geocoder::with_base_url(&mock_server.uri(), "bad-key".into()).unwrap();
    assert!(geocoder.geocode("anywhere").await.is_err());
}
