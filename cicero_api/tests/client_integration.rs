use cicero_api::{Client, OfficialQuery, PAGE_MAX};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[tokio::test]
async fn get_officials_success() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("officials.json");

    Mock::given(method("GET"))
        .and(path("/official"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key".into()).unwrap();
    let query = OfficialQuery::default().with_postal("47401");
    let resp = client.get_officials(&query).await.unwrap();

    let officials = &resp.response.results.candidates[0].officials;
    assert_eq!(officials.len(), 2);
    assert_eq!(officials[0].id, 337866);
    assert_eq!(officials[0].office.district.district_type, "NATIONAL_UPPER");
}

#[tokio::test]
async fn get_officials_sends_key_and_location() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("officials.json");

    Mock::given(method("GET"))
        .and(path("/official"))
        .and(query_param("key", "test-key"))
        .and(query_param("search_loc", "47401"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key".into()).unwrap();
    let query = OfficialQuery::default().with_postal("47401");
    assert!(client.get_officials(&query).await.is_ok());
}

#[tokio::test]
async fn get_officials_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/official"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key".into()).unwrap();
    let result = client.get_officials(&OfficialQuery::default()).await;
    assert!(matches!(
        result,
        Err(cicero_api::Error::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn get_officials_api_errors() {
    let mock_server = MockServer::start().await;
    let body = serde_json::json!({
        "response": {
            "results": { "candidates": [] },
            "errors": ["Invalid API key"]
        }
    });

    Mock::given(method("GET"))
        .and(path("/official"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "bad-key".into()).unwrap();
    let result = client.get_officials(&OfficialQuery::default()).await;
    assert!(matches!(result, Err(cicero_api::Error::ApiErrors(_))));
}

#[tokio::test]
async fn get_officials_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/official"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key".into()).unwrap();
    let result = client.get_officials(&OfficialQuery::default()).await;
    assert!(result.is_err());
}

fn page_body(count: i64, id_base: i64) -> serde_json::Value {
    let official = serde_json::from_str::<serde_json::Value>(&load_fixture("officials.json"))
        .unwrap()["response"]["results"]["candidates"][0]["officials"][0]
        .clone();
    let officials: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            let mut o = official.clone();
            o["id"] = serde_json::json!(id_base + i);
            o
        })
        .collect();
    serde_json::json!({
        "response": {
            "results": {
                "candidates": [{ "match_addr": "47401", "officials": officials }]
            },
            "errors": []
        }
    })
}

#[tokio::test]
async fn pagination_stops_on_short_page() {
    let mock_server = MockServer::start().await;

    // Full first page keeps pagination going; short second page ends it.
    Mock::given(method("GET"))
        .and(path("/official"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(PAGE_MAX, 1000)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/official"))
        .and(query_param("offset", PAGE_MAX.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(3, 5000)))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key".into()).unwrap();
    let officials = client.get_all_officials("47401", &[]).await.unwrap();
    assert_eq!(officials.len(), (PAGE_MAX + 3) as usize);
}

#[tokio::test]
async fn pagination_single_short_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/official"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(8, 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key".into()).unwrap();
    let officials = client
        .get_all_officials("47401", &["NATIONAL_UPPER"])
        .await
        .unwrap();
    assert_eq!(officials.len(), 8);
}
