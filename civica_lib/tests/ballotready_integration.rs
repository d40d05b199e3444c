use civica_lib::ballotready::{Client, PAGE_SIZE};
use civica_lib::district::DistrictType;
use civica_lib::provider::Provider;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn holder_node(person_id: i64, level: &str, name: &str) -> serde_json::Value {
    json!({
        "databaseId": person_id * 10,
        "officeTitle": name,
        "person": {
            "id": format!("person-gid-{}", person_id),
            "databaseId": person_id,
            "firstName": "Test",
            "lastName": format!("Person{}", person_id),
            "party": { "name": "Independent", "shortName": "I" },
            "urls": []
        },
        "position": {
            "databaseId": person_id + 9000,
            "name": name,
            "level": level,
            "judicial": false,
            "state": "IN",
            "electionFrequency": "4 years"
        }
    })
}

fn page(nodes: Vec<serde_json::Value>, has_next: bool, cursor: Option<&str>) -> serde_json::Value {
    json!({
        "data": {
            "officeHolders": {
                "edges": nodes.into_iter().map(|n| json!({ "node": n })).collect::<Vec<_>>(),
                "pageInfo": { "hasNextPage": has_next, "endCursor": cursor }
            }
        }
    })
}

#[tokio::test]
async fn office_holders_single_page() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                holder_node(1, "FEDERAL", "US Senator"),
                holder_node(2, "CITY", "Mayor"),
            ],
            false,
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_endpoint(&mock_server.uri(), "key".into()).unwrap();
    let nodes = client.office_holders_by_zip("47401").await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].person.database_id, 1);
}

#[tokio::test]
async fn office_holders_cursor_pagination() {
    let mock_server = MockServer::start().await;

    // First page advertises more data with a cursor; second page ends it.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "after": "cursor-1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![holder_node(2, "CITY", "Mayor")],
            false,
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![holder_node(1, "FEDERAL", "US Senator")],
            true,
            Some("cursor-1"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_endpoint(&mock_server.uri(), "key".into()).unwrap();
    let nodes = client.office_holders_by_zip("47401").await.unwrap();
    assert_eq!(nodes.len(), 2);
}

#[tokio::test]
async fn pagination_stops_on_empty_end_cursor() {
    let mock_server = MockServer::start().await;

    // hasNextPage=true but an empty cursor must terminate, not loop.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![holder_node(1, "FEDERAL", "US Senator")],
            true,
            Some(""),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_endpoint(&mock_server.uri(), "key".into()).unwrap();
    let nodes = client.office_holders_by_zip("47401").await.unwrap();
    assert_eq!(nodes.len(), 1);
}

#[tokio::test]
async fn graphql_errors_are_distinct() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "rate limited" }]
        })))
        .mount(&mock_server)
        .await;

    let client = Client::with_endpoint(&mock_server.uri(), "key".into()).unwrap();
    let result = client.office_holders_by_zip("47401").await;
    assert!(matches!(
        result,
        Err(civica_lib::ballotready::Error::GraphQl(_))
    ));
}

#[tokio::test]
async fn http_error_is_distinct() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&mock_server)
        .await;

    let client = Client::with_endpoint(&mock_server.uri(), "key".into()).unwrap();
    let result = client.office_holders_by_zip("47401").await;
    assert!(matches!(
        result,
        Err(civica_lib::ballotready::Error::HttpStatus { status: 502, .. })
    ));
}

#[tokio::test]
async fn requests_carry_page_size_and_auth() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "first": PAGE_SIZE } })))
        .and(|req: &Request| {
            req.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == "Bearer secret-key")
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], false, None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_endpoint(&mock_server.uri(), "secret-key".into()).unwrap();
    let nodes = client.office_holders_by_zip("47401").await.unwrap();
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn provider_filters_by_district_type() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                holder_node(1, "FEDERAL", "US Senator"),
                holder_node(2, "CITY", "Mayor"),
                holder_node(3, "LOCAL", "School Board Member"),
            ],
            false,
            None,
        )))
        .mount(&mock_server)
        .await;

    let client = Client::with_endpoint(&mock_server.uri(), "key".into()).unwrap();
    let provider = civica_lib::ballotready::BallotReadyProvider::new(client);
    let records = provider
        .fetch_by_postal("47401", Some(&[DistrictType::NationalUpper]))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].external_id, "br-person-1");
}

#[tokio::test]
async fn containment_pairs_use_district_external_ids() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "positions": {
                    "edges": [
                        { "node": { "databaseId": 9001, "containsGeography": true } },
                        { "node": { "databaseId": 9002, "containsGeography": false } }
                    ],
                    "pageInfo": { "hasNextPage": false, "endCursor": null }
                }
            }
        })))
        .mount(&mock_server)
        .await;

    let client = Client::with_endpoint(&mock_server.uri(), "key".into()).unwrap();
    let provider = civica_lib::ballotready::BallotReadyProvider::new(client);
    let pairs = provider
        .fetch_position_containment_by_postal("47401")
        .await
        .unwrap();
    assert_eq!(
        pairs,
        vec![
            ("br-position-9001".to_string(), true),
            ("br-position-9002".to_string(), false)
        ]
    );
}
