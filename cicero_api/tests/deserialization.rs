use cicero_api::types::OfficialsResponse;

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_officials_full() {
    let json = load_fixture("officials.json");
    let resp: OfficialsResponse = serde_json::from_str(&json).unwrap();
    assert!(resp.response.errors.is_empty());

    let candidates = &resp.response.results.candidates;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].match_addr.as_deref(), Some("47401"));

    let senator = &candidates[0].officials[0];
    assert_eq!(senator.first_name, "Todd");
    assert_eq!(senator.last_name, "Young");
    assert_eq!(senator.party.as_deref(), Some("Republican"));
    assert_eq!(senator.office.title, "Senator");
    assert_eq!(senator.office.representing_state.as_deref(), Some("IN"));
    assert_eq!(senator.office.district.sk, 353);
    assert_eq!(senator.office.chamber.government.gov_type, "NATIONAL");
    assert_eq!(senator.identifiers.len(), 2);
    assert_eq!(senator.addresses[0].phone_1.as_deref(), Some("202-224-5623"));
    assert!(senator.office.chamber.has_staggered_terms);

    let mayor = &candidates[0].officials[1];
    assert_eq!(mayor.office.district.district_type, "LOCAL_EXEC");
    assert_eq!(
        mayor.office.representing_city.as_deref(),
        Some("Bloomington")
    );
    assert!(mayor.addresses.is_empty());
}

#[test]
fn deserialize_minimal_official() {
    // Sparse records (nulls and missing collections) must still parse.
    let json = r#"{
      "response": {
        "results": {
          "candidates": [{
            "officials": [{
              "id": 1,
              "first_name": "Jane",
              "last_name": "Doe",
              "office": {
                "title": "Clerk",
                "district": { "sk": 9, "district_type": "LOCAL" },
                "chamber": {
                  "id": 7,
                  "name": "Clerk",
                  "government": { "name": "Town of Example", "type": "CITY" }
                }
              }
            }]
          }]
        }
      }
    }"#;
    let resp: OfficialsResponse = serde_json::from_str(json).unwrap();
    let official = &resp.response.results.candidates[0].officials[0];
    assert_eq!(official.id, 1);
    assert!(official.urls.is_empty());
    assert!(official.party.is_none());
    assert_eq!(official.office.district.district_type, "LOCAL");
}
