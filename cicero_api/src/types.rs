//! Wire types returned by the officials endpoint.

use serde::{Deserialize, Serialize};

/// Top-level envelope: everything lives under `response`.
#[derive(Serialize, Deserialize)]
pub struct OfficialsResponse {
    pub response: ResponseBody,
}

#[derive(Serialize, Deserialize)]
pub struct ResponseBody {
    pub results: Results,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Result container. Each candidate is one interpretation of the searched
/// location; officials are nested per candidate.
#[derive(Serialize, Deserialize)]
pub struct Results {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub match_addr: Option<String>,
    #[serde(default)]
    pub officials: Vec<Official>,
}

/// One currently-serving official.
#[derive(Serialize, Deserialize)]
pub struct Official {
    /// Numeric Cicero identifier, unique per official record.
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub middle_initial: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub name_suffix: Option<String>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub photo_origin_url: Option<String>,
    #[serde(default)]
    pub web_form_url: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub email_addresses: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub identifiers: Vec<Identifier>,
    #[serde(default)]
    pub committees: Vec<Committee>,
    pub office: Office,
    #[serde(default)]
    pub current_term_start_date: Option<String>,
    #[serde(default)]
    pub term_end_date: Option<String>,
    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub valid_to: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub address_1: Option<String>,
    #[serde(default)]
    pub address_2: Option<String>,
    #[serde(default)]
    pub address_3: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone_1: Option<String>,
    #[serde(default)]
    pub phone_2: Option<String>,
    #[serde(default)]
    pub fax_1: Option<String>,
    #[serde(default)]
    pub fax_2: Option<String>,
}

/// External identifier pair (e.g. `TWITTER` / handle, `BIOGUIDE` / code).
#[derive(Serialize, Deserialize)]
pub struct Identifier {
    pub identifier_type: String,
    pub identifier_value: String,
}

#[derive(Serialize, Deserialize)]
pub struct Committee {
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct Office {
    pub title: String,
    #[serde(default)]
    pub representing_state: Option<String>,
    #[serde(default)]
    pub representing_city: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub district: District,
    pub chamber: Chamber,
}

#[derive(Serialize, Deserialize)]
pub struct District {
    /// Numeric surrogate key for the district record.
    pub sk: i64,
    #[serde(default)]
    pub ocd_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    /// One of the Cicero district-type strings (e.g. `NATIONAL_UPPER`, `LOCAL`).
    pub district_type: String,
    #[serde(default)]
    pub district_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub num_officials: Option<i32>,
    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub valid_to: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct Chamber {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_formal: Option<String>,
    #[serde(default)]
    pub official_count: Option<i32>,
    #[serde(default)]
    pub term_length: Option<String>,
    #[serde(default)]
    pub term_limit: Option<String>,
    #[serde(default)]
    pub inauguration_rules: Option<String>,
    #[serde(default)]
    pub election_rules: Option<String>,
    #[serde(default)]
    pub vacancy_rules: Option<String>,
    #[serde(default)]
    pub election_frequency: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub has_staggered_terms: bool,
    pub government: Government,
}

#[derive(Serialize, Deserialize)]
pub struct Government {
    pub name: String,
    #[serde(rename = "type")]
    pub gov_type: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}
