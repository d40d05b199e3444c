//! Wire types for the GraphQL responses.

use serde::Deserialize;

/// Standard GraphQL envelope.
#[derive(Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Debug)]
pub struct GraphQlError {
    pub message: String,
}

/// Relay connection.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

#[derive(Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeHoldersData {
    pub office_holders: Connection<OfficeHolderNode>,
}

/// One officeholder edge node: the person plus the position they hold.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeHolderNode {
    #[serde(default)]
    pub database_id: Option<i64>,
    pub person: PersonNode,
    pub position: PositionNode,
    #[serde(default)]
    pub office_title: Option<String>,
    #[serde(default)]
    pub total_years_in_office: Option<i32>,
    #[serde(default)]
    pub is_appointed: bool,
    #[serde(default)]
    pub is_vacant: bool,
    #[serde(default)]
    pub is_off_cycle: bool,
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonNode {
    /// Relay global ID, usable in cross-query `node()` lookups.
    pub id: String,
    pub database_id: i64,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub party: Option<PartyNode>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub bio_text: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contacts: Vec<ContactNode>,
    #[serde(default)]
    pub addresses: Vec<AddressNode>,
    #[serde(default)]
    pub degrees: Vec<DegreeNode>,
    #[serde(default)]
    pub experiences: Vec<ExperienceNode>,
    #[serde(default)]
    pub identifiers: Vec<IdentifierNode>,
    #[serde(default)]
    pub images: Vec<ImageNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionNode {
    pub database_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// FEDERAL | STATE | COUNTY | CITY | LOCAL | TOWNSHIP | REGIONAL.
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub judicial: bool,
    #[serde(default)]
    pub retention: bool,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub seats: Option<i32>,
    #[serde(default)]
    pub mtfcc: Option<String>,
    #[serde(default)]
    pub geo_id: Option<String>,
    #[serde(default)]
    pub ocd_id: Option<String>,
    #[serde(default)]
    pub partisan_type: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub appointed: bool,
    #[serde(default)]
    pub election_frequency: Option<String>,
    #[serde(default)]
    pub has_unknown_boundaries: bool,
    #[serde(default)]
    pub normalized_position: Option<NormalizedPositionNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPositionNode {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactNode {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub fax: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressNode {
    #[serde(default)]
    pub address_line_1: Option<String>,
    #[serde(default)]
    pub address_line_2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub fax: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegreeNode {
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub grad_year: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceNode {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub start_year: Option<String>,
    #[serde(default)]
    pub end_year: Option<String>,
    #[serde(default)]
    pub experience_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierNode {
    pub identifier_type: String,
    pub identifier_value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageNode {
    pub url: String,
    #[serde(default)]
    pub image_type: Option<String>,
}

// Candidacy queries.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData<T> {
    pub node: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonCandidaciesNode {
    pub id: String,
    #[serde(default = "Vec::new")]
    pub candidacies: Vec<CandidacyNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidacyNode {
    pub database_id: i64,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub party: Option<PartyNode>,
    #[serde(default)]
    pub election: Option<ElectionNode>,
    #[serde(default)]
    pub position: Option<PositionRefNode>,
    #[serde(default)]
    pub endorsements: Vec<EndorsementNode>,
    #[serde(default)]
    pub stances: Vec<StanceNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub election_day: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRefNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndorsementNode {
    pub organization: OrganizationNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationNode {
    pub database_id: i64,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StanceNode {
    #[serde(default)]
    pub statement: Option<String>,
    #[serde(default)]
    pub reference_url: Option<String>,
    pub issue: IssueNode,
}

/// Issue with its parent chain inlined to a fixed query depth.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueNode {
    pub database_id: i64,
    pub name: String,
    #[serde(default)]
    pub parent_issue: Option<Box<IssueNode>>,
}

// Race queries.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RacesData {
    pub races: Connection<RaceNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceNode {
    pub database_id: i64,
    #[serde(default)]
    pub election: Option<ElectionNode>,
    #[serde(default)]
    pub position: Option<PositionRefNode>,
    #[serde(default)]
    pub candidacies: Vec<RaceCandidacyNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceCandidacyNode {
    #[serde(default)]
    pub person: Option<RacePersonNode>,
    #[serde(default)]
    pub party: Option<PartyNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RacePersonNode {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

// Containment query.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionContainmentData {
    pub positions: Connection<PositionContainmentNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionContainmentNode {
    pub database_id: i64,
    #[serde(default)]
    pub contains_geography: bool,
}
