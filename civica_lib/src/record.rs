//! Normalized provider-independent records. Both adapters fold their wire
//! shapes into these before anything touches the store.

use crate::district::DistrictType;

/// One normalized official, ready for upsert.
#[derive(Debug, Clone)]
pub struct OfficialRecord {
    /// Provider external ID, unique per provider.
    pub external_id: String,
    /// Opaque cross-query identifier (GraphQL provider only).
    pub global_id: Option<String>,
    /// Which provider produced this record.
    pub source: String,
    pub slug: Option<String>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub preferred_name: Option<String>,
    pub name_suffix: Option<String>,
    pub party: Option<String>,
    pub party_short: Option<String>,
    pub photo_url: Option<String>,
    /// Ordered contact URLs.
    pub urls: Vec<String>,
    /// Lowercased, deduplicated email addresses.
    pub emails: Vec<String>,
    pub biography: Option<String>,
    pub total_years_in_office: Option<i32>,
    pub is_appointed: bool,
    pub is_vacant: bool,
    pub is_off_cycle: bool,
    pub valid_from: Option<String>,
    pub valid_to: Option<String>,
    pub office: OfficeRecord,
    pub addresses: Vec<AddressRecord>,
    pub identifiers: Vec<IdentifierRecord>,
    pub committees: Vec<CommitteeRecord>,
    pub images: Vec<ImageRecord>,
    pub degrees: Vec<DegreeRecord>,
    pub experiences: Vec<ExperienceRecord>,
    pub contacts: Vec<ContactRecord>,
}

impl OfficialRecord {
    /// The state this official represents, preferring the office's
    /// representing-state over the district state.
    pub fn state(&self) -> Option<&str> {
        self.office
            .representing_state
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.office.district.state.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct OfficeRecord {
    pub title: String,
    pub representing_state: Option<String>,
    pub representing_city: Option<String>,
    pub description: Option<String>,
    pub seats: Option<i32>,
    pub position_name: Option<String>,
    pub partisan_type: Option<String>,
    pub salary: Option<String>,
    pub is_appointed: bool,
    pub district: DistrictRecord,
    pub chamber: ChamberRecord,
}

#[derive(Debug, Clone)]
pub struct DistrictRecord {
    pub external_id: String,
    pub ocd_id: Option<String>,
    pub label: Option<String>,
    pub district_type: DistrictType,
    pub state: Option<String>,
    pub city: Option<String>,
    pub mtfcc: Option<String>,
    pub num_officials: Option<i32>,
    pub valid_from: Option<String>,
    pub valid_to: Option<String>,
    pub geo_id: Option<String>,
    pub is_judicial: bool,
    pub has_unknown_boundaries: bool,
    pub is_retention: bool,
}

#[derive(Debug, Clone)]
pub struct ChamberRecord {
    pub external_id: String,
    pub name: String,
    pub name_formal: Option<String>,
    pub official_count: Option<i32>,
    pub term_length: Option<String>,
    pub term_limit: Option<String>,
    pub inauguration_rules: Option<String>,
    pub election_rules: Option<String>,
    pub vacancy_rules: Option<String>,
    pub election_frequency: Option<String>,
    pub remarks: Option<String>,
    pub has_staggered_terms: bool,
    pub government: GovernmentRecord,
}

#[derive(Debug, Clone)]
pub struct GovernmentRecord {
    pub name: String,
    pub gov_type: String,
    pub state: String,
    pub city: String,
}

#[derive(Debug, Clone, Default)]
pub struct AddressRecord {
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub address_3: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone_1: Option<String>,
    pub phone_2: Option<String>,
    pub fax_1: Option<String>,
    pub fax_2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentifierRecord {
    pub identifier_type: String,
    pub identifier_value: String,
}

#[derive(Debug, Clone)]
pub struct CommitteeRecord {
    pub name: String,
    pub position: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub url: String,
    pub image_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DegreeRecord {
    pub degree: Option<String>,
    pub major: Option<String>,
    pub school: Option<String>,
    pub grad_year: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExperienceRecord {
    pub title: Option<String>,
    pub organization: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
    pub experience_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactRecord {
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub contact_type: Option<String>,
}

/// A person plus their candidacy graph, from the GraphQL provider.
#[derive(Debug, Clone)]
pub struct PersonCandidacies {
    pub global_id: String,
    pub candidacies: Vec<CandidacyRecord>,
}

#[derive(Debug, Clone)]
pub struct CandidacyRecord {
    pub external_id: String,
    pub election_name: Option<String>,
    pub election_day: Option<String>,
    pub position_name: Option<String>,
    pub status: Option<String>,
    pub result: Option<String>,
    pub party: Option<String>,
    pub endorsements: Vec<EndorsementRecord>,
    pub stances: Vec<StanceRecord>,
}

#[derive(Debug, Clone)]
pub struct EndorsementRecord {
    pub organization: OrganizationRecord,
}

#[derive(Debug, Clone)]
pub struct OrganizationRecord {
    pub external_id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StanceRecord {
    pub statement: Option<String>,
    pub reference_url: Option<String>,
    pub issue: IssueRecord,
}

/// Issue with optional parent chain; parents are upserted before children.
#[derive(Debug, Clone)]
pub struct IssueRecord {
    pub external_id: String,
    pub name: String,
    pub parent: Option<Box<IssueRecord>>,
}

/// A future race returned by the candidates-by-postal flow.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RaceRecord {
    pub external_id: String,
    pub election_name: Option<String>,
    pub election_day: Option<String>,
    pub position_name: Option<String>,
    pub level: Option<String>,
    pub candidates: Vec<RaceCandidate>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RaceCandidate {
    pub name: String,
    pub party: Option<String>,
}
