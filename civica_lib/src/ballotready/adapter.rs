//! Normalization of GraphQL nodes into provider-independent records, and
//! the [`Provider`] implementation over them.

use async_trait::async_trait;

use crate::district::{map_district_type, DistrictType, PositionLevel};
use crate::provider::{Provider, ProviderError};
use crate::record::{
    AddressRecord, CandidacyRecord, ChamberRecord, ContactRecord, DegreeRecord, DistrictRecord,
    EndorsementRecord, ExperienceRecord, GovernmentRecord, IdentifierRecord, ImageRecord,
    IssueRecord, OfficeRecord, OfficialRecord, OrganizationRecord, PersonCandidacies,
    RaceCandidate, RaceRecord, StanceRecord,
};

use super::client::Client;
use super::types::{IssueNode, OfficeHolderNode, PositionNode};

pub const SOURCE: &str = "ballotready";

/// GraphQL-backed provider adapter.
pub struct BallotReadyProvider {
    client: Client,
}

impl BallotReadyProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// District-type classification for a position node.
fn classify(position: &PositionNode) -> DistrictType {
    let level = PositionLevel::parse(position.level.as_deref().unwrap_or(""));
    let name = position
        .normalized_position
        .as_ref()
        .and_then(|n| n.name.as_deref())
        .or(position.name.as_deref())
        .unwrap_or("");
    map_district_type(level, position.judicial, name)
}

fn synth_government(position: &PositionNode) -> GovernmentRecord {
    let state = position.state.clone().unwrap_or_default();
    let city = position.city.clone().unwrap_or_default();
    let level = position
        .level
        .as_deref()
        .unwrap_or("")
        .to_uppercase();
    match level.as_str() {
        "FEDERAL" => GovernmentRecord {
            name: "United States Federal Government".to_string(),
            gov_type: "NATIONAL".to_string(),
            state: String::new(),
            city: String::new(),
        },
        "STATE" => GovernmentRecord {
            name: format!("State of {}", state),
            gov_type: "STATE".to_string(),
            state,
            city: String::new(),
        },
        "COUNTY" | "REGIONAL" => GovernmentRecord {
            name: position
                .label
                .clone()
                .or_else(|| position.name.clone())
                .unwrap_or_else(|| format!("{} County Government", state)),
            gov_type: "COUNTY".to_string(),
            state,
            city: String::new(),
        },
        _ => GovernmentRecord {
            name: if city.is_empty() {
                position
                    .label
                    .clone()
                    .or_else(|| position.name.clone())
                    .unwrap_or_else(|| "Local Government".to_string())
            } else {
                format!("City of {}", city)
            },
            gov_type: "LOCAL".to_string(),
            state,
            city,
        },
    }
}

/// Folds one officeholder node into the canonical record shape.
pub fn normalize(node: OfficeHolderNode) -> OfficialRecord {
    let district_type = classify(&node.position);
    let position = node.position;
    let person = node.person;

    let mut emails: Vec<String> = Vec::new();
    for email in person
        .email
        .iter()
        .chain(person.contacts.iter().filter_map(|c| c.email.as_ref()))
    {
        let email = email.to_lowercase();
        if !emails.contains(&email) {
            emails.push(email);
        }
    }

    let government = synth_government(&position);
    let district = DistrictRecord {
        external_id: format!("br-position-{}", position.database_id),
        ocd_id: position.ocd_id.clone(),
        label: position.label.clone(),
        district_type,
        state: position.state.clone(),
        city: position.city.clone(),
        mtfcc: position.mtfcc.clone(),
        num_officials: position.seats,
        valid_from: None,
        valid_to: None,
        geo_id: position.geo_id.clone(),
        is_judicial: position.judicial,
        has_unknown_boundaries: position.has_unknown_boundaries,
        is_retention: position.retention,
    };
    let chamber = ChamberRecord {
        external_id: format!("br-chamber-{}", position.database_id),
        name: position.name.clone().unwrap_or_default(),
        name_formal: position.label.clone(),
        official_count: position.seats,
        term_length: None,
        term_limit: None,
        inauguration_rules: None,
        election_rules: None,
        vacancy_rules: None,
        election_frequency: position.election_frequency.clone(),
        remarks: None,
        has_staggered_terms: false,
        government,
    };
    let office = OfficeRecord {
        title: node
            .office_title
            .or_else(|| position.name.clone())
            .unwrap_or_default(),
        representing_state: position.state.clone(),
        representing_city: position.city.clone(),
        description: position.description.clone(),
        seats: position.seats,
        position_name: position
            .normalized_position
            .as_ref()
            .and_then(|n| n.name.clone())
            .or_else(|| position.name.clone()),
        partisan_type: position.partisan_type.clone(),
        salary: position.salary.clone(),
        is_appointed: node.is_appointed || position.appointed,
        district,
        chamber,
    };

    OfficialRecord {
        external_id: format!("br-person-{}", person.database_id),
        global_id: Some(person.id),
        source: SOURCE.to_string(),
        slug: person.slug,
        first_name: person.first_name.unwrap_or_default(),
        middle_name: person.middle_name,
        last_name: person.last_name.unwrap_or_default(),
        preferred_name: person.nickname,
        name_suffix: person.suffix,
        party: person.party.as_ref().and_then(|p| p.name.clone()),
        party_short: person.party.as_ref().and_then(|p| p.short_name.clone()),
        photo_url: person.photo_url,
        urls: person.urls,
        emails,
        biography: person.bio_text,
        total_years_in_office: node.total_years_in_office,
        is_appointed: node.is_appointed,
        is_vacant: node.is_vacant,
        is_off_cycle: node.is_off_cycle,
        valid_from: node.start_at,
        valid_to: node.end_at,
        office,
        addresses: person
            .addresses
            .into_iter()
            .map(|a| AddressRecord {
                address_1: a.address_line_1,
                address_2: a.address_line_2,
                address_3: None,
                city: a.city,
                state: a.state,
                postal_code: a.zip,
                phone_1: a.phone,
                phone_2: None,
                fax_1: a.fax,
                fax_2: None,
            })
            .collect(),
        identifiers: person
            .identifiers
            .into_iter()
            .map(|i| IdentifierRecord {
                identifier_type: i.identifier_type,
                identifier_value: i.identifier_value,
            })
            .collect(),
        committees: Vec::new(),
        images: person
            .images
            .into_iter()
            .map(|i| ImageRecord {
                url: i.url,
                image_type: i.image_type,
            })
            .collect(),
        degrees: person
            .degrees
            .into_iter()
            .map(|d| DegreeRecord {
                degree: d.degree,
                major: d.major,
                school: d.school,
                grad_year: d.grad_year,
            })
            .collect(),
        experiences: person
            .experiences
            .into_iter()
            .map(|e| ExperienceRecord {
                title: e.title,
                organization: e.organization,
                start_year: e.start_year,
                end_year: e.end_year,
                experience_type: e.experience_type,
            })
            .collect(),
        contacts: person
            .contacts
            .into_iter()
            .map(|c| ContactRecord {
                phone: c.phone,
                fax: c.fax,
                email: c.email.map(|e| e.to_lowercase()),
                contact_type: c.contact_type,
            })
            .collect(),
    }
}

fn issue_from_node(node: &IssueNode) -> IssueRecord {
    IssueRecord {
        external_id: format!("br-issue-{}", node.database_id),
        name: node.name.clone(),
        parent: node
            .parent_issue
            .as_deref()
            .map(|p| Box::new(issue_from_node(p))),
    }
}

#[async_trait]
impl Provider for BallotReadyProvider {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch_by_postal(
        &self,
        postal: &str,
        filter: Option<&[DistrictType]>,
    ) -> Result<Vec<OfficialRecord>, ProviderError> {
        let nodes = self.client.office_holders_by_zip(postal).await?;
        let mut records: Vec<OfficialRecord> = nodes.into_iter().map(normalize).collect();
        if let Some(types) = filter {
            records.retain(|r| types.contains(&r.office.district.district_type));
        }
        Ok(records)
    }

    async fn fetch_by_address(&self, address: &str) -> Result<Vec<OfficialRecord>, ProviderError> {
        let nodes = self.client.office_holders_by_address(address).await?;
        Ok(nodes.into_iter().map(normalize).collect())
    }

    async fn fetch_candidacy_data(
        &self,
        global_id: &str,
    ) -> Result<Option<PersonCandidacies>, ProviderError> {
        let Some(node) = self.client.person_candidacies(global_id).await? else {
            return Ok(None);
        };
        let candidacies = node
            .candidacies
            .into_iter()
            .map(|c| CandidacyRecord {
                external_id: format!("br-candidacy-{}", c.database_id),
                election_name: c.election.as_ref().and_then(|e| e.name.clone()),
                election_day: c.election.as_ref().and_then(|e| e.election_day.clone()),
                position_name: c.position.as_ref().and_then(|p| p.name.clone()),
                status: c.status,
                result: c.result,
                party: c.party.as_ref().and_then(|p| p.name.clone()),
                endorsements: c
                    .endorsements
                    .into_iter()
                    .map(|e| EndorsementRecord {
                        organization: OrganizationRecord {
                            external_id: format!("br-org-{}", e.organization.database_id),
                            name: e.organization.name,
                            logo_url: e.organization.logo_url,
                            website_url: e.organization.website_url,
                        },
                    })
                    .collect(),
                stances: c
                    .stances
                    .into_iter()
                    .map(|s| StanceRecord {
                        statement: s.statement,
                        reference_url: s.reference_url,
                        issue: issue_from_node(&s.issue),
                    })
                    .collect(),
            })
            .collect();
        Ok(Some(PersonCandidacies {
            global_id: node.id,
            candidacies,
        }))
    }

    async fn fetch_races_by_postal(
        &self,
        postal: &str,
    ) -> Result<Vec<RaceRecord>, ProviderError> {
        let today = chrono::Utc::now().date_naive();
        let races = self.client.races_by_zip(postal, today).await?;
        Ok(races
            .into_iter()
            .map(|r| RaceRecord {
                external_id: format!("br-race-{}", r.database_id),
                election_name: r.election.as_ref().and_then(|e| e.name.clone()),
                election_day: r.election.as_ref().and_then(|e| e.election_day.clone()),
                position_name: r.position.as_ref().and_then(|p| p.name.clone()),
                level: r.position.as_ref().and_then(|p| p.level.clone()),
                candidates: r
                    .candidacies
                    .into_iter()
                    .filter_map(|c| {
                        let person = c.person?;
                        let name = format!(
                            "{} {}",
                            person.first_name.unwrap_or_default(),
                            person.last_name.unwrap_or_default()
                        )
                        .trim()
                        .to_string();
                        Some(RaceCandidate {
                            name,
                            party: c.party.as_ref().and_then(|p| p.name.clone()),
                        })
                    })
                    .collect(),
            })
            .collect())
    }

    async fn fetch_position_containment_by_postal(
        &self,
        postal: &str,
    ) -> Result<Vec<(String, bool)>, ProviderError> {
        let positions = self.client.position_containment_by_zip(postal).await?;
        Ok(positions
            .into_iter()
            .map(|p| {
                (
                    format!("br-position-{}", p.database_id),
                    p.contains_geography,
                )
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.client.health_check().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballotready::types::OfficeHolderNode;

    fn node_json(level: &str, judicial: bool, name: &str) -> serde_json::Value {
        serde_json::json!({
            "databaseId": 11,
            "officeTitle": name,
            "isAppointed": false,
            "person": {
                "id": "UGVyc29uOjQy",
                "databaseId": 42,
                "firstName": "Pat",
                "lastName": "Doe",
                "email": "Pat.Doe@Example.GOV",
                "party": { "name": "Independent", "shortName": "I" },
                "urls": ["https://example.gov"],
                "contacts": [{ "email": "OFFICE@example.gov", "phone": "555-1212" }]
            },
            "position": {
                "databaseId": 9001,
                "name": name,
                "level": level,
                "judicial": judicial,
                "state": "CA",
                "city": "Los Angeles",
                "seats": 1,
                "geoId": "0644000",
                "mtfcc": "G4110",
                "electionFrequency": "4 years"
            }
        })
    }

    #[test]
    fn normalize_maps_core_fields() {
        let node: OfficeHolderNode =
            serde_json::from_value(node_json("CITY", false, "Mayor")).unwrap();
        let record = normalize(node);
        assert_eq!(record.external_id, "br-person-42");
        assert_eq!(record.global_id.as_deref(), Some("UGVyc29uOjQy"));
        assert_eq!(record.office.district.district_type, DistrictType::LocalExec);
        assert_eq!(record.office.district.external_id, "br-position-9001");
        assert_eq!(record.office.chamber.external_id, "br-chamber-9001");
        assert_eq!(record.office.chamber.government.name, "City of Los Angeles");
        assert_eq!(record.state(), Some("CA"));
        // Emails are lowercased and carried from both person and contacts.
        assert_eq!(
            record.emails,
            vec!["pat.doe@example.gov", "office@example.gov"]
        );
    }

    #[test]
    fn normalize_federal_government_synthesis() {
        let node: OfficeHolderNode =
            serde_json::from_value(node_json("FEDERAL", false, "US Senator")).unwrap();
        let record = normalize(node);
        assert_eq!(
            record.office.district.district_type,
            DistrictType::NationalUpper
        );
        assert_eq!(record.office.chamber.government.gov_type, "NATIONAL");
    }

    #[test]
    fn normalize_judicial_state_position() {
        let node: OfficeHolderNode =
            serde_json::from_value(node_json("STATE", true, "Supreme Court Justice")).unwrap();
        let record = normalize(node);
        assert_eq!(record.office.district.district_type, DistrictType::Judicial);
        assert!(record.office.district.is_judicial);
    }

    #[test]
    fn issue_parent_chain() {
        let node: IssueNode = serde_json::from_value(serde_json::json!({
            "databaseId": 3,
            "name": "Charter Schools",
            "parentIssue": { "databaseId": 2, "name": "Education" }
        }))
        .unwrap();
        let issue = issue_from_node(&node);
        assert_eq!(issue.external_id, "br-issue-3");
        let parent = issue.parent.as_deref().unwrap();
        assert_eq!(parent.external_id, "br-issue-2");
        assert!(parent.parent.is_none());
    }
}
