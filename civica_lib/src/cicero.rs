//! REST provider adapter: folds Cicero wire officials into the canonical
//! record shape.

use async_trait::async_trait;

use cicero_api::types as wire;

use crate::district::DistrictType;
use crate::provider::{Provider, ProviderError};
use crate::record::{
    AddressRecord, ChamberRecord, CommitteeRecord, ContactRecord, DistrictRecord,
    GovernmentRecord, IdentifierRecord, ImageRecord, OfficeRecord, OfficialRecord,
};

pub const SOURCE: &str = "cicero";

/// REST-backed provider adapter.
pub struct CiceroProvider {
    client: cicero_api::Client,
}

impl CiceroProvider {
    pub fn new(client: cicero_api::Client) -> Self {
        Self { client }
    }
}

/// Folds one wire official into the canonical record shape. Unknown
/// district-type strings classify as LOCAL.
pub fn normalize(official: wire::Official) -> OfficialRecord {
    let district_type = official
        .office
        .district
        .district_type
        .parse::<DistrictType>()
        .unwrap_or(DistrictType::Local);

    let emails: Vec<String> = {
        let mut emails = Vec::new();
        for email in &official.email_addresses {
            let email = email.to_lowercase();
            if !emails.contains(&email) {
                emails.push(email);
            }
        }
        emails
    };

    let district = DistrictRecord {
        external_id: format!("cicero-district-{}", official.office.district.sk),
        ocd_id: official.office.district.ocd_id.clone(),
        label: official.office.district.label.clone(),
        district_type,
        state: official.office.district.state.clone(),
        city: official.office.district.city.clone(),
        mtfcc: None,
        num_officials: official.office.district.num_officials,
        valid_from: official.office.district.valid_from.clone(),
        valid_to: official.office.district.valid_to.clone(),
        geo_id: official.office.district.district_id.clone(),
        is_judicial: district_type == DistrictType::Judicial,
        has_unknown_boundaries: false,
        is_retention: false,
    };
    let government = GovernmentRecord {
        name: official.office.chamber.government.name.clone(),
        gov_type: official.office.chamber.government.gov_type.clone(),
        state: official
            .office
            .chamber
            .government
            .state
            .clone()
            .unwrap_or_default(),
        city: official
            .office
            .chamber
            .government
            .city
            .clone()
            .unwrap_or_default(),
    };
    let chamber = ChamberRecord {
        external_id: format!("cicero-chamber-{}", official.office.chamber.id),
        name: official.office.chamber.name.clone(),
        name_formal: official.office.chamber.name_formal.clone(),
        official_count: official.office.chamber.official_count,
        term_length: official.office.chamber.term_length.clone(),
        term_limit: official.office.chamber.term_limit.clone(),
        inauguration_rules: official.office.chamber.inauguration_rules.clone(),
        election_rules: official.office.chamber.election_rules.clone(),
        vacancy_rules: official.office.chamber.vacancy_rules.clone(),
        election_frequency: official.office.chamber.election_frequency.clone(),
        remarks: official.office.chamber.remarks.clone(),
        has_staggered_terms: official.office.chamber.has_staggered_terms,
        government,
    };
    let office = OfficeRecord {
        title: official.office.title.clone(),
        representing_state: official.office.representing_state.clone(),
        representing_city: official.office.representing_city.clone(),
        description: official.office.description.clone(),
        seats: official.office.district.num_officials,
        position_name: Some(official.office.title.clone()),
        partisan_type: None,
        salary: None,
        is_appointed: false,
        district,
        chamber,
    };

    let photo_url = official
        .photo_origin_url
        .clone()
        .filter(|u| !u.is_empty());
    let images = photo_url
        .iter()
        .map(|url| ImageRecord {
            url: url.clone(),
            image_type: Some("portrait".to_string()),
        })
        .collect();

    let mut urls = official.urls.clone();
    if let Some(form) = official.web_form_url.clone().filter(|u| !u.is_empty()) {
        if !urls.contains(&form) {
            urls.push(form);
        }
    }

    let contacts = official
        .addresses
        .iter()
        .filter(|a| a.phone_1.is_some() || a.fax_1.is_some())
        .map(|a| ContactRecord {
            phone: a.phone_1.clone(),
            fax: a.fax_1.clone(),
            email: None,
            contact_type: Some("office".to_string()),
        })
        .collect();

    OfficialRecord {
        external_id: format!("cicero-{}", official.id),
        global_id: None,
        source: SOURCE.to_string(),
        slug: None,
        first_name: official.first_name,
        middle_name: official.middle_initial,
        last_name: official.last_name,
        preferred_name: official.preferred_name,
        name_suffix: official.name_suffix,
        party: official.party.clone(),
        party_short: official
            .party
            .as_deref()
            .and_then(|p| p.chars().next())
            .map(|c| c.to_string()),
        photo_url,
        urls,
        emails,
        biography: if official.notes.is_empty() {
            None
        } else {
            Some(official.notes.join("\n"))
        },
        total_years_in_office: None,
        is_appointed: false,
        is_vacant: false,
        is_off_cycle: false,
        valid_from: official.valid_from,
        valid_to: official.valid_to,
        office,
        addresses: official
            .addresses
            .into_iter()
            .map(|a| AddressRecord {
                address_1: a.address_1,
                address_2: a.address_2,
                address_3: a.address_3,
                city: a.city,
                state: a.state,
                postal_code: a.postal_code,
                phone_1: a.phone_1,
                phone_2: a.phone_2,
                fax_1: a.fax_1,
                fax_2: a.fax_2,
            })
            .collect(),
        identifiers: official
            .identifiers
            .into_iter()
            .map(|i| IdentifierRecord {
                identifier_type: i.identifier_type,
                identifier_value: i.identifier_value,
            })
            .collect(),
        committees: official
            .committees
            .into_iter()
            .map(|c| CommitteeRecord {
                name: c.name,
                position: c.position,
            })
            .collect(),
        images,
        degrees: Vec::new(),
        experiences: Vec::new(),
        contacts,
    }
}

#[async_trait]
impl Provider for CiceroProvider {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch_by_postal(
        &self,
        postal: &str,
        filter: Option<&[DistrictType]>,
    ) -> Result<Vec<OfficialRecord>, ProviderError> {
        let type_strs: Vec<&str> = filter
            .map(|types| types.iter().map(|t| t.as_str()).collect())
            .unwrap_or_default();
        let officials = self.client.get_all_officials(postal, &type_strs).await?;
        Ok(officials.into_iter().map(normalize).collect())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.client.health_check().await.map_err(Into::into)
    }
}
