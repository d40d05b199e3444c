//! Read-side query assembly: composite official views from joined entities,
//! batched child fetches, and the cold-miss polling discipline.

use std::collections::HashMap;
use std::time::Duration as StdDuration;

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::district::{DistrictType, STATE_TIER_TYPES};

/// Cold-miss poll cadence.
pub const POLL_TICK: StdDuration = StdDuration::from_millis(200);
/// Cold-miss poll budget.
pub const POLL_BUDGET: StdDuration = StdDuration::from_secs(10);
/// Rows that satisfy a cold-miss poll.
pub const POLL_THRESHOLD: usize = 3;

const BASE_SELECT: &str = "SELECT o.id, o.external_id, o.global_id, o.slug,
       o.first_name, o.middle_name, o.last_name, o.preferred_name, o.name_suffix,
       o.party, o.party_short, o.photo_url, o.urls, o.emails, o.biography,
       o.total_years_in_office, o.is_appointed, o.is_vacant, o.is_off_cycle, o.source,
       f.title AS office_title, f.representing_state, f.representing_city,
       f.description AS office_description, f.seats, f.position_name,
       f.partisan_type, f.salary, f.is_appointed AS office_is_appointed,
       d.external_id AS district_external_id, d.ocd_id, d.label AS district_label,
       d.district_type, d.state AS district_state, d.city AS district_city,
       d.mtfcc, d.geo_id,
       c.name AS chamber_name, c.name_formal AS chamber_name_formal,
       c.election_frequency, c.term_length,
       g.name AS government_name, g.gov_type AS government_type
  FROM officials o
  JOIN offices f ON f.politician_id = o.id
  JOIN districts d ON d.id = f.district_id
  JOIN chambers c ON c.id = f.chamber_id
  JOIN governments g ON g.id = c.government_id";

#[derive(FromRow)]
struct OfficialRow {
    id: Uuid,
    external_id: String,
    global_id: Option<String>,
    slug: Option<String>,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    preferred_name: Option<String>,
    name_suffix: Option<String>,
    party: Option<String>,
    party_short: Option<String>,
    photo_url: Option<String>,
    urls: Vec<String>,
    emails: Vec<String>,
    biography: Option<String>,
    total_years_in_office: Option<i32>,
    is_appointed: bool,
    is_vacant: bool,
    is_off_cycle: bool,
    source: String,
    office_title: String,
    representing_state: Option<String>,
    representing_city: Option<String>,
    office_description: Option<String>,
    seats: Option<i32>,
    position_name: Option<String>,
    partisan_type: Option<String>,
    salary: Option<String>,
    office_is_appointed: bool,
    district_external_id: String,
    ocd_id: Option<String>,
    district_label: Option<String>,
    district_type: String,
    district_state: Option<String>,
    district_city: Option<String>,
    mtfcc: Option<String>,
    geo_id: Option<String>,
    chamber_name: String,
    chamber_name_formal: Option<String>,
    election_frequency: Option<String>,
    term_length: Option<String>,
    government_name: String,
    government_type: String,
}

/// Composite JSON view of one official.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficialView {
    pub id: Uuid,
    pub external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_id: Option<String>,
    pub slug: Option<String>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub preferred_name: Option<String>,
    pub name_suffix: Option<String>,
    pub party: Option<String>,
    pub party_short: Option<String>,
    pub photo_url: Option<String>,
    pub urls: Vec<String>,
    pub emails: Vec<String>,
    pub biography: Option<String>,
    pub total_years_in_office: Option<i32>,
    pub is_appointed: bool,
    pub is_vacant: bool,
    pub is_off_cycle: bool,
    pub is_elected: bool,
    pub source: String,
    pub office: OfficeView,
    pub district: DistrictView,
    pub chamber: ChamberView,
    pub committees: Vec<CommitteeView>,
    pub images: Vec<ImageView>,
    pub degrees: Vec<DegreeView>,
    pub experiences: Vec<ExperienceView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<AddressView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<IdentifierView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<ContactView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeView {
    pub title: String,
    pub representing_state: Option<String>,
    pub representing_city: Option<String>,
    pub description: Option<String>,
    pub seats: Option<i32>,
    pub position_name: Option<String>,
    pub partisan_type: Option<String>,
    pub salary: Option<String>,
    pub is_appointed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictView {
    pub external_id: String,
    pub ocd_id: Option<String>,
    pub label: Option<String>,
    pub district_type: String,
    pub state: Option<String>,
    pub city: Option<String>,
    pub mtfcc: Option<String>,
    pub geo_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamberView {
    pub name: String,
    pub name_formal: Option<String>,
    pub election_frequency: Option<String>,
    pub term_length: Option<String>,
    pub government_name: String,
    pub government_type: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeView {
    #[serde(skip)]
    pub politician_id: Uuid,
    pub name: String,
    pub position: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    #[serde(skip)]
    pub politician_id: Uuid,
    pub url: String,
    pub image_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DegreeView {
    #[serde(skip)]
    pub politician_id: Uuid,
    pub degree: Option<String>,
    pub major: Option<String>,
    pub school: Option<String>,
    pub grad_year: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceView {
    #[serde(skip)]
    pub politician_id: Uuid,
    pub title: Option<String>,
    pub organization: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
    pub experience_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    #[serde(skip)]
    pub politician_id: Uuid,
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

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierView {
    #[serde(skip)]
    pub politician_id: Uuid,
    pub identifier_type: String,
    pub identifier_value: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    #[serde(skip)]
    pub politician_id: Uuid,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub contact_type: Option<String>,
}

/// Titles that mark an office as elected regardless of chamber rules.
const ELECTED_TITLES: &[&str] = &[
    "president",
    "vice president",
    "governor",
    "lt governor",
    "mayor",
    "county executive",
    "attorney general",
    "secretary of state",
    "treasurer",
    "comptroller",
    "auditor",
    "superintendent",
];

/// Pure derivation of whether an office is elected rather than appointed.
pub fn is_elected(
    district_type: DistrictType,
    title: &str,
    election_frequency: Option<&str>,
) -> bool {
    if matches!(
        district_type,
        DistrictType::NationalUpper
            | DistrictType::NationalLower
            | DistrictType::StateUpper
            | DistrictType::StateLower
    ) {
        return true;
    }
    let title = title.to_lowercase();
    if ELECTED_TITLES.iter().any(|t| title.contains(t)) {
        return true;
    }
    match election_frequency {
        Some(freq) if !freq.is_empty() => !freq.to_lowercase().contains("appointed"),
        _ => false,
    }
}

fn view_from_row(row: OfficialRow) -> OfficialView {
    let district_type = row
        .district_type
        .parse::<DistrictType>()
        .unwrap_or(DistrictType::Local);
    let elected = is_elected(
        district_type,
        &row.office_title,
        row.election_frequency.as_deref(),
    );
    OfficialView {
        id: row.id,
        external_id: row.external_id,
        global_id: row.global_id,
        slug: row.slug,
        first_name: row.first_name,
        middle_name: row.middle_name,
        last_name: row.last_name,
        preferred_name: row.preferred_name,
        name_suffix: row.name_suffix,
        party: row.party,
        party_short: row.party_short,
        photo_url: row.photo_url,
        urls: row.urls,
        emails: row.emails,
        biography: row.biography,
        total_years_in_office: row.total_years_in_office,
        is_appointed: row.is_appointed,
        is_vacant: row.is_vacant,
        is_off_cycle: row.is_off_cycle,
        is_elected: elected,
        source: row.source,
        office: OfficeView {
            title: row.office_title,
            representing_state: row.representing_state,
            representing_city: row.representing_city,
            description: row.office_description,
            seats: row.seats,
            position_name: row.position_name,
            partisan_type: row.partisan_type,
            salary: row.salary,
            is_appointed: row.office_is_appointed,
        },
        district: DistrictView {
            external_id: row.district_external_id,
            ocd_id: row.ocd_id,
            label: row.district_label,
            district_type: row.district_type,
            state: row.district_state,
            city: row.district_city,
            mtfcc: row.mtfcc,
            geo_id: row.geo_id,
        },
        chamber: ChamberView {
            name: row.chamber_name,
            name_formal: row.chamber_name_formal,
            election_frequency: row.election_frequency,
            term_length: row.term_length,
            government_name: row.government_name,
            government_type: row.government_type,
        },
        committees: Vec::new(),
        images: Vec::new(),
        degrees: Vec::new(),
        experiences: Vec::new(),
        addresses: Vec::new(),
        identifiers: Vec::new(),
        contacts: Vec::new(),
    }
}

fn sort_key(view: &OfficialView) -> (u8, String, String, String) {
    let rank = view
        .district
        .district_type
        .parse::<DistrictType>()
        .map(|t| t.rank())
        .unwrap_or(u8::MAX);
    (
        rank,
        view.office.title.to_lowercase(),
        view.last_name.to_lowercase(),
        view.first_name.to_lowercase(),
    )
}

async fn fetch_federal_exec_rows(pool: &PgPool) -> Result<Vec<OfficialRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{} WHERE d.district_type = 'NATIONAL_EXEC'",
        BASE_SELECT
    ))
    .fetch_all(pool)
    .await
}

async fn fetch_state_rows(pool: &PgPool, state: &str) -> Result<Vec<OfficialRow>, sqlx::Error> {
    let tier: Vec<&str> = STATE_TIER_TYPES.iter().map(|t| t.as_str()).collect();
    sqlx::query_as(&format!(
        "{} WHERE d.district_type = ANY($1)
            AND (UPPER(f.representing_state) = UPPER($2) OR UPPER(d.state) = UPPER($2))",
        BASE_SELECT
    ))
    .bind(&tier)
    .bind(state)
    .fetch_all(pool)
    .await
}

/// Dedupe by official ID, order, and attach children.
async fn assemble(
    pool: &PgPool,
    rows: Vec<OfficialRow>,
    with_profile_children: bool,
) -> Result<Vec<OfficialView>, sqlx::Error> {
    let mut views = Vec::with_capacity(rows.len());
    let mut seen = std::collections::HashSet::new();
    for row in rows {
        if seen.insert(row.id) {
            views.push(view_from_row(row));
        }
    }
    views.sort_by_key(sort_key);
    attach_children(pool, &mut views, with_profile_children).await?;
    Ok(views)
}

/// Officials for a postal code: federal executives, state-tier officials
/// for the resolved state, and membership-mapped locals, deduplicated and
/// ordered by (district type, office title, last name, first name).
pub async fn read_by_postal(
    pool: &PgPool,
    postal: &str,
    state: Option<&str>,
) -> Result<Vec<OfficialView>, sqlx::Error> {
    let mut rows = fetch_federal_exec_rows(pool).await?;

    if let Some(state) = state {
        rows.extend(fetch_state_rows(pool, state).await?);
    }

    let local_rows: Vec<OfficialRow> = sqlx::query_as(&format!(
        "{} JOIN postal_memberships pm ON pm.official_id = o.id WHERE pm.postal = $1",
        BASE_SELECT
    ))
    .bind(postal)
    .fetch_all(pool)
    .await?;
    rows.extend(local_rows);

    assemble(pool, rows, false).await
}

/// Officials whose district matches any of the given `(geo_id, MTFCC)`
/// pairs, supplemented with federal executives and the state tier.
pub async fn read_by_geofences(
    pool: &PgPool,
    pairs: &[(String, String)],
    state: Option<&str>,
) -> Result<Vec<OfficialView>, sqlx::Error> {
    let geo_ids: Vec<&str> = pairs.iter().map(|(g, _)| g.as_str()).collect();
    let mtfccs: Vec<&str> = pairs.iter().map(|(_, m)| m.as_str()).collect();
    let mut rows: Vec<OfficialRow> = sqlx::query_as(&format!(
        "{} WHERE (d.geo_id, d.mtfcc) IN (SELECT * FROM unnest($1::text[], $2::text[]))",
        BASE_SELECT
    ))
    .bind(&geo_ids)
    .bind(&mtfccs)
    .fetch_all(pool)
    .await?;

    rows.extend(fetch_federal_exec_rows(pool).await?);
    if let Some(state) = state {
        rows.extend(fetch_state_rows(pool, state).await?);
    }

    assemble(pool, rows, false).await
}

/// Federal executives plus the state tier, used to supplement the
/// geofence and address flows.
pub async fn read_federal_and_state(
    pool: &PgPool,
    state: Option<&str>,
) -> Result<Vec<OfficialView>, sqlx::Error> {
    let mut rows = fetch_federal_exec_rows(pool).await?;
    if let Some(state) = state {
        rows.extend(fetch_state_rows(pool, state).await?);
    }
    assemble(pool, rows, false).await
}

/// Re-sorts a merged view list by the canonical ordering.
pub fn sort_views(views: &mut [OfficialView]) {
    views.sort_by_key(sort_key);
}

/// Full profile for one official, with the contact-level children included.
pub async fn read_official(pool: &PgPool, id: Uuid) -> Result<Option<OfficialView>, sqlx::Error> {
    let row: Option<OfficialRow> =
        sqlx::query_as(&format!("{} WHERE o.id = $1", BASE_SELECT))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    let Some(row) = row else {
        return Ok(None);
    };
    let mut views = vec![view_from_row(row)];
    attach_children(pool, &mut views, true).await?;
    Ok(views.pop())
}

/// Whether an official row exists.
pub async fn official_exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM officials WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Resolves stored officials by provider external ID, in batch.
pub async fn ids_by_external(
    pool: &PgPool,
    external_ids: &[String],
) -> Result<HashMap<String, Uuid>, sqlx::Error> {
    if external_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(String, Uuid)> =
        sqlx::query_as("SELECT external_id, id FROM officials WHERE external_id = ANY($1)")
            .bind(external_ids)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().collect())
}

/// Batched child fetches keyed on the official-id set, joined in memory.
async fn attach_children(
    pool: &PgPool,
    views: &mut [OfficialView],
    with_profile_children: bool,
) -> Result<(), sqlx::Error> {
    if views.is_empty() {
        return Ok(());
    }
    let ids: Vec<Uuid> = views.iter().map(|v| v.id).collect();
    let mut index: HashMap<Uuid, usize> = HashMap::with_capacity(views.len());
    for (i, view) in views.iter().enumerate() {
        index.insert(view.id, i);
    }

    let committees: Vec<CommitteeView> = sqlx::query_as(
        "SELECT pc.politician_id, c.name, pc.position
           FROM politician_committees pc
           JOIN committees c ON c.id = pc.committee_id
          WHERE pc.politician_id = ANY($1)
          ORDER BY c.name",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;
    for committee in committees {
        if let Some(&i) = index.get(&committee.politician_id) {
            views[i].committees.push(committee);
        }
    }

    let images: Vec<ImageView> = sqlx::query_as(
        "SELECT politician_id, url, image_type FROM images WHERE politician_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;
    for image in images {
        if let Some(&i) = index.get(&image.politician_id) {
            views[i].images.push(image);
        }
    }

    let degrees: Vec<DegreeView> = sqlx::query_as(
        "SELECT politician_id, degree, major, school, grad_year
           FROM degrees WHERE politician_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;
    for degree in degrees {
        if let Some(&i) = index.get(&degree.politician_id) {
            views[i].degrees.push(degree);
        }
    }

    let experiences: Vec<ExperienceView> = sqlx::query_as(
        "SELECT politician_id, title, organization, start_year, end_year, experience_type
           FROM experiences WHERE politician_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;
    for experience in experiences {
        if let Some(&i) = index.get(&experience.politician_id) {
            views[i].experiences.push(experience);
        }
    }

    if with_profile_children {
        let addresses: Vec<AddressView> = sqlx::query_as(
            "SELECT politician_id, address_1, address_2, address_3, city, state,
                    postal_code, phone_1, phone_2, fax_1, fax_2
               FROM addresses WHERE politician_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;
        for address in addresses {
            if let Some(&i) = index.get(&address.politician_id) {
                views[i].addresses.push(address);
            }
        }

        let identifiers: Vec<IdentifierView> = sqlx::query_as(
            "SELECT politician_id, identifier_type, identifier_value
               FROM identifiers WHERE politician_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;
        for identifier in identifiers {
            if let Some(&i) = index.get(&identifier.politician_id) {
                views[i].identifiers.push(identifier);
            }
        }

        let contacts: Vec<ContactView> = sqlx::query_as(
            "SELECT politician_id, phone, fax, email, contact_type
               FROM contacts WHERE politician_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;
        for contact in contacts {
            if let Some(&i) = index.get(&contact.politician_id) {
                views[i].contacts.push(contact);
            }
        }
    }

    Ok(())
}

/// Polls the store on a 200 ms tick for up to 10 s, returning `Some(rows)`
/// as soon as at least [`POLL_THRESHOLD`] rows exist, `None` on timeout.
pub async fn poll_for_rows(
    pool: &PgPool,
    postal: &str,
    state: Option<&str>,
) -> Result<Option<Vec<OfficialView>>, sqlx::Error> {
    let deadline = tokio::time::Instant::now() + POLL_BUDGET;
    let mut tick = tokio::time::interval(POLL_TICK);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tick.tick().await;
        let rows = read_by_postal(pool, postal, state).await?;
        if rows.len() >= POLL_THRESHOLD {
            return Ok(Some(rows));
        }
        if tokio::time::Instant::now() >= deadline {
            return Ok(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legislators_always_elected() {
        for dt in [
            DistrictType::NationalUpper,
            DistrictType::NationalLower,
            DistrictType::StateUpper,
            DistrictType::StateLower,
        ] {
            assert!(is_elected(dt, "Whatever", None));
        }
    }

    #[test]
    fn elected_by_title() {
        assert!(is_elected(DistrictType::NationalExec, "President", None));
        assert!(is_elected(DistrictType::LocalExec, "Mayor", None));
        assert!(is_elected(DistrictType::County, "County Executive", None));
        assert!(is_elected(
            DistrictType::StateExec,
            "Attorney General",
            None
        ));
        assert!(is_elected(DistrictType::School, "Superintendent", None));
    }

    #[test]
    fn elected_by_election_frequency() {
        assert!(is_elected(
            DistrictType::Local,
            "Council Member",
            Some("4 years")
        ));
        assert!(!is_elected(
            DistrictType::Local,
            "Clerk",
            Some("Appointed by council")
        ));
        assert!(!is_elected(DistrictType::Local, "Clerk", Some("")));
        assert!(!is_elected(DistrictType::Local, "Clerk", None));
    }
}
