//! Transactional upsert of one normalized official and every child entity.
//!
//! Each record runs in its own short transaction. Conflict targets are the
//! provider external IDs (the office conflicts on its official instead,
//! since officials hold exactly one office). Replaying the same record is a
//! no-op beyond timestamp refreshes.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::record::{CommitteeRecord, GovernmentRecord, IdentifierRecord, OfficialRecord};

/// Upserts one official and all children. Returns the official's synthetic ID.
pub async fn upsert_official(
    pool: &PgPool,
    record: &OfficialRecord,
    import_start: DateTime<Utc>,
) -> Result<Uuid, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let district_id = upsert_district(&mut tx, record).await?;
    let government_id = ensure_government(&mut tx, &record.office.chamber.government).await?;
    let chamber_id = upsert_chamber(&mut tx, record, government_id).await?;
    let official_id = upsert_official_row(&mut tx, record, import_start).await?;
    let office_id = upsert_office(&mut tx, record, official_id, district_id, chamber_id).await?;

    // Repair a stale office surrogate left by earlier imports.
    sqlx::query("UPDATE officials SET office_id = $1 WHERE id = $2")
        .bind(office_id)
        .bind(official_id)
        .execute(&mut *tx)
        .await?;

    replace_children(&mut tx, record, official_id).await?;
    insert_identifiers(&mut tx, &record.identifiers, official_id).await?;
    upsert_committees(&mut tx, &record.committees, official_id).await?;

    tx.commit().await?;
    Ok(official_id)
}

async fn upsert_district(
    tx: &mut PgConnection,
    record: &OfficialRecord,
) -> Result<Uuid, sqlx::Error> {
    let d = &record.office.district;
    sqlx::query_scalar(
        "INSERT INTO districts (
           external_id, ocd_id, label, district_type, state, city, mtfcc,
           num_officials, valid_from, valid_to, geo_id, is_judicial,
           has_unknown_boundaries, is_retention
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
         ON CONFLICT (external_id) DO UPDATE SET
           ocd_id = COALESCE(excluded.ocd_id, districts.ocd_id),
           label = excluded.label,
           district_type = excluded.district_type,
           state = excluded.state,
           city = excluded.city,
           mtfcc = COALESCE(excluded.mtfcc, districts.mtfcc),
           num_officials = excluded.num_officials,
           valid_from = excluded.valid_from,
           valid_to = excluded.valid_to,
           geo_id = COALESCE(excluded.geo_id, districts.geo_id),
           is_judicial = excluded.is_judicial,
           has_unknown_boundaries = excluded.has_unknown_boundaries,
           is_retention = excluded.is_retention
         RETURNING id",
    )
    .bind(&d.external_id)
    .bind(d.ocd_id.as_deref())
    .bind(d.label.as_deref())
    .bind(d.district_type.as_str())
    .bind(d.state.as_deref())
    .bind(d.city.as_deref())
    .bind(d.mtfcc.as_deref())
    .bind(d.num_officials)
    .bind(d.valid_from.as_deref())
    .bind(d.valid_to.as_deref())
    .bind(d.geo_id.as_deref())
    .bind(d.is_judicial)
    .bind(d.has_unknown_boundaries)
    .bind(d.is_retention)
    .fetch_one(tx)
    .await
}

/// Governments have no surrogate conflict strategy: look up by natural key,
/// create if absent. The DO NOTHING guards against a concurrent warmer
/// creating the same row between our select and insert.
async fn ensure_government(
    tx: &mut PgConnection,
    government: &GovernmentRecord,
) -> Result<Uuid, sqlx::Error> {
    const SELECT: &str =
        "SELECT id FROM governments WHERE name = $1 AND gov_type = $2 AND state = $3 AND city = $4";

    if let Some(id) = sqlx::query_scalar::<_, Uuid>(SELECT)
        .bind(&government.name)
        .bind(&government.gov_type)
        .bind(&government.state)
        .bind(&government.city)
        .fetch_optional(&mut *tx)
        .await?
    {
        return Ok(id);
    }

    if let Some(id) = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO governments (name, gov_type, state, city) VALUES ($1, $2, $3, $4)
         ON CONFLICT (name, gov_type, state, city) DO NOTHING
         RETURNING id",
    )
    .bind(&government.name)
    .bind(&government.gov_type)
    .bind(&government.state)
    .bind(&government.city)
    .fetch_optional(&mut *tx)
    .await?
    {
        return Ok(id);
    }

    sqlx::query_scalar(SELECT)
        .bind(&government.name)
        .bind(&government.gov_type)
        .bind(&government.state)
        .bind(&government.city)
        .fetch_one(tx)
        .await
}

async fn upsert_chamber(
    tx: &mut PgConnection,
    record: &OfficialRecord,
    government_id: Uuid,
) -> Result<Uuid, sqlx::Error> {
    let c = &record.office.chamber;
    sqlx::query_scalar(
        "INSERT INTO chambers (
           external_id, government_id, name, name_formal, official_count,
           term_length, term_limit, inauguration_rules, election_rules,
           vacancy_rules, election_frequency, remarks, has_staggered_terms
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         ON CONFLICT (external_id) DO UPDATE SET
           government_id = excluded.government_id,
           name = excluded.name,
           name_formal = excluded.name_formal,
           official_count = excluded.official_count,
           term_length = excluded.term_length,
           term_limit = excluded.term_limit,
           inauguration_rules = excluded.inauguration_rules,
           election_rules = excluded.election_rules,
           vacancy_rules = excluded.vacancy_rules,
           election_frequency = excluded.election_frequency,
           remarks = excluded.remarks,
           has_staggered_terms = excluded.has_staggered_terms
         RETURNING id",
    )
    .bind(&c.external_id)
    .bind(government_id)
    .bind(&c.name)
    .bind(c.name_formal.as_deref())
    .bind(c.official_count)
    .bind(c.term_length.as_deref())
    .bind(c.term_limit.as_deref())
    .bind(c.inauguration_rules.as_deref())
    .bind(c.election_rules.as_deref())
    .bind(c.vacancy_rules.as_deref())
    .bind(c.election_frequency.as_deref())
    .bind(c.remarks.as_deref())
    .bind(c.has_staggered_terms)
    .fetch_one(tx)
    .await
}

async fn upsert_official_row(
    tx: &mut PgConnection,
    record: &OfficialRecord,
    import_start: DateTime<Utc>,
) -> Result<Uuid, sqlx::Error> {
    // An empty incoming photo URL keeps the stored one.
    sqlx::query_scalar(
        "INSERT INTO officials (
           external_id, global_id, slug, first_name, middle_name, last_name,
           preferred_name, name_suffix, party, party_short, photo_url, urls,
           emails, biography, total_years_in_office, is_appointed, is_vacant,
           is_off_cycle, valid_from, valid_to, source, last_synced
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                 $15, $16, $17, $18, $19, $20, $21, $22)
         ON CONFLICT (external_id) DO UPDATE SET
           global_id = COALESCE(excluded.global_id, officials.global_id),
           slug = excluded.slug,
           first_name = excluded.first_name,
           middle_name = excluded.middle_name,
           last_name = excluded.last_name,
           preferred_name = excluded.preferred_name,
           name_suffix = excluded.name_suffix,
           party = excluded.party,
           party_short = excluded.party_short,
           photo_url = CASE
             WHEN excluded.photo_url IS NOT NULL AND excluded.photo_url != ''
               THEN excluded.photo_url
             ELSE officials.photo_url
           END,
           urls = excluded.urls,
           emails = excluded.emails,
           biography = excluded.biography,
           total_years_in_office = excluded.total_years_in_office,
           is_appointed = excluded.is_appointed,
           is_vacant = excluded.is_vacant,
           is_off_cycle = excluded.is_off_cycle,
           valid_from = excluded.valid_from,
           valid_to = excluded.valid_to,
           source = excluded.source,
           last_synced = excluded.last_synced
         RETURNING id",
    )
    .bind(&record.external_id)
    .bind(record.global_id.as_deref())
    .bind(record.slug.as_deref())
    .bind(&record.first_name)
    .bind(record.middle_name.as_deref())
    .bind(&record.last_name)
    .bind(record.preferred_name.as_deref())
    .bind(record.name_suffix.as_deref())
    .bind(record.party.as_deref())
    .bind(record.party_short.as_deref())
    .bind(record.photo_url.as_deref())
    .bind(&record.urls)
    .bind(&record.emails)
    .bind(record.biography.as_deref())
    .bind(record.total_years_in_office)
    .bind(record.is_appointed)
    .bind(record.is_vacant)
    .bind(record.is_off_cycle)
    .bind(record.valid_from.as_deref())
    .bind(record.valid_to.as_deref())
    .bind(&record.source)
    .bind(import_start)
    .fetch_one(tx)
    .await
}

async fn upsert_office(
    tx: &mut PgConnection,
    record: &OfficialRecord,
    official_id: Uuid,
    district_id: Uuid,
    chamber_id: Uuid,
) -> Result<Uuid, sqlx::Error> {
    let o = &record.office;
    sqlx::query_scalar(
        "INSERT INTO offices (
           politician_id, district_id, chamber_id, title, representing_state,
           representing_city, description, seats, position_name, partisan_type,
           salary, is_appointed
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
         ON CONFLICT (politician_id) DO UPDATE SET
           district_id = excluded.district_id,
           chamber_id = excluded.chamber_id,
           title = excluded.title,
           representing_state = excluded.representing_state,
           representing_city = excluded.representing_city,
           description = excluded.description,
           seats = excluded.seats,
           position_name = excluded.position_name,
           partisan_type = excluded.partisan_type,
           salary = excluded.salary,
           is_appointed = excluded.is_appointed
         RETURNING id",
    )
    .bind(official_id)
    .bind(district_id)
    .bind(chamber_id)
    .bind(&o.title)
    .bind(o.representing_state.as_deref())
    .bind(o.representing_city.as_deref())
    .bind(o.description.as_deref())
    .bind(o.seats)
    .bind(o.position_name.as_deref())
    .bind(o.partisan_type.as_deref())
    .bind(o.salary.as_deref())
    .bind(o.is_appointed)
    .fetch_one(tx)
    .await
}

/// Addresses, images, degrees, experiences, and contacts are replaced
/// wholesale on every import.
async fn replace_children(
    tx: &mut PgConnection,
    record: &OfficialRecord,
    official_id: Uuid,
) -> Result<(), sqlx::Error> {
    for table in ["addresses", "images", "degrees", "experiences", "contacts"] {
        sqlx::query(&format!("DELETE FROM {} WHERE politician_id = $1", table))
            .bind(official_id)
            .execute(&mut *tx)
            .await?;
    }

    for a in &record.addresses {
        sqlx::query(
            "INSERT INTO addresses (
               politician_id, address_1, address_2, address_3, city, state,
               postal_code, phone_1, phone_2, fax_1, fax_2
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(official_id)
        .bind(a.address_1.as_deref())
        .bind(a.address_2.as_deref())
        .bind(a.address_3.as_deref())
        .bind(a.city.as_deref())
        .bind(a.state.as_deref())
        .bind(a.postal_code.as_deref())
        .bind(a.phone_1.as_deref())
        .bind(a.phone_2.as_deref())
        .bind(a.fax_1.as_deref())
        .bind(a.fax_2.as_deref())
        .execute(&mut *tx)
        .await?;
    }

    for i in &record.images {
        sqlx::query("INSERT INTO images (politician_id, url, image_type) VALUES ($1, $2, $3)")
            .bind(official_id)
            .bind(&i.url)
            .bind(i.image_type.as_deref())
            .execute(&mut *tx)
            .await?;
    }

    for d in &record.degrees {
        sqlx::query(
            "INSERT INTO degrees (politician_id, degree, major, school, grad_year)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(official_id)
        .bind(d.degree.as_deref())
        .bind(d.major.as_deref())
        .bind(d.school.as_deref())
        .bind(d.grad_year.as_deref())
        .execute(&mut *tx)
        .await?;
    }

    for e in &record.experiences {
        sqlx::query(
            "INSERT INTO experiences (
               politician_id, title, organization, start_year, end_year, experience_type
             ) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(official_id)
        .bind(e.title.as_deref())
        .bind(e.organization.as_deref())
        .bind(e.start_year.as_deref())
        .bind(e.end_year.as_deref())
        .bind(e.experience_type.as_deref())
        .execute(&mut *tx)
        .await?;
    }

    for c in &record.contacts {
        sqlx::query(
            "INSERT INTO contacts (politician_id, phone, fax, email, contact_type)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(official_id)
        .bind(c.phone.as_deref())
        .bind(c.fax.as_deref())
        .bind(c.email.as_deref())
        .bind(c.contact_type.as_deref())
        .execute(&mut *tx)
        .await?;
    }

    Ok(())
}

/// Lowercases, trims, and deduplicates identifier pairs before insert.
/// Identifiers accumulate across imports rather than being replaced.
pub fn dedup_identifiers(identifiers: &[IdentifierRecord]) -> Vec<IdentifierRecord> {
    let mut out: Vec<IdentifierRecord> = Vec::new();
    for identifier in identifiers {
        let cleaned = IdentifierRecord {
            identifier_type: identifier.identifier_type.trim().to_lowercase(),
            identifier_value: identifier.identifier_value.trim().to_lowercase(),
        };
        if cleaned.identifier_type.is_empty() || cleaned.identifier_value.is_empty() {
            continue;
        }
        if !out.contains(&cleaned) {
            out.push(cleaned);
        }
    }
    out
}

async fn insert_identifiers(
    tx: &mut PgConnection,
    identifiers: &[IdentifierRecord],
    official_id: Uuid,
) -> Result<(), sqlx::Error> {
    for identifier in dedup_identifiers(identifiers) {
        sqlx::query(
            "INSERT INTO identifiers (politician_id, identifier_type, identifier_value)
             VALUES ($1, $2, $3)
             ON CONFLICT (politician_id, identifier_type, identifier_value) DO NOTHING",
        )
        .bind(official_id)
        .bind(&identifier.identifier_type)
        .bind(&identifier.identifier_value)
        .execute(&mut *tx)
        .await?;
    }
    Ok(())
}

/// Collapses duplicate committee names (case-insensitive), keeping the last
/// non-empty position string.
pub fn dedup_committees(committees: &[CommitteeRecord]) -> Vec<CommitteeRecord> {
    let mut out: Vec<CommitteeRecord> = Vec::new();
    for committee in committees {
        let name = committee.name.trim();
        if name.is_empty() {
            continue;
        }
        let position = committee
            .position
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        match out
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => {
                if position.is_some() {
                    existing.position = position;
                }
            }
            None => out.push(CommitteeRecord {
                name: name.to_string(),
                position,
            }),
        }
    }
    out
}

/// Committees are shared by name across officials. The join rows for this
/// official are replaced per import.
async fn upsert_committees(
    tx: &mut PgConnection,
    committees: &[CommitteeRecord],
    official_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM politician_committees WHERE politician_id = $1")
        .bind(official_id)
        .execute(&mut *tx)
        .await?;

    for committee in dedup_committees(committees) {
        let committee_id: Uuid = match sqlx::query_scalar(
            "SELECT id FROM committees WHERE LOWER(name) = LOWER($1)",
        )
        .bind(&committee.name)
        .fetch_optional(&mut *tx)
        .await?
        {
            Some(id) => id,
            None => {
                sqlx::query(
                    "INSERT INTO committees (name) VALUES ($1)
                     ON CONFLICT (LOWER(name)) DO NOTHING",
                )
                .bind(&committee.name)
                .execute(&mut *tx)
                .await?;
                sqlx::query_scalar("SELECT id FROM committees WHERE LOWER(name) = LOWER($1)")
                    .bind(&committee.name)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        sqlx::query(
            "INSERT INTO politician_committees (politician_id, committee_id, position)
             VALUES ($1, $2, $3)
             ON CONFLICT (politician_id, committee_id) DO UPDATE SET
               position = COALESCE(excluded.position, politician_committees.position)",
        )
        .bind(official_id)
        .bind(committee_id)
        .bind(committee.position.as_deref())
        .execute(&mut *tx)
        .await?;
    }
    Ok(())
}
