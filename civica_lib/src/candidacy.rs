//! Lazy candidacy enrichment: on profile reads, a bounded background task
//! pulls election records, endorsements, issues, and stances for officials
//! that have none yet. Failures are logged and never surface to readers.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::provider::Provider;
use crate::record::{IssueRecord, PersonCandidacies};
use crate::store::Db;

/// Hard ceiling on one enrichment round trip.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether any election records exist for an official.
pub async fn has_election_records(pool: &PgPool, official_id: Uuid) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(1) FROM election_records WHERE politician_id = $1")
            .bind(official_id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

/// Spawns the bounded background fetch. The caller returns immediately.
pub fn spawn_lazy_fetch(
    db: Db,
    provider: Arc<dyn Provider>,
    official_id: Uuid,
    global_id: String,
) {
    tokio::spawn(async move {
        let work = fetch_and_upsert(&db, provider.as_ref(), official_id, &global_id);
        match tokio::time::timeout(FETCH_TIMEOUT, work).await {
            Ok(Ok(count)) => {
                tracing::info!(
                    "candidacy enrichment for {} stored {} candidacies",
                    official_id,
                    count
                );
            }
            Ok(Err(e)) => {
                tracing::warn!("candidacy enrichment for {} failed: {}", official_id, e);
            }
            Err(_) => {
                tracing::warn!("candidacy enrichment for {} timed out", official_id);
            }
        }
    });
}

async fn fetch_and_upsert(
    db: &Db,
    provider: &dyn Provider,
    official_id: Uuid,
    global_id: &str,
) -> Result<usize, crate::error::CivicaError> {
    let Some(person) = provider.fetch_candidacy_data(global_id).await? else {
        tracing::debug!("no candidacy data for global id {}", global_id);
        return Ok(0);
    };
    let count = upsert_candidacies(db.pool(), official_id, &person).await?;
    Ok(count)
}

/// Upserts the whole candidacy graph in one transaction. Issue parents are
/// written before their children.
pub async fn upsert_candidacies(
    pool: &PgPool,
    official_id: Uuid,
    person: &PersonCandidacies,
) -> Result<usize, sqlx::Error> {
    let mut tx = pool.begin().await?;

    for candidacy in &person.candidacies {
        let election_id: Uuid = sqlx::query_scalar(
            "INSERT INTO election_records (
               external_id, politician_id, election_name, election_day,
               position_name, status, result, party
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (external_id) DO UPDATE SET
               politician_id = excluded.politician_id,
               election_name = excluded.election_name,
               election_day = excluded.election_day,
               position_name = excluded.position_name,
               status = excluded.status,
               result = excluded.result,
               party = excluded.party
             RETURNING id",
        )
        .bind(&candidacy.external_id)
        .bind(official_id)
        .bind(candidacy.election_name.as_deref())
        .bind(candidacy.election_day.as_deref())
        .bind(candidacy.position_name.as_deref())
        .bind(candidacy.status.as_deref())
        .bind(candidacy.result.as_deref())
        .bind(candidacy.party.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for endorsement in &candidacy.endorsements {
            let org = &endorsement.organization;
            let org_id: Uuid = sqlx::query_scalar(
                "INSERT INTO endorser_organizations (external_id, name, logo_url, website_url)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (external_id) DO UPDATE SET
                   name = excluded.name,
                   logo_url = COALESCE(excluded.logo_url, endorser_organizations.logo_url),
                   website_url = COALESCE(excluded.website_url, endorser_organizations.website_url)
                 RETURNING id",
            )
            .bind(&org.external_id)
            .bind(&org.name)
            .bind(org.logo_url.as_deref())
            .bind(org.website_url.as_deref())
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO endorsements (politician_id, organization_id, election_record_id)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (politician_id, organization_id, election_record_id) DO NOTHING",
            )
            .bind(official_id)
            .bind(org_id)
            .bind(election_id)
            .execute(&mut *tx)
            .await?;
        }

        for stance in &candidacy.stances {
            let issue_id = upsert_issue_chain(&mut tx, &stance.issue).await?;
            sqlx::query(
                "INSERT INTO politician_stances (
                   politician_id, issue_id, election_record_id, statement, reference_url
                 )
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (politician_id, issue_id, election_record_id) DO UPDATE SET
                   statement = excluded.statement,
                   reference_url = excluded.reference_url",
            )
            .bind(official_id)
            .bind(issue_id)
            .bind(election_id)
            .bind(stance.statement.as_deref())
            .bind(stance.reference_url.as_deref())
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(person.candidacies.len())
}

/// Walks the parent chain root-first so every child references a persisted
/// parent.
async fn upsert_issue_chain(
    tx: &mut PgConnection,
    issue: &IssueRecord,
) -> Result<Uuid, sqlx::Error> {
    let mut chain: Vec<&IssueRecord> = Vec::new();
    let mut current = Some(issue);
    while let Some(node) = current {
        chain.push(node);
        current = node.parent.as_deref();
    }
    chain.reverse();

    let mut parent_id: Option<Uuid> = None;
    for node in chain {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO issues (external_id, name, parent_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (external_id) DO UPDATE SET
               name = excluded.name,
               parent_id = COALESCE(excluded.parent_id, issues.parent_id)
             RETURNING id",
        )
        .bind(&node.external_id)
        .bind(&node.name)
        .bind(parent_id)
        .fetch_one(&mut *tx)
        .await?;
        parent_id = Some(id);
    }

    // The chain always has at least the leaf issue.
    Ok(parent_id.unwrap_or_else(Uuid::nil))
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ElectionView {
    #[serde(skip)]
    pub id: Uuid,
    pub external_id: String,
    pub election_name: Option<String>,
    pub election_day: Option<String>,
    pub position_name: Option<String>,
    pub status: Option<String>,
    pub result: Option<String>,
    pub party: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EndorsementView {
    pub organization_name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub election_name: Option<String>,
    pub election_day: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StanceView {
    pub issue_name: String,
    pub parent_issue_name: Option<String>,
    pub statement: Option<String>,
    pub reference_url: Option<String>,
    pub election_name: Option<String>,
}

pub async fn elections_for(
    pool: &PgPool,
    official_id: Uuid,
) -> Result<Vec<ElectionView>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, external_id, election_name, election_day, position_name,
                status, result, party
           FROM election_records
          WHERE politician_id = $1
          ORDER BY election_day DESC NULLS LAST",
    )
    .bind(official_id)
    .fetch_all(pool)
    .await
}

pub async fn endorsements_for(
    pool: &PgPool,
    official_id: Uuid,
) -> Result<Vec<EndorsementView>, sqlx::Error> {
    sqlx::query_as(
        "SELECT org.name AS organization_name, org.logo_url, org.website_url,
                er.election_name, er.election_day
           FROM endorsements e
           JOIN endorser_organizations org ON org.id = e.organization_id
           JOIN election_records er ON er.id = e.election_record_id
          WHERE e.politician_id = $1
          ORDER BY org.name",
    )
    .bind(official_id)
    .fetch_all(pool)
    .await
}

pub async fn stances_for(
    pool: &PgPool,
    official_id: Uuid,
) -> Result<Vec<StanceView>, sqlx::Error> {
    sqlx::query_as(
        "SELECT i.name AS issue_name, parent.name AS parent_issue_name,
                s.statement, s.reference_url, er.election_name
           FROM politician_stances s
           JOIN issues i ON i.id = s.issue_id
           LEFT JOIN issues parent ON parent.id = i.parent_id
           JOIN election_records er ON er.id = s.election_record_id
          WHERE s.politician_id = $1
          ORDER BY i.name",
    )
    .bind(official_id)
    .fetch_all(pool)
    .await
}
