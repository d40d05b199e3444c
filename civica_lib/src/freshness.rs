//! Freshness bookkeeping for the three cache tiers.
//!
//! A tier is fresh iff its row exists and `now - last_fetched < max_age`.
//! Warmers stamp `last_fetched` with the instant the warm *started*, so a
//! record imported mid-warm is never newer than its freshness row claims.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::zipstate;

/// Snapshot of the three tiers for one postal code.
#[derive(Debug, Clone)]
pub struct FreshnessView {
    pub federal_fresh: bool,
    pub state_fresh: bool,
    pub local_fresh: bool,
    /// Resolved state: from the postal freshness row when present, else the
    /// static prefix table. `None` when the prefix is unassigned.
    pub state: Option<String>,
}

impl FreshnessView {
    pub fn all_fresh(&self) -> bool {
        self.federal_fresh && self.state_fresh && self.local_fresh
    }
}

fn is_fresh(last_fetched: Option<DateTime<Utc>>, now: DateTime<Utc>, max_age: Duration) -> bool {
    last_fetched.is_some_and(|t| now - t < max_age)
}

/// Reads all three tiers for a postal code.
pub async fn check_postal(
    pool: &PgPool,
    postal: &str,
    max_age: Duration,
) -> Result<FreshnessView, sqlx::Error> {
    let now = Utc::now();

    let federal: Option<DateTime<Utc>> =
        sqlx::query_scalar("SELECT last_fetched FROM freshness_federal WHERE onerow")
            .fetch_optional(pool)
            .await?;

    let postal_row: Option<(Option<String>, DateTime<Utc>)> =
        sqlx::query_as("SELECT state, last_fetched FROM freshness_postal WHERE postal = $1")
            .bind(postal)
            .fetch_optional(pool)
            .await?;

    let (resolved_state, local_fetched) = match postal_row {
        Some((state, fetched)) => (
            state.filter(|s| !s.is_empty()),
            Some(fetched),
        ),
        None => (None, None),
    };
    let state = resolved_state.or_else(|| zipstate::state_for_zip(postal).map(str::to_string));

    // With no resolvable state there is nothing to warm at the state tier.
    let state_fresh = match &state {
        Some(state) => {
            let fetched: Option<DateTime<Utc>> =
                sqlx::query_scalar("SELECT last_fetched FROM freshness_state WHERE state = $1")
                    .bind(state)
                    .fetch_optional(pool)
                    .await?;
            is_fresh(fetched, now, max_age)
        }
        None => true,
    };

    Ok(FreshnessView {
        federal_fresh: is_fresh(federal, now, max_age),
        state_fresh,
        local_fresh: is_fresh(local_fetched, now, max_age),
        state,
    })
}

/// Reads just the federal tier.
pub async fn federal_is_fresh(pool: &PgPool, max_age: Duration) -> Result<bool, sqlx::Error> {
    let fetched: Option<DateTime<Utc>> =
        sqlx::query_scalar("SELECT last_fetched FROM freshness_federal WHERE onerow")
            .fetch_optional(pool)
            .await?;
    Ok(is_fresh(fetched, Utc::now(), max_age))
}

/// Reads just one state tier.
pub async fn state_is_fresh(
    pool: &PgPool,
    state: &str,
    max_age: Duration,
) -> Result<bool, sqlx::Error> {
    let fetched: Option<DateTime<Utc>> =
        sqlx::query_scalar("SELECT last_fetched FROM freshness_state WHERE state = $1")
            .bind(state)
            .fetch_optional(pool)
            .await?;
    Ok(is_fresh(fetched, Utc::now(), max_age))
}

/// Stamps the federal tier.
pub async fn stamp_federal<'e, E>(exec: E, at: DateTime<Utc>) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO freshness_federal (onerow, last_fetched) VALUES (TRUE, $1)
         ON CONFLICT (onerow) DO UPDATE SET last_fetched = excluded.last_fetched",
    )
    .bind(at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Stamps one state tier row.
pub async fn stamp_state<'e, E>(exec: E, state: &str, at: DateTime<Utc>) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO freshness_state (state, last_fetched) VALUES ($1, $2)
         ON CONFLICT (state) DO UPDATE SET last_fetched = excluded.last_fetched",
    )
    .bind(state)
    .bind(at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Stamps one postal tier row with its resolved state.
pub async fn stamp_postal<'e, E>(
    exec: E,
    postal: &str,
    state: Option<&str>,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO freshness_postal (postal, state, last_fetched) VALUES ($1, $2, $3)
         ON CONFLICT (postal) DO UPDATE SET
           state = COALESCE(excluded.state, freshness_postal.state),
           last_fetched = excluded.last_fetched",
    )
    .bind(postal)
    .bind(state)
    .bind(at)
    .execute(exec)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_window() {
        let now = Utc::now();
        let max_age = Duration::days(90);
        assert!(is_fresh(Some(now - Duration::days(89)), now, max_age));
        assert!(!is_fresh(Some(now - Duration::days(91)), now, max_age));
        assert!(!is_fresh(None, now, max_age));
    }

    #[test]
    fn all_fresh_requires_every_tier() {
        let view = FreshnessView {
            federal_fresh: true,
            state_fresh: true,
            local_fresh: false,
            state: Some("IN".into()),
        };
        assert!(!view.all_fresh());
    }
}
