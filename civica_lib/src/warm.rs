//! Background warmers for the three freshness tiers.
//!
//! Each warmer runs under its tier's advisory lock, upserts every record the
//! provider returns, and stamps freshness with the warm's start instant.
//! A warmer that loses the lock race is a no-op; a provider failure leaves
//! freshness unstamped so the next request retries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::error::CivicaError;
use crate::freshness::{self, FreshnessView};
use crate::locks;
use crate::provider::Provider;
use crate::store::Db;
use crate::upsert;

/// Freshness horizon applied to all tiers unless overridden.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmOutcome {
    /// The warm ran to completion and stamped freshness.
    Completed,
    /// Another worker holds the tier lock; nothing was done.
    Skipped,
}

/// Warms the federal tier. One row of freshness covers the country.
pub async fn warm_federal(db: &Db, provider: &dyn Provider) -> Result<WarmOutcome, CivicaError> {
    let Some(guard) = locks::try_acquire(db.pool(), &locks::federal_key()).await? else {
        tracing::debug!("federal warm already running elsewhere");
        return Ok(WarmOutcome::Skipped);
    };
    let result = run_federal(db, provider).await;
    guard.release().await;
    result.map(|_| WarmOutcome::Completed)
}

async fn run_federal(db: &Db, provider: &dyn Provider) -> Result<(), CivicaError> {
    let import_start = Utc::now();
    let records = provider.fetch_federal().await?;
    let mut imported = 0usize;
    for record in &records {
        match upsert::upsert_official(db.pool(), record, import_start).await {
            Ok(_) => imported += 1,
            Err(e) => tracing::warn!("skipping official {}: {}", record.external_id, e),
        }
    }
    freshness::stamp_federal(db.pool(), import_start).await?;
    tracing::info!(
        "federal warm complete: {}/{} officials",
        imported,
        records.len()
    );
    Ok(())
}

/// Warms one state tier: state-level officials queried through a sample
/// postal code and filtered to the state.
pub async fn warm_state(
    db: &Db,
    provider: &dyn Provider,
    state: &str,
    sample_postal: &str,
) -> Result<WarmOutcome, CivicaError> {
    let Some(guard) = locks::try_acquire(db.pool(), &locks::state_key(state)).await? else {
        tracing::debug!("state warm for {} already running elsewhere", state);
        return Ok(WarmOutcome::Skipped);
    };
    let result = run_state(db, provider, state, sample_postal).await;
    guard.release().await;
    result.map(|_| WarmOutcome::Completed)
}

async fn run_state(
    db: &Db,
    provider: &dyn Provider,
    state: &str,
    sample_postal: &str,
) -> Result<(), CivicaError> {
    let import_start = Utc::now();
    let records = provider.fetch_by_state(state, sample_postal).await?;
    let mut imported = 0usize;
    for record in &records {
        match upsert::upsert_official(db.pool(), record, import_start).await {
            Ok(_) => imported += 1,
            Err(e) => tracing::warn!("skipping official {}: {}", record.external_id, e),
        }
    }
    freshness::stamp_state(db.pool(), state, import_start).await?;
    tracing::info!(
        "state warm for {} complete: {}/{} officials",
        state,
        imported,
        records.len()
    );
    Ok(())
}

/// Warms the local tier for one postal code.
///
/// The provider returns every level for the postal, so a successful local
/// warm opportunistically marks the state and federal tiers fresh too.
/// Officials with a local district type get a membership row stamped with
/// the warm's start instant; rows not re-observed are swept in the final
/// transaction (the generational sweep -- the cache's only deletion path).
pub async fn warm_local(
    db: &Db,
    provider: &dyn Provider,
    postal: &str,
) -> Result<WarmOutcome, CivicaError> {
    let Some(guard) = locks::try_acquire(db.pool(), &locks::zip_key(postal)).await? else {
        tracing::debug!("local warm for {} already running elsewhere", postal);
        return Ok(WarmOutcome::Skipped);
    };
    let result = run_local(db, provider, postal).await;
    guard.release().await;
    result.map(|_| WarmOutcome::Completed)
}

async fn run_local(db: &Db, provider: &dyn Provider, postal: &str) -> Result<(), CivicaError> {
    let import_start = Utc::now();
    let records = provider.fetch_by_postal(postal, None).await?;

    // Containment annotation is best-effort: failures and unsupported
    // providers leave the flag untouched.
    let containment: HashMap<String, bool> =
        match provider.fetch_position_containment_by_postal(postal).await {
            Ok(pairs) => pairs.into_iter().collect(),
            Err(e) => {
                tracing::debug!("containment fetch for {} unavailable: {}", postal, e);
                HashMap::new()
            }
        };

    let discovered_state = records.iter().find_map(|r| r.state().map(str::to_string));

    let mut imported = 0usize;
    for record in &records {
        let official_id = match upsert::upsert_official(db.pool(), record, import_start).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("skipping official {}: {}", record.external_id, e);
                continue;
            }
        };
        imported += 1;

        if record.office.district.district_type.is_local() {
            let is_contained = containment
                .get(&record.office.district.external_id)
                .copied();
            sqlx::query(
                "INSERT INTO postal_memberships (postal, official_id, last_seen, is_contained)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (postal, official_id) DO UPDATE SET
                   last_seen = excluded.last_seen,
                   is_contained = COALESCE(excluded.is_contained, postal_memberships.is_contained)",
            )
            .bind(postal)
            .bind(official_id)
            .bind(import_start)
            .bind(is_contained)
            .execute(db.pool())
            .await
            .map_err(CivicaError::Store)?;
        }
    }

    // Atomic finish: stamp all applicable tiers and sweep memberships that
    // were not re-observed during this warm.
    let mut tx = db.pool().begin().await.map_err(CivicaError::Store)?;
    freshness::stamp_postal(
        &mut *tx,
        postal,
        discovered_state.as_deref(),
        import_start,
    )
    .await
    .map_err(CivicaError::Store)?;
    sqlx::query("DELETE FROM postal_memberships WHERE postal = $1 AND last_seen < $2")
        .bind(postal)
        .bind(import_start)
        .execute(&mut *tx)
        .await
        .map_err(CivicaError::Store)?;
    if let Some(state) = &discovered_state {
        freshness::stamp_state(&mut *tx, state, import_start)
            .await
            .map_err(CivicaError::Store)?;
    }
    freshness::stamp_federal(&mut *tx, import_start)
        .await
        .map_err(CivicaError::Store)?;
    tx.commit().await.map_err(CivicaError::Store)?;

    tracing::info!(
        "local warm for {} complete: {}/{} officials, state {:?}",
        postal,
        imported,
        records.len(),
        discovered_state
    );
    Ok(())
}

/// Fire-and-forget federal warm.
pub fn spawn_federal(db: Db, provider: Arc<dyn Provider>) {
    tokio::spawn(async move {
        if let Err(e) = warm_federal(&db, provider.as_ref()).await {
            tracing::warn!("federal warm failed: {}", e);
        }
    });
}

/// Fire-and-forget state warm.
pub fn spawn_state(db: Db, provider: Arc<dyn Provider>, state: String, sample_postal: String) {
    tokio::spawn(async move {
        if let Err(e) = warm_state(&db, provider.as_ref(), &state, &sample_postal).await {
            tracing::warn!("state warm for {} failed: {}", state, e);
        }
    });
}

/// Fire-and-forget local warm.
pub fn spawn_local(db: Db, provider: Arc<dyn Provider>, postal: String) {
    tokio::spawn(async move {
        if let Err(e) = warm_local(&db, provider.as_ref(), &postal).await {
            tracing::warn!("local warm for {} failed: {}", postal, e);
        }
    });
}

/// Spawns a warmer for every stale tier. Returns true if any were spawned.
///
/// Spawned tasks own their inputs and never inherit the request's
/// cancellation scope, so a client disconnect cannot abort a warm in
/// flight.
pub fn spawn_stale_warmers(
    db: &Db,
    provider: &Arc<dyn Provider>,
    postal: &str,
    view: &FreshnessView,
) -> bool {
    let mut warming = false;
    if !view.federal_fresh {
        spawn_federal(db.clone(), Arc::clone(provider));
        warming = true;
    }
    if !view.state_fresh {
        if let Some(state) = &view.state {
            spawn_state(
                db.clone(),
                Arc::clone(provider),
                state.clone(),
                postal.to_string(),
            );
            warming = true;
        }
    }
    if !view.local_fresh {
        spawn_local(db.clone(), Arc::clone(provider), postal.to_string());
        warming = true;
    }
    warming
}
