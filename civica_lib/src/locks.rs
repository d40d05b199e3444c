//! Cluster-wide advisory locks over Postgres.
//!
//! Locks are keyed by logical name and hashed server-side with `hashtext`.
//! Acquisition is always try-only; a refused lock means another worker in
//! the cluster owns the tier. Each guard pins its own pooled connection for
//! the lock's lifetime, since advisory locks are session-scoped.

use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};

pub fn federal_key() -> String {
    "federal".to_string()
}

pub fn state_key(state: &str) -> String {
    format!("state-{}", state.to_uppercase())
}

pub fn zip_key(postal: &str) -> String {
    format!("zip-{}", postal)
}

/// Holds an acquired advisory lock. Release explicitly with
/// [`LockGuard::release`]; dropping the guard (including during unwind)
/// schedules the unlock on the runtime so the tier is never wedged.
pub struct LockGuard {
    conn: Option<PoolConnection<Postgres>>,
    key: String,
}

impl LockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Releases the lock and returns the connection to the pool.
    pub async fn release(mut self) {
        if let Some(mut conn) = self.conn.take() {
            if let Err(e) = sqlx::query("SELECT pg_advisory_unlock(hashtext($1))")
                .bind(&self.key)
                .execute(&mut *conn)
                .await
            {
                tracing::warn!("failed to release advisory lock '{}': {}", self.key, e);
            }
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            let key = std::mem::take(&mut self.key);
            tokio::spawn(async move {
                let _ = sqlx::query("SELECT pg_advisory_unlock(hashtext($1))")
                    .bind(&key)
                    .execute(&mut *conn)
                    .await;
            });
        }
    }
}

/// Non-blocking acquire. `Ok(None)` means another worker holds the key.
pub async fn try_acquire(pool: &PgPool, key: &str) -> Result<Option<LockGuard>, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let locked: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock(hashtext($1))")
        .bind(key)
        .fetch_one(&mut *conn)
        .await?;
    if locked {
        Ok(Some(LockGuard {
            conn: Some(conn),
            key: key.to_string(),
        }))
    } else {
        Ok(None)
    }
}

/// Probe whether another worker holds the key: try-acquire, and if that
/// succeeds release immediately and report not-held.
pub async fn probe_held(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
    match try_acquire(pool, key).await? {
        Some(guard) => {
            guard.release().await;
            Ok(false)
        }
        None => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_formats() {
        assert_eq!(federal_key(), "federal");
        assert_eq!(state_key("in"), "state-IN");
        assert_eq!(zip_key("47401"), "zip-47401");
    }
}
