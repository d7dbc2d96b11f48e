//! The append-only item log (spec §4.4) — `Save` and the latest-per-key
//! `Snapshot` query, generalizing the original's two-part group/join.
//!
//! Every query carries its own deadline (`config.query_timeout_secs`), the
//! way the original wraps each storage call in `context.WithTimeout` — a
//! stuck query degrades into the documented storage-transient path instead
//! of hanging a session's read loop.

use keeper_common::config;
use keeper_common::error::KeeperError;
use sqlx::PgPool;
use std::time::Duration;
use tokio::time::timeout;

/// One row of the store: ciphertext `kind`/`key`/`data`, plaintext
/// `user_id`/`created_at_client`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub user_id: i64,
    pub kind: String,
    pub key: String,
    pub data: String,
    pub created_at_client: i64,
}

/// Append a new version. The store never mutates existing rows.
pub async fn save(pool: &PgPool, row: &StoreRow) -> Result<(), KeeperError> {
    let deadline = Duration::from_secs(config::get().query_timeout_secs);
    timeout(
        deadline,
        sqlx::query(
            "INSERT INTO store (user_id, type, key, data, created_at_client) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(row.user_id)
        .bind(&row.kind)
        .bind(&row.key)
        .bind(&row.data)
        .bind(row.created_at_client)
        .execute(pool),
    )
    .await
    .map_err(|_| KeeperError::Internal(anyhow::anyhow!("store save timed out")))??;
    Ok(())
}

/// Latest item per `(type, key)` for `user_id`.
///
/// Two-part query per spec §4.4: group `store` by `(user_id, type, key)`
/// taking `max(created_at_client)`, then join back on
/// `(type, key, created_at_client)` to recover `data`. Grouping runs on
/// ciphertext `type`/`key` — safe only because the envelope is
/// deterministic (invariant 2). Ties (same group, same timestamp, more than
/// one row) are broken by largest `id` — arbitrary-but-stable, as the spec
/// permits.
pub async fn snapshot(pool: &PgPool, user_id: i64) -> Result<Vec<StoreRow>, KeeperError> {
    let deadline = Duration::from_secs(config::get().query_timeout_secs);
    let rows = timeout(
        deadline,
        sqlx::query_as::<_, StoreRow>(
            r#"
            SELECT DISTINCT ON (latest.type, latest.key)
                s.user_id, s.type AS kind, s.key, s.data, s.created_at_client
            FROM (
                SELECT type, key, max(created_at_client) AS created_at_client
                FROM store
                WHERE user_id = $1
                GROUP BY type, key
            ) AS latest
            JOIN store AS s
                ON s.type = latest.type
               AND s.key = latest.key
               AND s.created_at_client = latest.created_at_client
               AND s.user_id = $1
            ORDER BY latest.type, latest.key, s.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool),
    )
    .await
    .map_err(|_| KeeperError::Internal(anyhow::anyhow!("snapshot query timed out")))??;
    Ok(rows)
}
