//! Frame validation, persistence, and snapshot assembly (spec §4.2, §4.4) —
//! generalizes the original's `Service.Validate`/`Save`/`Snapshot` trio to
//! the typed `Item` sum and to an envelope that is actually applied at rest
//! (the original builds the cipher but never calls it from this path; the
//! spec makes that wiring a hard requirement).

use keeper_common::crypto::EnvelopeKey;
use keeper_common::models::Item;
use keeper_db::repository::store::{self, StoreRow};
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid message")]
    InvalidMessage,
    #[error("storage error: {0}")]
    Storage(#[from] keeper_common::error::KeeperError),
}

/// Parse a frame's `value` into one of the four known item kinds. An
/// unrecognized `type` or a shape mismatch is `InvalidMessage` — the caller
/// drops the frame and stays `Live` (spec §4.2), it never closes the
/// session.
pub fn validate(value: &serde_json::Value) -> Result<Item, ServiceError> {
    serde_json::from_value(value.clone()).map_err(|_| ServiceError::InvalidMessage)
}

/// Encrypt an item's indexed columns and persist it as a new row. The store
/// is append-only (spec invariant 3) — this never updates an existing row.
pub async fn save(
    pool: &PgPool,
    key: &EnvelopeKey,
    user_id: i64,
    item: &Item,
) -> Result<(), ServiceError> {
    let plaintext = serde_json::to_string(item).expect("Item serializes");
    let row = StoreRow {
        user_id,
        kind: key
            .encode_str(item.kind())
            .map_err(|_| ServiceError::InvalidMessage)?,
        key: key
            .encode_str(item.natural_key())
            .map_err(|_| ServiceError::InvalidMessage)?,
        data: key
            .encode_str(&plaintext)
            .map_err(|_| ServiceError::InvalidMessage)?,
        created_at_client: item.created(),
    };
    store::save(pool, &row).await?;
    Ok(())
}

/// Build the snapshot frame's `value`: every row decrypted back to its
/// original JSON shape. Per spec §4.4, the snapshot query itself never
/// decrypts — decryption happens here, client-facing.
pub async fn snapshot(
    pool: &PgPool,
    key: &EnvelopeKey,
    user_id: i64,
) -> Result<Vec<serde_json::Value>, ServiceError> {
    let rows = store::snapshot(pool, user_id).await?;
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let plaintext = key
            .decode_to_string(&row.data)
            .map_err(|_| ServiceError::InvalidMessage)?;
        let value: serde_json::Value =
            serde_json::from_str(&plaintext).map_err(|_| ServiceError::InvalidMessage)?;
        items.push(value);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_common::models::Item;

    #[test]
    fn validate_accepts_known_kinds() {
        let value = serde_json::json!({
            "type": "text",
            "tag": "",
            "key": "k1",
            "value": "v1",
            "comment": "",
            "created": 1
        });
        let item = validate(&value).unwrap();
        assert_eq!(item.kind(), "text");
    }

    #[test]
    fn validate_rejects_unknown_kind() {
        let value = serde_json::json!({"type": "bogus"});
        assert!(validate(&value).is_err());
    }

    #[test]
    fn validate_rejects_malformed_known_kind() {
        let value = serde_json::json!({"type": "card", "number": "4111"});
        assert!(validate(&value).is_err());
    }

    #[test]
    fn natural_key_matches_kind() {
        let value = serde_json::json!({
            "type": "cred",
            "tag": "",
            "login": "alice",
            "password": "hunter2",
            "comment": "",
            "created": 1
        });
        let item: Item = validate(&value).unwrap();
        assert_eq!(item.natural_key(), "alice");
    }
}
