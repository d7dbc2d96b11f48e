//! Application repository — read-mostly lookup by signing app id.

use keeper_common::error::KeeperError;
use keeper_common::models::App;
use sqlx::PgPool;

/// Look up an application by id, as the token issuer needs its signing secret.
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<App, KeeperError> {
    sqlx::query_as::<_, App>("SELECT id, name, secret FROM apps WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| KeeperError::NotFound {
            resource: "app".to_string(),
        })
}
