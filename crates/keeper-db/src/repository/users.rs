//! User repository — account creation and lookup by login.

use keeper_common::error::KeeperError;
use keeper_common::models::User;
use sqlx::PgPool;

/// Create a new user account. Maps a unique-violation on `login` to
/// `AlreadyExists`, matching the original's `isLoginExistError` check.
pub async fn create_user(
    pool: &PgPool,
    login: &str,
    password_hash: &str,
) -> Result<i64, KeeperError> {
    let result = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (login, password_hash) VALUES ($1, $2) RETURNING id",
    )
    .bind(login)
    .bind(password_hash)
    .fetch_one(pool)
    .await;

    match result {
        Ok(id) => Ok(id),
        Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => {
            Err(KeeperError::AlreadyExists {
                resource: "user".to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Find a user by login (the original's `User(ctx, email)`).
pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, login, password_hash FROM users WHERE login = $1")
        .bind(login)
        .fetch_optional(pool)
        .await
}
