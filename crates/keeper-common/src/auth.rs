//! Token codec (spec §4.6) — shared by the auth service (issues tokens) and
//! the sync server (validates them on every upgrade and every `new` frame).
//!
//! Tokens are signed per-app with `app.secret` (spec §4.1), so the verifier
//! needs to know which app signed a given token before it can check the
//! MAC. [`peek_app_id`] reads the `app_id` claim out of the unverified
//! payload segment purely to pick a key; [`parse`] then does the real
//! signature/expiry check against that app's secret. A forged `app_id`
//! just makes verification fail against the wrong key — it grants nothing.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by every bearer token.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct Claims {
    /// Owning user id.
    pub uid: i64,
    /// Expiration, Unix seconds.
    pub exp: i64,
    /// Signing application's id.
    pub app_id: i64,
}

/// Mint a signed token under HMAC-SHA256 (`jsonwebtoken`'s default `HS256`).
pub fn issue(
    uid: i64,
    app_id: i64,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        uid,
        app_id,
        exp: now + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate and decode a bearer token.
///
/// Fails when the signing method isn't HMAC, the MAC doesn't verify against
/// `secret`, or `exp` has passed — `jsonwebtoken`'s default `Validation`
/// already enforces `exp` against the current time.
pub fn parse(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[derive(Deserialize)]
struct AppIdOnly {
    app_id: i64,
}

/// Read `app_id` from a token's payload segment without verifying the MAC.
/// Only safe to use as a key-selection hint ahead of a real [`parse`] call.
pub fn peek_app_id(token: &str) -> Result<i64, jsonwebtoken::errors::Error> {
    use jsonwebtoken::errors::{Error, ErrorKind};

    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| Error::from(ErrorKind::InvalidToken))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| Error::from(ErrorKind::InvalidToken))?;
    let claims: AppIdOnly =
        serde_json::from_slice(&bytes).map_err(|_| Error::from(ErrorKind::InvalidToken))?;
    Ok(claims.app_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let token = issue(42, 1, "secret", 3600).unwrap();
        let claims = parse(&token, "secret").unwrap();
        assert_eq!(claims.uid, 42);
        assert_eq!(claims.app_id, 1);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = issue(1, 1, "secret", 3600).unwrap();
        assert!(parse(&token, "other-secret").is_err());
    }

    #[test]
    fn rejects_expired() {
        let token = issue(1, 1, "secret", -10).unwrap();
        assert!(parse(&token, "secret").is_err());
    }

    #[test]
    fn peek_app_id_reads_claim_without_the_secret() {
        let token = issue(42, 7, "secret", 3600).unwrap();
        assert_eq!(peek_app_id(&token).unwrap(), 7);
    }
}
