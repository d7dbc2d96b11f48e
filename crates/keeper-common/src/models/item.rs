//! Item kinds — the four shapes of secret a device can store.
//!
//! A tagged sum, not an open inheritance hierarchy: each variant carries its
//! own fields and exposes `kind()`/`natural_key()` through the common
//! [`KeeperItem`] trait instead of a base class.

use serde::{Deserialize, Serialize};

/// One stored secret, discriminated by `type` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    #[serde(rename = "cred")]
    Credentials(Credentials),
    #[serde(rename = "text")]
    Text(Text),
    #[serde(rename = "bin")]
    Binary(Binary),
    #[serde(rename = "card")]
    Card(Card),
}

/// Maximum size of a binary item's payload, per spec (S6).
pub const MAX_BINARY_VALUE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub tag: String,
    pub login: String,
    pub password: String,
    pub comment: String,
    pub created: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub tag: String,
    pub key: String,
    pub value: String,
    pub comment: String,
    pub created: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binary {
    pub tag: String,
    pub key: String,
    /// Base64-encoded on the wire (JSON has no raw byte type).
    pub value: String,
    pub comment: String,
    pub created: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub tag: String,
    pub number: String,
    pub exp: String,
    pub cvv: i32,
    pub comment: String,
    pub created: i64,
}

/// Discriminator string stored (encrypted) in the `type` column.
pub mod kind {
    pub const CRED: &str = "cred";
    pub const TEXT: &str = "text";
    pub const BIN: &str = "bin";
    pub const CARD: &str = "card";
}

impl Item {
    /// The discriminator string for this item's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Item::Credentials(_) => kind::CRED,
            Item::Text(_) => kind::TEXT,
            Item::Binary(_) => kind::BIN,
            Item::Card(_) => kind::CARD,
        }
    }

    /// The within-kind identifier used for latest-wins grouping.
    pub fn natural_key(&self) -> &str {
        match self {
            Item::Credentials(c) => &c.login,
            Item::Text(t) => &t.key,
            Item::Binary(b) => &b.key,
            Item::Card(c) => &c.number,
        }
    }

    /// The client-supplied version timestamp.
    pub fn created(&self) -> i64 {
        match self {
            Item::Credentials(c) => c.created,
            Item::Text(t) => t.created,
            Item::Binary(b) => b.created,
            Item::Card(c) => c.created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_union_round_trips_each_kind() {
        let items = vec![
            Item::Credentials(Credentials {
                tag: "".into(),
                login: "alice".into(),
                password: "p".into(),
                comment: "".into(),
                created: 10,
            }),
            Item::Text(Text {
                tag: "".into(),
                key: "k1".into(),
                value: "v".into(),
                comment: "".into(),
                created: 1,
            }),
            Item::Binary(Binary {
                tag: "".into(),
                key: "k1".into(),
                value: "AAAA".into(),
                comment: "".into(),
                created: 1,
            }),
            Item::Card(Card {
                tag: "".into(),
                number: "4111111111111111".into(),
                exp: "12/30".into(),
                cvv: 123,
                comment: "".into(),
                created: 1,
            }),
        ];

        for item in items {
            let json = serde_json::to_string(&item).unwrap();
            let back: Item = serde_json::from_str(&json).unwrap();
            assert_eq!(item.kind(), back.kind());
            assert_eq!(item.natural_key(), back.natural_key());
        }
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        let raw = r#"{"type":"unknown","foo":"bar"}"#;
        assert!(serde_json::from_str::<Item>(raw).is_err());
    }

    #[test]
    fn natural_keys_match_each_kind() {
        let cred = Item::Credentials(Credentials {
            tag: "".into(),
            login: "bob".into(),
            password: "pw".into(),
            comment: "".into(),
            created: 1,
        });
        assert_eq!(cred.kind(), kind::CRED);
        assert_eq!(cred.natural_key(), "bob");
    }
}
