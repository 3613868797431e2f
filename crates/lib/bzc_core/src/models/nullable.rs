//! Normalization for Go `sql.NullString`-shaped JSON.
//!
//! Some backend endpoints serialize nullable text columns as
//! `{"String": "...", "Valid": true}` (older handlers) while others emit
//! a plain string or `null`. This deserializer accepts all three and
//! produces an `Option<String>`.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
struct NullStringWrapper {
    #[serde(alias = "String")]
    string: String,
    #[serde(alias = "Valid")]
    valid: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaybeWrapped {
    Wrapped(NullStringWrapper),
    Plain(String),
    Null,
}

/// Deserialize a nullable string field, accepting plain, `null`, and
/// wrapper forms. Use with `#[serde(default, deserialize_with = ...)]`.
pub fn nullable_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match MaybeWrapped::deserialize(deserializer)? {
        MaybeWrapped::Wrapped(w) if w.valid => Some(w.string),
        MaybeWrapped::Wrapped(_) | MaybeWrapped::Null => None,
        MaybeWrapped::Plain(s) => Some(s),
    })
}
