//! Verified claim sets
//!
//! JWT payloads are loosely typed JSON. [`ClaimValue`] gives them a closed set
//! of variants so that projection into text (e.g. outbound headers) is an
//! exhaustive match rather than a downcast.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Standard subject claim name
pub const SUBJECT_CLAIM: &str = "sub";

/// A single claim value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    /// JSON `null`
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number, kept in its decoded representation
    Number(serde_json::Number),
    /// JSON string
    Text(String),
    /// JSON array
    List(Vec<ClaimValue>),
    /// JSON object
    Map(BTreeMap<String, ClaimValue>),
}

impl ClaimValue {
    /// Borrow the value as text, if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as a single line of text
    ///
    /// Strings are returned verbatim. Whole numbers have no fractional part
    /// (`123`, never `123.0`). Nested values are rendered as compact JSON.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(n)),
            Self::Text(s) => f.write_str(s),
            Self::List(_) | Self::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Full claim set of a verified token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(BTreeMap<String, ClaimValue>);

impl Claims {
    /// Create an empty claim set
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a claim
    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.0.get(name)
    }

    /// Insert a claim, returning the previous value
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ClaimValue>,
    ) -> Option<ClaimValue> {
        self.0.insert(name.into(), value.into())
    }

    /// The `sub` claim, when it is a string
    pub fn subject(&self) -> Option<&str> {
        self.get(SUBJECT_CLAIM).and_then(ClaimValue::as_str)
    }

    /// Number of claims
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the claim set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate claims in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Project the claims to text, skipping `excluded` names
    ///
    /// Values are rendered with [`ClaimValue::to_text`].
    pub fn project(&self, excluded: &[&str]) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter(|(name, _)| !excluded.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.to_text()))
            .collect()
    }

    /// Consume into the underlying map
    pub fn into_inner(self) -> BTreeMap<String, ClaimValue> {
        self.0
    }
}

impl From<BTreeMap<String, ClaimValue>> for Claims {
    fn from(map: BTreeMap<String, ClaimValue>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<ClaimValue>> FromIterator<(K, V)> for Claims {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Claims {
    type Item = (String, ClaimValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ClaimValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
