use serde::{Deserialize, Serialize};

/// A scalar value inside a canonical snapshot.
///
/// Snapshots are deliberately restricted to this value set: strings,
/// integers, finite floating-point numbers, and null. Timestamps enter as
/// pre-formatted ISO-8601 strings, dates as `YYYY-MM-DD` strings. The
/// restriction is what makes canonical serialization total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalValue {
    Null,
    Int(i64),
    Num(f64),
    Text(String),
}

impl CanonicalValue {
    /// A numeric value. Non-finite inputs (NaN, infinities) have no JSON
    /// representation and collapse to `Null`.
    pub fn num(value: f64) -> Self {
        if value.is_finite() {
            Self::Num(value)
        } else {
            Self::Null
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<i64> for CanonicalValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for CanonicalValue {
    fn from(value: f64) -> Self {
        Self::num(value)
    }
}

impl From<&str> for CanonicalValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CanonicalValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<CanonicalValue>> From<Option<T>> for CanonicalValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}
