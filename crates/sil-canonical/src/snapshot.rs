use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;
use crate::value::CanonicalValue;

/// A canonical snapshot: the deterministic, key-sorted flat representation
/// of a domain record used as hashing input.
///
/// Backed by a `BTreeMap`, so keys are lexicographically ordered by
/// construction; insertion order cannot leak into the serialization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    fields: BTreeMap<String, CanonicalValue>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Anything convertible into a [`CanonicalValue`] is
    /// accepted; `Option<T>` folds `None` into `Null`, so missing related
    /// data never fails canonicalization.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<CanonicalValue>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&CanonicalValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The canonical serialization: compact JSON with lexicographically
    /// sorted keys. This is the exact byte sequence fed to the hasher.
    pub fn canonical_json(&self) -> Result<Vec<u8>, CanonicalError> {
        serde_json::to_vec(&self.fields).map_err(|e| CanonicalError::Serialization(e.to_string()))
    }
}

impl FromIterator<(String, CanonicalValue)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, CanonicalValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_is_key_sorted() {
        let mut snapshot = Snapshot::new();
        snapshot.set("zulu", 1).set("alpha", 2).set("mike", 3);
        let json = String::from_utf8(snapshot.canonical_json().unwrap()).unwrap();
        assert_eq!(json, r#"{"alpha":2,"mike":3,"zulu":1}"#);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let mut forward = Snapshot::new();
        forward.set("a", 1).set("b", "two").set("c", CanonicalValue::Null);

        let mut reversed = Snapshot::new();
        reversed.set("c", CanonicalValue::Null).set("b", "two").set("a", 1);

        assert_eq!(forward, reversed);
        assert_eq!(
            forward.canonical_json().unwrap(),
            reversed.canonical_json().unwrap()
        );
    }

    #[test]
    fn missing_relation_becomes_null() {
        let mut snapshot = Snapshot::new();
        let student_name: Option<String> = None;
        snapshot.set("student_name", student_name);
        assert!(snapshot.get("student_name").unwrap().is_null());
    }

    #[test]
    fn later_set_overwrites() {
        let mut snapshot = Snapshot::new();
        snapshot.set("status", "Present");
        snapshot.set("status", "Absent");
        assert_eq!(snapshot.get("status"), Some(&CanonicalValue::text("Absent")));
        assert_eq!(snapshot.len(), 1);
    }
}
