//! Accumulated form data.
//!
//! `FormData` is the open, partial record every step contributes to.
//! `FormDataStore` owns the committed copy inside a wizard session and applies
//! merges with a shallow, key-level contract.

pub mod selection;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open record of field name -> JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(Map<String, Value>);

impl FormData {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a partial record from any serializable value that encodes as a
    /// JSON object. `null` fields are dropped so an unset optional never
    /// overwrites a committed value.
    pub fn from_serializable<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(
                map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
            )),
            Value::Null => Ok(Self::new()),
            other => Err(serde::de::Error::custom(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    /// Deserialize a typed view of the record. Unknown keys are ignored, so a
    /// step can read only the slice it cares about.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// String items of an array field. Non-string items are skipped.
    pub fn get_str_list(&self, key: &str) -> Vec<&str> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow merge: every key of `partial` replaces the key here wholesale.
    /// A `null` value removes the key.
    pub fn merge(&mut self, partial: &FormData) {
        for (key, value) in &partial.0 {
            if value.is_null() {
                self.0.remove(key);
            } else {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    /// Copy of `self` with `partial` merged on top.
    pub fn merged_with(&self, partial: &FormData) -> FormData {
        let mut merged = self.clone();
        merged.merge(partial);
        merged
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for FormData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Committed accumulated data of one wizard session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormDataStore {
    data: FormData,
}

impl FormDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: FormData) -> Self {
        Self { data }
    }

    /// Shallow-merge `partial`; keys absent from `partial` are untouched.
    pub fn update(&mut self, partial: &FormData) -> &FormData {
        self.data.merge(partial);
        &self.data
    }

    /// Clear fields that belong to a branch that no longer applies.
    ///
    /// Returns the keys that were actually present and removed.
    pub fn invalidate_branch<K: AsRef<str>>(&mut self, keys: &[K]) -> Vec<String> {
        keys.iter()
            .filter_map(|key| {
                let key = key.as_ref();
                self.data.remove(key).map(|_| key.to_string())
            })
            .collect()
    }

    pub fn snapshot(&self) -> &FormData {
        &self.data
    }

    pub fn into_data(self) -> FormData {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_keeps_untouched_fields() {
        let mut store = FormDataStore::new();
        store.update(&FormData::new().with("accountType", "Individual"));
        store.update(&FormData::new().with("firstName", "Ada"));

        let data = store.snapshot();
        assert_eq!(data.get_str("accountType"), Some("Individual"));
        assert_eq!(data.get_str("firstName"), Some("Ada"));
    }

    #[test]
    fn update_replaces_arrays_wholesale() {
        let mut store = FormDataStore::new();
        store.update(&FormData::new().with("intents", json!(["Donate", "Mentor Students"])));
        store.update(&FormData::new().with("intents", json!(["Donate"])));

        assert_eq!(store.snapshot().get_str_list("intents"), vec!["Donate"]);
    }

    #[test]
    fn invalidate_branch_reports_only_present_keys() {
        let mut store = FormDataStore::with_data(
            FormData::new()
                .with("dateOfBirth", "2000-01-01")
                .with("accountType", "Individual"),
        );

        let removed = store.invalidate_branch(&["dateOfBirth", "firstName"]);

        assert_eq!(removed, vec!["dateOfBirth".to_string()]);
        assert!(!store.snapshot().contains("dateOfBirth"));
        assert!(store.snapshot().contains("accountType"));
    }

    #[test]
    fn from_serializable_drops_null_fields() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Slice {
            first_name: Option<String>,
            last_name: Option<String>,
        }

        let data = FormData::from_serializable(&Slice {
            first_name: Some("Ada".into()),
            last_name: None,
        })
        .unwrap();

        assert_eq!(data.get_str("firstName"), Some("Ada"));
        assert!(!data.contains("lastName"));
    }

    #[test]
    fn null_in_partial_removes_committed_field() {
        let mut store = FormDataStore::with_data(
            FormData::new().with("country", "KE").with("region", "Nairobi"),
        );

        store.update(&FormData::new().with("region", Value::Null));

        assert!(!store.snapshot().contains("region"));
        assert_eq!(store.snapshot().get_str("country"), Some("KE"));
    }

    #[test]
    fn from_serializable_accepts_unsized_values() {
        let map = std::collections::BTreeMap::from([("country", "KE")]);
        assert_eq!(
            FormData::from_serializable(&map).unwrap().get_str("country"),
            Some("KE")
        );

        // `str` is unsized; it is rejected for not being an object, not at compile time.
        assert!(FormData::from_serializable::<str>("KE").is_err());
    }

    #[test]
    fn from_serializable_rejects_scalars() {
        assert!(FormData::from_serializable(&42).is_err());
    }
}
