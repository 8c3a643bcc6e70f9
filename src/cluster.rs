//! Cluster data model and construction from structured records.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Key holding a cluster's default member list.
pub const DEFAULT_KEY: &str = "CLUSTER";

/// Pseudo-key listing a cluster's own keys: `%web:KEYS`.
pub const KEYS_KEY: &str = "KEYS";

/// A named mapping from attribute key to an ordered list of values.
/// Every value is itself a range expression, expanded on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    attributes: BTreeMap<String, Vec<String>>,
}

/// A value dropped while converting a record into a [`Cluster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discarded {
    pub key: String,
    pub reason: String,
}

/// The closed set of scalar kinds a cluster value may come from.
enum Scalar<'a> {
    Text(&'a str),
    Integer(String),
    Boolean(bool),
}

impl Scalar<'_> {
    fn classify(value: &Value) -> Option<Scalar<'_>> {
        match value {
            Value::String(s) => Some(Scalar::Text(s)),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Scalar::Integer(n.to_string())),
            Value::Bool(b) => Some(Scalar::Boolean(*b)),
            _ => None,
        }
    }

    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s.to_string(),
            Scalar::Integer(n) => n,
            Scalar::Boolean(b) => b.to_string(),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "non-integer number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

impl Cluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `values`, replacing any previous values.
    pub fn insert<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// Builder form of [`Cluster::insert`].
    pub fn with<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(key, values);
        self
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.attributes.get(key).map(Vec::as_slice)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Converts a structured record into a cluster.
    ///
    /// null becomes an empty list, a scalar a one-element list, and a list
    /// is converted element-wise. Strings, integers and booleans are kept;
    /// anything else is dropped, logged and reported in the returned list.
    pub fn from_record(record: &Map<String, Value>) -> (Cluster, Vec<Discarded>) {
        let mut cluster = Cluster::new();
        let mut discarded = Vec::new();

        for (key, value) in record {
            let values = match value {
                Value::Null => Vec::new(),
                Value::Array(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        match Scalar::classify(item) {
                            Some(scalar) => values.push(scalar.into_string()),
                            None => discarded.push(Discarded {
                                key: key.clone(),
                                reason: format!("element {} is a {}", index, kind_of(item)),
                            }),
                        }
                    }
                    values
                }
                scalar => match Scalar::classify(scalar) {
                    Some(scalar) => vec![scalar.into_string()],
                    None => {
                        discarded.push(Discarded {
                            key: key.clone(),
                            reason: format!("value is a {}", kind_of(scalar)),
                        });
                        continue;
                    }
                },
            };
            cluster.attributes.insert(key.clone(), values);
        }

        for d in &discarded {
            warn!(key = %d.key, reason = %d.reason, "discarded cluster value");
        }

        (cluster, discarded)
    }
}

impl<K, I, S> FromIterator<(K, I)> for Cluster
where
    K: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut cluster = Cluster::new();
        for (key, values) in iter {
            cluster.insert(key, values);
        }
        cluster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected a JSON object"),
        }
    }

    #[test]
    fn test_insert_replaces_key() {
        let mut c = Cluster::new().with("CLUSTER", ["a", "b"]);
        c.insert("CLUSTER", ["c"]);
        assert_eq!(c.get("CLUSTER"), Some(&["c".to_string()][..]));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_empty_value_list_is_kept() {
        let c = Cluster::new().with("EMPTY", Vec::<String>::new());
        assert_eq!(c.get("EMPTY"), Some(&[][..]));
        assert_eq!(c.get("MISSING"), None);
    }

    #[test]
    fn test_keys_are_sorted() {
        let c: Cluster = vec![("b", vec!["1"]), ("a", vec!["2"])].into_iter().collect();
        assert_eq!(c.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_from_record_scalar_rules() {
        let (c, discarded) = Cluster::from_record(&record(json!({
            "NULL": null,
            "TEXT": "web1",
            "INT": 42,
            "BOOL": true,
            "LIST": ["a", 1, false],
        })));

        assert!(discarded.is_empty());
        assert_eq!(c.get("NULL"), Some(&[][..]));
        assert_eq!(c.get("TEXT").unwrap(), ["web1"]);
        assert_eq!(c.get("INT").unwrap(), ["42"]);
        assert_eq!(c.get("BOOL").unwrap(), ["true"]);
        assert_eq!(c.get("LIST").unwrap(), ["a", "1", "false"]);
    }

    #[test]
    fn test_from_record_discards_unsupported_kinds() {
        let (c, discarded) = Cluster::from_record(&record(json!({
            "FLOAT": 1.5,
            "MAP": {"a": 1},
            "LIST": ["a", 2.5, ["nested"], null, "b"],
        })));

        assert_eq!(c.get("FLOAT"), None);
        assert_eq!(c.get("MAP"), None);
        assert_eq!(c.get("LIST").unwrap(), ["a", "b"]);
        assert_eq!(discarded.len(), 5);
        assert!(discarded.iter().any(|d| d.key == "MAP" && d.reason == "value is a map"));
        assert!(discarded
            .iter()
            .any(|d| d.key == "LIST" && d.reason == "element 2 is a list"));
    }
}
