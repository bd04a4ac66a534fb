use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An element's open property bag
pub type Properties = BTreeMap<String, PropertyValue>;

/// A leaf value that is neither a string nor a collection
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
}

/// A property value
///
/// Element properties arrive as untyped YAML/JSON. They are normalised into
/// this closed set so condition and transform code can match exhaustively.
/// Arrays made only of strings become `StringList`; any other array is kept
/// as a `List`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum PropertyValue {
    String(String),
    StringList(Vec<String>),
    Map(Properties),
    List(Vec<PropertyValue>),
    Scalar(Scalar),
}

impl PropertyValue {
    pub const NULL: PropertyValue = PropertyValue::Scalar(Scalar::Null);

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Scalar(Scalar::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Properties> {
        match self {
            PropertyValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Numeric view of integer and float scalars
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Scalar(Scalar::Integer(i)) => Some(*i as f64),
            PropertyValue::Scalar(Scalar::Float(f)) => Some(*f),
            _ => None,
        }
    }

    /// Items of a list value, with string lists widened to `PropertyValue`s
    pub fn list_items(&self) -> Option<Vec<PropertyValue>> {
        match self {
            PropertyValue::StringList(items) => Some(
                items
                    .iter()
                    .map(|s| PropertyValue::String(s.clone()))
                    .collect(),
            ),
            PropertyValue::List(items) => Some(items.clone()),
            _ => None,
        }
    }

    /// Every string carried directly by this value
    ///
    /// A string yields itself, a string list its items, and a mixed list its
    /// string items. Maps and scalars yield nothing.
    pub fn strings(&self) -> Vec<&str> {
        match self {
            PropertyValue::String(s) => vec![s.as_str()],
            PropertyValue::StringList(items) => items.iter().map(String::as_str).collect(),
            PropertyValue::List(items) => items.iter().filter_map(PropertyValue::as_str).collect(),
            PropertyValue::Map(_) | PropertyValue::Scalar(_) => Vec::new(),
        }
    }

    /// Look up a dotted path inside a map value
    ///
    /// An empty path returns the value itself.
    pub fn get_path(&self, path: &str) -> Option<&PropertyValue> {
        if path.is_empty() {
            return Some(self);
        }
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, rest),
            None => (path, ""),
        };
        match self {
            PropertyValue::Map(map) => map.get(head)?.get_path(rest),
            PropertyValue::List(items) => items.get(head.parse::<usize>().ok()?)?.get_path(rest),
            _ => None,
        }
    }
}

/// Look up a dotted path (`a.b.c`) in a property bag
pub fn lookup_path<'a>(properties: &'a Properties, path: &str) -> Option<&'a PropertyValue> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, rest),
        None => (path, ""),
    };
    properties.get(head)?.get_path(rest)
}

/// Write a value at a dotted path, creating intermediate maps
///
/// Intermediate values that are not maps are replaced.
pub fn insert_path(properties: &mut Properties, path: &str, value: PropertyValue) {
    match path.split_once('.') {
        None => {
            properties.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = properties
                .entry(head.to_string())
                .or_insert_with(|| PropertyValue::Map(Properties::new()));
            if !matches!(slot, PropertyValue::Map(_)) {
                *slot = PropertyValue::Map(Properties::new());
            }
            if let PropertyValue::Map(inner) = slot {
                insert_path(inner, rest, value);
            }
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::StringList(items) => f.write_str(&items.join(", ")),
            PropertyValue::Scalar(Scalar::Null) => f.write_str("null"),
            PropertyValue::Scalar(Scalar::Bool(b)) => write!(f, "{}", b),
            PropertyValue::Scalar(Scalar::Integer(i)) => write!(f, "{}", i),
            PropertyValue::Scalar(Scalar::Float(x)) => write!(f, "{}", x),
            PropertyValue::Map(_) | PropertyValue::List(_) => {
                write!(f, "{}", serde_json::Value::from(self.clone()))
            }
        }
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => PropertyValue::NULL,
            Value::Bool(b) => PropertyValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => PropertyValue::Scalar(Scalar::Integer(i)),
                None => PropertyValue::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(s) => PropertyValue::String(s),
            Value::Array(items) => {
                if items.iter().all(Value::is_string) {
                    PropertyValue::StringList(
                        items
                            .into_iter()
                            .filter_map(|v| match v {
                                Value::String(s) => Some(s),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    PropertyValue::List(items.into_iter().map(PropertyValue::from).collect())
                }
            }
            Value::Object(map) => PropertyValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, PropertyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<PropertyValue> for serde_json::Value {
    fn from(value: PropertyValue) -> Self {
        use serde_json::Value;
        match value {
            PropertyValue::String(s) => Value::String(s),
            PropertyValue::StringList(items) => {
                Value::Array(items.into_iter().map(Value::String).collect())
            }
            PropertyValue::Map(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
            PropertyValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            PropertyValue::Scalar(Scalar::Null) => Value::Null,
            PropertyValue::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            PropertyValue::Scalar(Scalar::Integer(i)) => Value::from(i),
            PropertyValue::Scalar(Scalar::Float(f)) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(items: Vec<String>) -> Self {
        PropertyValue::StringList(items)
    }
}

impl From<Vec<&str>> for PropertyValue {
    fn from(items: Vec<&str>) -> Self {
        PropertyValue::StringList(items.into_iter().map(str::to_string).collect())
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Scalar(Scalar::Integer(i))
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Scalar(Scalar::Float(f))
    }
}

impl From<Properties> for PropertyValue {
    fn from(map: Properties) -> Self {
        PropertyValue::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_arrays_become_string_lists() {
        let value = PropertyValue::from(json!(["a", "b"]));
        assert_eq!(value, PropertyValue::from(vec!["a", "b"]));

        let mixed = PropertyValue::from(json!(["a", 1]));
        assert!(matches!(mixed, PropertyValue::List(_)));
        assert_eq!(mixed.strings(), vec!["a"]);
    }

    #[test]
    fn test_json_round_trip_preserves_shape() {
        let original = json!({"name": "CRM", "tags": ["x"], "meta": {"score": 3, "ok": true}});
        let value = PropertyValue::from(original.clone());
        assert_eq!(serde_json::Value::from(value), original);
    }

    #[test]
    fn test_lookup_and_insert_paths() {
        let mut props = Properties::new();
        insert_path(&mut props, "api.contract.schemaRef", "data-model.schema.customer".into());

        assert_eq!(
            lookup_path(&props, "api.contract.schemaRef").and_then(PropertyValue::as_str),
            Some("data-model.schema.customer")
        );
        assert!(lookup_path(&props, "api.missing.schemaRef").is_none());
        assert!(lookup_path(&props, "api.contract.schemaRef.deeper").is_none());
    }

    #[test]
    fn test_insert_replaces_non_map_intermediate() {
        let mut props = Properties::new();
        props.insert("owner".to_string(), "team-a".into());
        insert_path(&mut props, "owner.name", "team-b".into());

        assert_eq!(
            lookup_path(&props, "owner.name"),
            Some(&PropertyValue::from("team-b"))
        );
    }

    #[test]
    fn test_list_index_paths() {
        let value = PropertyValue::from(json!([{"schemaRef": "s1"}, {"schemaRef": "s2"}]));
        assert_eq!(
            value.get_path("1.schemaRef").and_then(PropertyValue::as_str),
            Some("s2")
        );
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(PropertyValue::from("x").to_string(), "x");
        assert_eq!(PropertyValue::from(vec!["a", "b"]).to_string(), "a, b");
        assert_eq!(PropertyValue::from(7i64).to_string(), "7");
        assert_eq!(PropertyValue::NULL.to_string(), "null");
    }

    #[test]
    fn test_yaml_deserializes_through_json_shape() {
        let value: PropertyValue = serde_yaml::from_str("[core, edge]").unwrap();
        assert_eq!(value, PropertyValue::from(vec!["core", "edge"]));
    }
}
