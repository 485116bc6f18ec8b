//! Typed attribute values carried by nodes and edges

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A single attribute value.
///
/// Absence of a key means "unknown"; there is no null variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AttributeValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    #[serde(rename = "datetime")]
    DateTime(NaiveDateTime),
    List(Vec<AttributeValue>),
    Map(BTreeMap<String, AttributeValue>),
}

/// Attribute mapping of a single element, ordered by key.
pub type Attributes = BTreeMap<String, AttributeValue>;

impl AttributeValue {
    /// Convert a raw JSON value. Returns `None` for `null`.
    ///
    /// Nulls nested inside lists and maps are dropped as well, so a converted
    /// value never carries "null" anywhere inside it.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Int(i)),
                None => n.as_f64().map(Self::Float),
            },
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Array(items) => Some(Self::List(
                items.iter().filter_map(Self::from_json).collect(),
            )),
            Value::Object(map) => Some(Self::Map(
                map.iter()
                    .filter_map(|(k, v)| Self::from_json(v).map(|v| (k.clone(), v)))
                    .collect(),
            )),
        }
    }

    /// Plain JSON rendering (dates as ISO-8601 strings).
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Bool(b) => Value::Bool(*b),
            Self::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Logical equality across representations.
    ///
    /// Scalars compare exactly, except that a string and a native value agree
    /// when the string is the canonical rendering of that value (`"42"` and
    /// `42`, `"true"` and `true`). Lists and maps compare element-wise.
    pub fn agrees_with(&self, other: &AttributeValue) -> bool {
        use AttributeValue::*;
        match (self, other) {
            (String(a), String(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (Int(i), Float(f)) | (Float(f), Int(i)) => *i as f64 == *f,
            (String(s), Int(i)) | (Int(i), String(s)) => s.parse::<i64>().is_ok_and(|p| p == *i),
            (String(s), Float(f)) | (Float(f), String(s)) => {
                s.parse::<f64>().is_ok_and(|p| p == *f)
            }
            (String(s), Bool(b)) | (Bool(b), String(s)) => {
                s.eq_ignore_ascii_case(if *b { "true" } else { "false" })
            }
            (String(s), Date(d)) | (Date(d), String(s)) => {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok_and(|p| p == *d)
            }
            (List(a), List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.agrees_with(y))
            }
            (Map(a), Map(b)) => attributes_agree(a, b),
            _ => false,
        }
    }
}

/// Whether two attribute maps have the same keys and agreeing values.
pub fn attributes_agree(a: &Attributes, b: &Attributes) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(k, v)| b.get(k).is_some_and(|other| v.agrees_with(other)))
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{:?}", s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Date(d) => write!(f, "{}", d),
            Self::DateTime(dt) => write!(f, "{}", dt),
            Self::List(_) | Self::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for AttributeValue {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDate> for AttributeValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for AttributeValue {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_drops_nulls_at_every_level() {
        let value = AttributeValue::from_json(&json!({"a": 1, "b": null, "c": [null, "x"]})).unwrap();
        let AttributeValue::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map["c"], AttributeValue::List(vec!["x".into()]));
        assert!(AttributeValue::from_json(&Value::Null).is_none());
    }

    #[test]
    fn numeric_string_agrees_with_native_integer() {
        let s = AttributeValue::from("10803677425");
        let i = AttributeValue::Int(10803677425);
        assert!(s.agrees_with(&i));
        assert!(i.agrees_with(&s));
        assert!(!AttributeValue::from("10803677426").agrees_with(&i));
    }

    #[test]
    fn int_and_float_agree_when_equal() {
        assert!(AttributeValue::Int(1).agrees_with(&AttributeValue::Float(1.0)));
        assert!(!AttributeValue::Int(1).agrees_with(&AttributeValue::Float(1.5)));
    }

    #[test]
    fn nested_maps_compare_deeply() {
        let a = AttributeValue::from_json(&json!({"k": [1, {"z": "2"}]})).unwrap();
        let b = AttributeValue::from_json(&json!({"k": [1, {"z": 2}]})).unwrap();
        let c = AttributeValue::from_json(&json!({"k": [1, {"z": 3}]})).unwrap();
        assert!(a.agrees_with(&b));
        assert!(!a.agrees_with(&c));
    }

    #[test]
    fn unrelated_kinds_disagree() {
        assert!(!AttributeValue::Bool(true).agrees_with(&AttributeValue::Int(1)));
        assert!(!AttributeValue::from("place").agrees_with(&AttributeValue::Int(0)));
    }

    #[test]
    fn tagged_serialization_keeps_dates_distinct_from_strings() {
        let date = AttributeValue::Date(NaiveDate::from_ymd_opt(2040, 3, 2).unwrap());
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, r#"{"kind":"date","value":"2040-03-02"}"#);
        let back: AttributeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }
}
