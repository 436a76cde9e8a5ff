//! Universal data types shared by the spy facade and the driver contract.
//!
//! These types provide a normalized representation of the values and
//! metadata that flow between the facade, the underlying drivers, and the
//! dialect strategies.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Flat string tag/value pairs passed through to the underlying driver on
/// connect. Normally at least a `user` and `password` entry.
pub type ConnectOptions = HashMap<String, String>;

/// Universal bind-value representation consumed by dialect formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Json(serde_json::Value),
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Metadata describing one connect option an underlying driver understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverPropertyInfo {
    pub name: String,
    pub value: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    /// Allowed values, when the option is an enumeration.
    pub choices: Vec<String>,
}

impl DriverPropertyInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            description: None,
            required: false,
            choices: Vec::new(),
        }
    }
}

/// Metadata reported by an open connection.
///
/// `driver_name` is the identity of the driver that produced the connection
/// and is the key used by the secondary dialect resolution path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionMetadata {
    pub driver_name: String,
    pub driver_version: Option<String>,
    pub url: Option<String>,
    pub user: Option<String>,
}

impl ConnectionMetadata {
    pub fn new(driver_name: impl Into<String>) -> Self {
        Self {
            driver_name: driver_name.into(),
            driver_version: None,
            url: None,
            user: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_serialize_as_base64() {
        let value = Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_string(&value).expect("should serialize");
        assert_eq!(json, "\"3q2+7w==\"");
    }

    #[test]
    fn text_deserializes_before_bytes() {
        let value: Value = serde_json::from_str("\"hello\"").expect("should parse");
        match value {
            Value::Text(s) => assert_eq!(s, "hello"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn property_info_defaults_to_optional() {
        let info = DriverPropertyInfo::new("user");
        assert_eq!(info.name, "user");
        assert!(!info.required);
        assert!(info.choices.is_empty());
    }
}
