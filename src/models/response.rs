// Generic response objects
// DHL Parcel responses are kept as JSON mappings with explicit presence checks

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A single JSON object returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiObject(Map<String, Value>);

impl ApiObject {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build from a response value, which must be a JSON object
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ApiError::Internal(anyhow::anyhow!(
                "Expected a JSON object in the response, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Raw field value; `None` when the field is absent
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Present and not `null`
    pub fn is_set(&self, field: &str) -> bool {
        self.get(field).is_some_and(|v| !v.is_null())
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    /// Nested object, if the field holds one
    pub fn get_object(&self, field: &str) -> Option<ApiObject> {
        match self.get(field) {
            Some(Value::Object(fields)) => Some(ApiObject(fields.clone())),
            _ => None,
        }
    }

    /// Nested list, if the field holds an array or a single object
    pub fn get_list(&self, field: &str) -> Option<ApiList> {
        self.get(field)
            .cloned()
            .and_then(|v| ApiList::from_value(v).ok())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// A list of objects returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiList(Vec<ApiObject>);

impl ApiList {
    /// Build from a response value.
    ///
    /// An array yields one item per element, a lone object a single item.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(ApiObject::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Self),
            Value::Object(fields) => Ok(Self(vec![ApiObject(fields)])),
            other => Err(ApiError::Internal(anyhow::anyhow!(
                "Expected a JSON array in the response, got {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn items(&self) -> &[ApiObject] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApiObject> {
        self.0.iter()
    }
}

impl IntoIterator for ApiList {
    type Item = ApiObject;
    type IntoIter = std::vec::IntoIter<ApiObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ApiList {
    type Item = &'a ApiObject;
    type IntoIter = std::slice::Iter<'a, ApiObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_accessors() {
        let shop = ApiObject::from_value(json!({
            "id": "8004-NL-272403",
            "name": "Primera",
            "geoLocation": {"latitude": 52.1, "longitude": 5.1},
            "openingTimes": [{"weekDay": 1}, {"weekDay": 2}],
            "distance": 120,
            "inboundRestricted": false,
            "shopType": null
        }))
        .unwrap();

        assert_eq!(shop.get_str("name"), Some("Primera"));
        assert_eq!(shop.get_i64("distance"), Some(120));
        assert_eq!(shop.get_bool("inboundRestricted"), Some(false));
        assert_eq!(
            shop.get_object("geoLocation").and_then(|g| g.get_f64("latitude")),
            Some(52.1)
        );
        assert_eq!(shop.get_list("openingTimes").map(|l| l.len()), Some(2));

        assert!(shop.contains("shopType"));
        assert!(!shop.is_set("shopType"));
        assert!(!shop.contains("missing"));
        assert_eq!(shop.get_str("missing"), None);
        assert_eq!(shop.get_str("distance"), None);
    }

    #[test]
    fn test_object_rejects_non_objects() {
        assert!(ApiObject::from_value(json!([1, 2])).is_err());
        assert!(ApiObject::from_value(json!("text")).is_err());
    }

    #[test]
    fn test_list_from_array_and_single_object() {
        let list = ApiList::from_value(json!([{"key": "DHL-PARCEL"}, {"key": "SPEEDPACK"}])).unwrap();
        let keys: Vec<_> = list.iter().filter_map(|o| o.get_str("key")).collect();
        assert_eq!(keys, vec!["DHL-PARCEL", "SPEEDPACK"]);

        let single = ApiList::from_value(json!({"key": "DHL-PARCEL"})).unwrap();
        assert_eq!(single.len(), 1);

        assert!(ApiList::from_value(json!([1])).is_err());
        assert!(ApiList::from_value(json!(null)).is_err());
    }

    #[test]
    fn test_serializes_transparently() {
        let list = ApiList::from_value(json!([{"a": 1}])).unwrap();
        assert_eq!(serde_json::to_value(&list).unwrap(), json!([{"a": 1}]));
    }
}
