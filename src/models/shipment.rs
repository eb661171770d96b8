use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Body of a create-shipment request.
///
/// Address, piece and option documents are passed through as JSON so callers
/// can use every field the API accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShipment {
    /// Client-generated UUID identifying the shipment
    pub shipment_id: String,
    /// Falls back to the client's configured account number when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub receiver: Value,
    pub shipper: Value,
    pub pieces: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_behalf_of: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customs_declaration: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_label: Option<bool>,
}

impl NewShipment {
    /// New shipment with a fresh v4 shipment id
    pub fn new(receiver: Value, shipper: Value, pieces: Vec<Value>) -> Self {
        Self {
            shipment_id: Uuid::new_v4().to_string(),
            account_id: None,
            receiver,
            shipper,
            pieces,
            options: Vec::new(),
            order_reference: None,
            on_behalf_of: None,
            product: None,
            customs_declaration: None,
            return_label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_shipment_generates_uuid() {
        let shipment = NewShipment::new(json!({}), json!({}), vec![]);
        assert!(Uuid::parse_str(&shipment.shipment_id).is_ok());
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let mut shipment = NewShipment::new(
            json!({"name": {"firstName": "Jan"}}),
            json!({"name": {"companyName": "Shop"}}),
            vec![json!({"parcelType": "SMALL", "quantity": 1})],
        );
        shipment.order_reference = Some("ORDER-1".to_string());

        let value = serde_json::to_value(&shipment).unwrap();
        assert_eq!(value["orderReference"], "ORDER-1");
        assert_eq!(value["pieces"][0]["parcelType"], "SMALL");
        assert!(value.get("accountId").is_none());
        assert!(value.get("options").is_none());
        assert!(value.get("returnLabel").is_none());
    }
}
