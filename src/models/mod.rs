// Data models for the DHL Parcel API

mod response;
mod shipment;

pub use response::{ApiList, ApiObject};
pub use shipment::NewShipment;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Carrier filter accepted by several endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Carrier {
    #[serde(rename = "DHL-PARCEL")]
    DhlParcel,
    #[serde(rename = "DHL-EXPRESS")]
    DhlExpress,
    #[serde(rename = "SPEEDPACK")]
    Speedpack,
}

impl Carrier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Carrier::DhlParcel => "DHL-PARCEL",
            Carrier::DhlExpress => "DHL-EXPRESS",
            Carrier::Speedpack => "SPEEDPACK",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of sender, used as a path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SenderType {
    Business,
    Consumer,
    ParcelShop,
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderType::Business => "business",
            SenderType::Consumer => "consumer",
            SenderType::ParcelShop => "parcelShop",
        }
    }
}

impl fmt::Display for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(Carrier::DhlExpress.to_string(), "DHL-EXPRESS");
        assert_eq!(SenderType::ParcelShop.to_string(), "parcelShop");
        assert_eq!(
            serde_json::to_value(Carrier::Speedpack).unwrap(),
            serde_json::json!("SPEEDPACK")
        );
        assert_eq!(
            serde_json::to_value(SenderType::ParcelShop).unwrap(),
            serde_json::json!("parcelShop")
        );
    }
}
