use crate::error::{ApiError, Result};
use crate::http_client::DhlHttpClient;
use crate::models::{ApiList, ApiObject, Carrier, NewShipment, SenderType};

use super::QueryParams;

/// Optional filters for shipment options
#[derive(Debug, Clone, Default)]
pub struct ShipmentOptionsQuery {
    pub carrier: Option<Carrier>,
    pub from_country: Option<String>,
    pub business_unit: Option<String>,
    pub whitelist_required: Option<bool>,
    pub account_number: Option<String>,
    pub to_business: Option<bool>,
}

impl ShipmentOptionsQuery {
    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push_opt("carrier", self.carrier)
            .push_opt("fromCountry", self.from_country.as_deref())
            .push_opt("businessUnit", self.business_unit.as_deref())
            .push_opt("whitelistRequired", self.whitelist_required)
            .push_opt("accountNumber", self.account_number.as_deref())
            .push_opt("toBusiness", self.to_business);
        params
    }
}

pub struct ShipmentMethods<'a> {
    http: &'a DhlHttpClient,
    default_account: Option<&'a str>,
}

impl<'a> ShipmentMethods<'a> {
    const ENDPOINT: &'static str = "shipments";

    pub(crate) fn new(http: &'a DhlHttpClient, default_account: Option<&'a str>) -> Self {
        Self {
            http,
            default_account,
        }
    }

    /// Shipment options available for a sender type
    pub async fn get_options(
        &self,
        sender_type: SenderType,
        query: &ShipmentOptionsQuery,
    ) -> Result<ApiList> {
        let path = super::path(&["shipment-options", sender_type.as_str()])?;
        super::list(self.http, &path, &query.to_params()).await
    }

    /// Create a shipment (and its label)
    pub async fn create(&self, shipment: &NewShipment) -> Result<ApiObject> {
        let body = self.shipment_body(shipment)?;
        tracing::info!("Creating shipment {}", shipment.shipment_id);
        let value = self.http.post_json(Self::ENDPOINT, &body).await?;
        ApiObject::from_value(value)
    }

    pub async fn get(&self, id: &str) -> Result<ApiObject> {
        super::get_by_id(self.http, &[Self::ENDPOINT], id).await
    }

    fn shipment_body(&self, shipment: &NewShipment) -> Result<serde_json::Value> {
        let mut shipment = shipment.clone();
        if shipment.account_id.is_none() {
            shipment.account_id = self.default_account.map(str::to_string);
        }
        if shipment.account_id.is_none() {
            return Err(ApiError::ValidationError(
                "accountId is required; set it on the shipment or configure an account number"
                    .to_string(),
            ));
        }

        serde_json::to_value(&shipment)
            .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("Failed to serialize shipment")))
    }
}
