use crate::error::Result;
use crate::http_client::DhlHttpClient;
use crate::models::{ApiList, Carrier, SenderType};

use super::QueryParams;

/// Optional filters for capability lookups
#[derive(Debug, Clone, Default)]
pub struct CapabilityQuery {
    pub return_product: Option<bool>,
    pub parcel_type: Option<String>,
    pub option: Vec<String>,
    pub from_postal_code: Option<String>,
    pub to_postal_code: Option<String>,
    pub to_city: Option<String>,
    pub account_number: Option<String>,
    pub organisation_id: Option<String>,
    pub business_unit: Option<String>,
    pub carrier: Option<Carrier>,
    pub reference_time_stamp: Option<String>,
    pub quantity: Option<u32>,
}

impl CapabilityQuery {
    fn push_params(&self, params: &mut QueryParams) {
        params
            .push_opt("returnProduct", self.return_product)
            .push_opt("parcelType", self.parcel_type.as_deref())
            .push_all("option", &self.option)
            .push_opt("fromPostalCode", self.from_postal_code.as_deref())
            .push_opt("toPostalCode", self.to_postal_code.as_deref())
            .push_opt("toCity", self.to_city.as_deref())
            .push_opt("accountNumber", self.account_number.as_deref())
            .push_opt("organisationId", self.organisation_id.as_deref())
            .push_opt("businessUnit", self.business_unit.as_deref())
            .push_opt("carrier", self.carrier)
            .push_opt("referenceTimeStamp", self.reference_time_stamp.as_deref())
            .push_opt("quantity", self.quantity);
    }
}

pub struct CapabilityMethods<'a> {
    http: &'a DhlHttpClient,
}

impl<'a> CapabilityMethods<'a> {
    const ENDPOINT: &'static str = "capabilities";

    pub(crate) fn new(http: &'a DhlHttpClient) -> Self {
        Self { http }
    }

    /// Capabilities for a route and sender type
    pub async fn get(
        &self,
        sender_type: SenderType,
        from_country: &str,
        to_country: &str,
        to_business: bool,
        query: &CapabilityQuery,
    ) -> Result<ApiList> {
        let path = super::path(&[Self::ENDPOINT, sender_type.as_str()])?;
        let params = Self::params(from_country, to_country, to_business, query);
        super::list(self.http, &path, &params).await
    }

    fn params(from_country: &str, to_country: &str, to_business: bool, query: &CapabilityQuery) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push("fromCountry", from_country)
            .push("toCountry", to_country)
            .push("toBusiness", to_business);
        query.push_params(&mut params);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_params_come_first() {
        let query = CapabilityQuery {
            option: vec!["DOOR".to_string(), "REFERENCE".to_string()],
            quantity: Some(2),
            ..Default::default()
        };
        let params = CapabilityMethods::params("NL", "BE", false, &query);
        let pairs: Vec<(&str, &str)> = params
            .as_slice()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("fromCountry", "NL"),
                ("toCountry", "BE"),
                ("toBusiness", "false"),
                ("option", "DOOR"),
                ("option", "REFERENCE"),
                ("quantity", "2"),
            ]
        );
    }
}
