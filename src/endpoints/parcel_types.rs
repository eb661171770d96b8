use crate::error::Result;
use crate::http_client::DhlHttpClient;
use crate::models::{ApiList, ApiObject, Carrier, SenderType};

use super::QueryParams;

/// Optional filters for listing parcel types
#[derive(Debug, Clone, Default)]
pub struct ParcelTypeQuery {
    pub to_country: Option<String>,
    pub to_business: Option<bool>,
    pub business_unit: Option<String>,
    pub from_postal_code: Option<String>,
    pub to_postal_code: Option<String>,
    pub return_product: Option<bool>,
    pub carrier: Vec<Carrier>,
    pub account_number: Option<String>,
}

impl ParcelTypeQuery {
    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push_opt("toCountry", self.to_country.as_deref())
            .push_opt("toBusiness", self.to_business)
            .push_opt("businessUnit", self.business_unit.as_deref())
            .push_opt("fromPostalCode", self.from_postal_code.as_deref())
            .push_opt("toPostalCode", self.to_postal_code.as_deref())
            .push_opt("returnProduct", self.return_product)
            .push_all("carrier", &self.carrier)
            .push_opt("accountNumber", self.account_number.as_deref());
        params
    }
}

pub struct ParcelTypeMethods<'a> {
    http: &'a DhlHttpClient,
}

impl<'a> ParcelTypeMethods<'a> {
    const ENDPOINT: &'static str = "parcel-types";

    pub(crate) fn new(http: &'a DhlHttpClient) -> Self {
        Self { http }
    }

    /// List the parcel types available for a sender type and origin country
    pub async fn list(
        &self,
        sender_type: SenderType,
        from_country: &str,
        query: &ParcelTypeQuery,
    ) -> Result<ApiList> {
        let path = super::path(&[Self::ENDPOINT, sender_type.as_str(), from_country])?;
        super::list(self.http, &path, &query.to_params()).await
    }

    pub async fn get(&self, id: &str) -> Result<ApiObject> {
        super::get_by_id(self.http, &[Self::ENDPOINT], id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_number_keeps_its_own_key() {
        let query = ParcelTypeQuery {
            to_country: Some("BE".to_string()),
            account_number: Some("01234567".to_string()),
            carrier: vec![Carrier::DhlParcel, Carrier::DhlExpress],
            ..Default::default()
        };
        let params = query.to_params();
        let pairs: Vec<(&str, &str)> = params
            .as_slice()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("toCountry", "BE"),
                ("carrier", "DHL-PARCEL"),
                ("carrier", "DHL-EXPRESS"),
                ("accountNumber", "01234567"),
            ]
        );
    }
}
