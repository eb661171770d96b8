use crate::error::Result;
use crate::http_client::DhlHttpClient;
use crate::models::{ApiList, ApiObject, Carrier};

use super::QueryParams;

/// Filters for listing products
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub business_unit: Option<String>,
    pub from_country: Option<String>,
    pub to_country: Option<String>,
    pub business_product: Option<bool>,
    pub carrier: Option<Carrier>,
}

impl ProductQuery {
    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push_opt("businessUnit", self.business_unit.as_deref())
            .push_opt("fromCountry", self.from_country.as_deref())
            .push_opt("toCountry", self.to_country.as_deref())
            .push_opt("businessProduct", self.business_product)
            .push_opt("carrier", self.carrier);
        params
    }
}

pub struct ProductMethods<'a> {
    http: &'a DhlHttpClient,
}

impl<'a> ProductMethods<'a> {
    const ENDPOINT: &'static str = "products";

    pub(crate) fn new(http: &'a DhlHttpClient) -> Self {
        Self { http }
    }

    /// List all products matching the filters
    pub async fn list(&self, query: &ProductQuery) -> Result<ApiList> {
        super::list(self.http, Self::ENDPOINT, &query.to_params()).await
    }

    pub async fn get(&self, id: &str) -> Result<ApiObject> {
        super::get_by_id(self.http, &[Self::ENDPOINT], id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_set_filters_are_sent() {
        let query = ProductQuery {
            from_country: Some("NL".to_string()),
            business_product: Some(false),
            carrier: Some(Carrier::DhlParcel),
            ..Default::default()
        };
        let params = query.to_params();
        assert_eq!(
            params.as_slice(),
            &[
                ("fromCountry".to_string(), "NL".to_string()),
                ("businessProduct".to_string(), "false".to_string()),
                ("carrier".to_string(), "DHL-PARCEL".to_string()),
            ]
        );
    }
}
