use crate::error::Result;
use crate::http_client::DhlHttpClient;
use crate::models::ApiList;

use super::QueryParams;

pub struct PickupAvailabilityMethods<'a> {
    http: &'a DhlHttpClient,
}

impl<'a> PickupAvailabilityMethods<'a> {
    const ENDPOINT: &'static str = "pickup-availability";

    pub(crate) fn new(http: &'a DhlHttpClient) -> Self {
        Self { http }
    }

    /// Pickup availability for a country and postal code
    pub async fn list(&self, country_code: &str, postal_code: &str) -> Result<ApiList> {
        let mut params = QueryParams::new();
        params
            .push("countryCode", country_code)
            .push("postalCode", postal_code);
        super::list(self.http, Self::ENDPOINT, &params).await
    }
}
