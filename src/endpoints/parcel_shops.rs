use crate::error::{ApiError, Result};
use crate::http_client::DhlHttpClient;
use crate::models::{ApiList, ApiObject};

use super::QueryParams;

/// Filters for searching parcel shops.
///
/// At least one of `fuzzy`, `postal_code`, `street`, `city` or
/// `house_number` must be set.
#[derive(Debug, Clone, Default)]
pub struct ParcelShopQuery {
    pub limit: Option<u32>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub radius: Option<u32>,
    pub q: Option<String>,
    pub fuzzy: Option<String>,
    pub house_number: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub show_unavailable: Option<bool>,
    pub service_type: Vec<String>,
    pub is_locker: Option<bool>,
    pub same_depot: Option<bool>,
    pub collection_time: Option<bool>,
}

impl ParcelShopQuery {
    fn validate(&self) -> Result<()> {
        let has_location_filter = [
            &self.fuzzy,
            &self.postal_code,
            &self.street,
            &self.city,
            &self.house_number,
        ]
        .iter()
        .any(|f| f.as_deref().is_some_and(|v| !v.is_empty()));

        if !has_location_filter {
            return Err(ApiError::ValidationError(
                "at least one of fuzzy, postalCode, street, city or houseNumber must be set"
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push_opt("limit", self.limit)
            .push_opt("longitude", self.longitude)
            .push_opt("latitude", self.latitude)
            .push_opt("radius", self.radius)
            .push_opt("q", self.q.as_deref())
            .push_opt("fuzzy", self.fuzzy.as_deref())
            .push_opt("houseNumber", self.house_number.as_deref())
            .push_opt("street", self.street.as_deref())
            .push_opt("postalCode", self.postal_code.as_deref())
            .push_opt("city", self.city.as_deref())
            .push_opt("showUnavailable", self.show_unavailable)
            .push_all("serviceType", &self.service_type)
            .push_opt("isLocker", self.is_locker)
            .push_opt("sameDepot", self.same_depot)
            .push_opt("collectionTime", self.collection_time);
        params
    }
}

pub struct ParcelShopMethods<'a> {
    http: &'a DhlHttpClient,
}

impl<'a> ParcelShopMethods<'a> {
    const ENDPOINT: &'static str = "parcel-shop-locations";

    pub(crate) fn new(http: &'a DhlHttpClient) -> Self {
        Self { http }
    }

    /// A specific parcel shop by country and id
    pub async fn get(&self, country_code: &str, id: &str) -> Result<ApiObject> {
        super::get_by_id(self.http, &[Self::ENDPOINT, country_code], id).await
    }

    /// Search the parcel shops of a country
    pub async fn list(&self, country_code: &str, query: &ParcelShopQuery) -> Result<ApiList> {
        query.validate()?;
        let path = super::path(&[Self::ENDPOINT, country_code])?;
        super::list(self.http, &path, &query.to_params()).await
    }
}
