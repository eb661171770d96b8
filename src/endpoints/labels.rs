use bytes::Bytes;

use crate::error::{ApiError, Result};
use crate::http_client::DhlHttpClient;
use crate::models::{ApiList, ApiObject};

use super::QueryParams;

/// Filters for listing labels; at least one must be set
#[derive(Debug, Clone, Default)]
pub struct LabelQuery {
    pub tracker_code_filter: Option<String>,
    pub order_reference_filter: Option<String>,
    pub shipment_id: Option<String>,
}

impl LabelQuery {
    fn to_params(&self) -> Result<QueryParams> {
        let mut params = QueryParams::new();
        params
            .push_opt("trackerCodeFilter", self.tracker_code_filter.as_deref())
            .push_opt("orderReferenceFilter", self.order_reference_filter.as_deref())
            .push_opt("shipmentId", self.shipment_id.as_deref());

        if params.is_empty() {
            return Err(ApiError::ValidationError(
                "at least one of trackerCodeFilter, orderReferenceFilter or shipmentId must be set"
                    .to_string(),
            ));
        }
        Ok(params)
    }
}

pub struct LabelMethods<'a> {
    http: &'a DhlHttpClient,
}

impl<'a> LabelMethods<'a> {
    const ENDPOINT: &'static str = "labels";

    pub(crate) fn new(http: &'a DhlHttpClient) -> Self {
        Self { http }
    }

    /// Label metadata and content as JSON
    pub async fn get(&self, id: &str) -> Result<ApiObject> {
        super::get_by_id(self.http, &[Self::ENDPOINT], id).await
    }

    /// Label as a PDF document
    pub async fn get_pdf(&self, id: &str) -> Result<Bytes> {
        let path = super::path(&[Self::ENDPOINT, id])?;
        self.http.get_bytes(&path, &[], "application/pdf").await
    }

    pub async fn list(&self, query: &LabelQuery) -> Result<ApiList> {
        let params = query.to_params()?;
        super::list(self.http, Self::ENDPOINT, &params).await
    }
}
