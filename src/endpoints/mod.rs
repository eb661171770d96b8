// Endpoint methods
// Each resource builds its path and query and hands them to the dispatcher

mod capabilities;
mod labels;
mod parcel_shops;
mod parcel_types;
mod pickup_availability;
mod products;
mod query;
mod shipments;

pub use capabilities::{CapabilityMethods, CapabilityQuery};
pub use labels::{LabelMethods, LabelQuery};
pub use parcel_shops::{ParcelShopMethods, ParcelShopQuery};
pub use parcel_types::{ParcelTypeMethods, ParcelTypeQuery};
pub use pickup_availability::PickupAvailabilityMethods;
pub use products::{ProductMethods, ProductQuery};
pub use query::QueryParams;
pub use shipments::{ShipmentMethods, ShipmentOptionsQuery};

use anyhow::Context;
use reqwest::Url;

use crate::error::Result;
use crate::http_client::DhlHttpClient;
use crate::models::{ApiList, ApiObject};

/// Join path segments, percent-encoding each one
fn path(segments: &[&str]) -> Result<String> {
    let mut url = Url::parse("http://localhost/").context("Failed to build request path")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Failed to build request path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.path().trim_start_matches('/').to_string())
}

/// Fetch `{endpoint}/{id}` as a single object
async fn get_by_id(http: &DhlHttpClient, endpoint: &[&str], id: &str) -> Result<ApiObject> {
    let mut segments = endpoint.to_vec();
    segments.push(id);
    let value = http.get_json(&path(&segments)?, &[]).await?;
    ApiObject::from_value(value)
}

/// Fetch a list resource
async fn list(http: &DhlHttpClient, path: &str, query: &QueryParams) -> Result<ApiList> {
    let value = http.get_json(path, query.as_slice()).await?;
    ApiList::from_value(value)
}
