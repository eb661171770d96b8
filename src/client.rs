use anyhow::Context;
use std::sync::Arc;

use crate::auth::{AuthEndpoints, AuthManager, Credentials, ReqwestTransport, TokenBundle};
use crate::config::Config;
use crate::endpoints::{
    CapabilityMethods, LabelMethods, ParcelShopMethods, ParcelTypeMethods,
    PickupAvailabilityMethods, ProductMethods, ShipmentMethods,
};
use crate::error::Result;
use crate::http_client::DhlHttpClient;
use crate::store::TokenStore;

/// Entry point for the DHL Parcel API
pub struct DhlParcelClient {
    http: DhlHttpClient,
    account_number: Option<String>,
}

impl DhlParcelClient {
    /// Create a client whose token cache lives at `config.token_cache_file`
    pub fn new(config: Config) -> Result<Self> {
        let store = TokenStore::open(&config.token_cache_file, true).with_context(|| {
            format!(
                "Failed to open token cache: {}",
                config.token_cache_file.display()
            )
        })?;
        Self::with_store(config, Arc::new(store))
    }

    /// Create a client on top of an existing token store
    pub fn with_store(config: Config, store: Arc<TokenStore>) -> Result<Self> {
        let client =
            DhlHttpClient::build_client(config.http_connect_timeout, config.http_request_timeout)?;

        let auth_manager = Arc::new(AuthManager::new(
            Credentials::new(config.user_id, config.key),
            AuthEndpoints {
                auth_url: config.auth_url,
                refresh_url: config.refresh_url,
            },
            store,
            Arc::new(ReqwestTransport::new(client.clone())),
        ));

        let http = DhlHttpClient::new(client, config.base_url, auth_manager, config.http_max_retries);

        tracing::debug!("DHL Parcel client ready for {}", http.base_url());
        Ok(Self {
            http,
            account_number: config.account_number,
        })
    }

    /// Run the token lifecycle once and return the resulting bundle
    pub async fn authenticate(&self) -> Result<TokenBundle> {
        Ok(self.http.auth_manager().authenticate().await?)
    }

    pub fn auth_manager(&self) -> &Arc<AuthManager> {
        self.http.auth_manager()
    }

    pub fn http(&self) -> &DhlHttpClient {
        &self.http
    }

    pub fn products(&self) -> ProductMethods<'_> {
        ProductMethods::new(&self.http)
    }

    pub fn parcel_types(&self) -> ParcelTypeMethods<'_> {
        ParcelTypeMethods::new(&self.http)
    }

    pub fn shipments(&self) -> ShipmentMethods<'_> {
        ShipmentMethods::new(&self.http, self.account_number.as_deref())
    }

    pub fn pickup_availability(&self) -> PickupAvailabilityMethods<'_> {
        PickupAvailabilityMethods::new(&self.http)
    }

    pub fn capabilities(&self) -> CapabilityMethods<'_> {
        CapabilityMethods::new(&self.http)
    }

    pub fn parcel_shops(&self) -> ParcelShopMethods<'_> {
        ParcelShopMethods::new(&self.http)
    }

    pub fn labels(&self) -> LabelMethods<'_> {
        LabelMethods::new(&self.http)
    }
}
