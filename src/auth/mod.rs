// Authentication module
// Manages the DHL Parcel token lifecycle on top of the persistent token store

mod exchange;
mod manager;
mod transport;
mod types;

pub use manager::{AuthEndpoints, AuthManager};
pub use transport::{AuthTransport, ReqwestTransport};
pub use types::{AuthSession, Credentials, RawResponse, TokenBundle};
