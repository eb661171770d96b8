// DHL Parcel API client - library root

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http_client;
pub mod models;
pub mod store;

pub use client::DhlParcelClient;
pub use error::{ApiError, AuthError, StoreError};
