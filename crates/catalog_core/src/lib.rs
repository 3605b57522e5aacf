//! Client side of the vehicle rendering service: the catalog client, the
//! shared per-session cache in front of it, and the remote image fetcher.

pub mod cache;
pub mod client;
pub mod images;

pub use cache::CatalogCache;
pub use client::{CatalogClient, HttpCatalogClient, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use images::{HostAllowlist, ImageFetcher, DEFAULT_IMAGE_HOSTS};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
