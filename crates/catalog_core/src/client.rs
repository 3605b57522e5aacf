use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{ColorKey, ColorOption, MediaResponse, RenderedImage, Vehicle, VehicleKey},
    error::{NetworkError, NetworkResult},
};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.visualizer.aws.bmw.cloud";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only view of the external vehicle/color/media service.
///
/// One call is one request: implementations never retry and never cache.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn list_vehicles(&self) -> NetworkResult<Vec<Vehicle>>;
    async fn list_colors(&self, vehicle: &VehicleKey) -> NetworkResult<Vec<ColorOption>>;
    async fn list_images(&self, key: &ColorKey) -> NetworkResult<Vec<RenderedImage>>;
}

#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> NetworkResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| NetworkError::transport(base_url, err))?;
        Self::with_http(http, base_url)
    }

    pub fn with_http(http: Client, base_url: &str) -> NetworkResult<Self> {
        let base_url = Url::parse(base_url).map_err(|err| NetworkError::InvalidUrl {
            url: base_url.to_string(),
            cause: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(NetworkError::InvalidUrl {
                url: base_url.to_string(),
                cause: "url cannot carry a path".to_string(),
            });
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying connection pool, shared with the image fetcher.
    pub fn http(&self) -> &Client {
        &self.http
    }

    fn endpoint(&self, segments: &[&str]) -> NetworkResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| NetworkError::InvalidUrl {
                url: self.base_url.to_string(),
                cause: "url cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> NetworkResult<T> {
        debug!(%url, "catalog request");
        let response = self.http.get(url.clone()).send().await.map_err(|err| {
            warn!(%url, "catalog request failed: {err}");
            NetworkError::transport(url.as_str(), err)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "catalog request rejected");
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| NetworkError::transport(url.as_str(), err))?;
        serde_json::from_slice(&body).map_err(|err| {
            warn!(%url, "catalog response did not decode: {err}");
            NetworkError::decode(url.as_str(), err)
        })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list_vehicles(&self) -> NetworkResult<Vec<Vehicle>> {
        let url = self.endpoint(&["v1", "cars"])?;
        self.get_json(url).await
    }

    async fn list_colors(&self, vehicle: &VehicleKey) -> NetworkResult<Vec<ColorOption>> {
        let url = self.endpoint(&[
            "v1",
            "cars",
            vehicle.model_range.as_str(),
            vehicle.type_code.as_str(),
            "colors",
        ])?;
        self.get_json(url).await
    }

    async fn list_images(&self, key: &ColorKey) -> NetworkResult<Vec<RenderedImage>> {
        let url = self.endpoint(&[
            "v1",
            "cars",
            key.vehicle.model_range.as_str(),
            key.vehicle.type_code.as_str(),
            key.color.as_str(),
            "media",
        ])?;
        let media: MediaResponse = self.get_json(url).await?;
        Ok(media.images)
    }
}
