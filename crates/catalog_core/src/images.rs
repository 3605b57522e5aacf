use reqwest::Client;
use shared::error::{NetworkError, NetworkResult};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_IMAGE_HOSTS: &[&str] = &["renderings.evecp.bmw.cloud", "www.bmw-m.com"];

/// Remote image sources the gallery is willing to load. Only `https` URLs on
/// one of the listed hosts pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAllowlist {
    hosts: Vec<String>,
}

impl Default for HostAllowlist {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_HOSTS.iter().copied())
    }
}

impl HostAllowlist {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self { hosts }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn check(&self, raw_url: &str) -> NetworkResult<Url> {
        let url = Url::parse(raw_url).map_err(|err| NetworkError::InvalidUrl {
            url: raw_url.to_string(),
            cause: err.to_string(),
        })?;
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if url.scheme() != "https" || !self.hosts.iter().any(|allowed| *allowed == host) {
            return Err(NetworkError::DisallowedHost {
                host: if host.is_empty() {
                    raw_url.to_string()
                } else {
                    host
                },
            });
        }
        Ok(url)
    }
}

/// Downloads rendering bytes for display. URLs outside the allowlist are
/// rejected before any request is made.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http: Client,
    allowlist: HostAllowlist,
}

impl ImageFetcher {
    pub fn new(http: Client, allowlist: HostAllowlist) -> Self {
        Self { http, allowlist }
    }

    pub fn allowlist(&self) -> &HostAllowlist {
        &self.allowlist
    }

    pub async fn fetch(&self, raw_url: &str) -> NetworkResult<Vec<u8>> {
        let url = self.allowlist.check(raw_url)?;
        debug!(%url, "downloading rendering");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|err| NetworkError::transport(url.as_str(), err))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "rendering download rejected");
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| NetworkError::transport(url.as_str(), err))?;
        Ok(bytes.to_vec())
    }
}
