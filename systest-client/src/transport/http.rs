//! HTTP transport backed by reqwest.

use super::{RawResponse, Service, Transport, TransportError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

/// Base URLs of the services under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrls {
    /// Sharder REST API.
    pub sharder: String,
    /// Miner API.
    pub miner: String,
    /// Aggregate API.
    pub zbox: String,
}

impl ServiceUrls {
    /// Base URL of `service`, without a trailing slash.
    pub fn base(&self, service: Service) -> &str {
        let url = match service {
            Service::Sharder => &self.sharder,
            Service::Miner => &self.miner,
            Service::Zbox => &self.zbox,
        };
        url.trim_end_matches('/')
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::ConnectionFailed(e.to_string())
        } else if e.is_builder() {
            TransportError::InvalidUrl(e.to_string())
        } else {
            TransportError::RequestFailed(e.to_string())
        }
    }
}

/// Transport issuing real HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    urls: ServiceUrls,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a per-request timeout.
    pub fn new(urls: ServiceUrls, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { urls, http })
    }

    /// Base URLs in use.
    pub fn urls(&self) -> &ServiceUrls {
        &self.urls
    }

    /// Full URL of `path` on `service`.
    pub fn url(&self, service: Service, path: &str) -> String {
        format!("{}{}", self.urls.base(service), path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        service: Service,
        path: &str,
        query: &[(String, String)],
    ) -> Result<RawResponse, TransportError> {
        let url = self.url(service, path);
        trace!("GET {} {:?}", url, query);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        trace!("{} -> {} ({} bytes)", url, status, body.len());
        Ok(RawResponse { status, body })
    }
}
