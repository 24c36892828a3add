//! # Remote Optimizer Module
//!
//! Client for the Tinify "shrink" API.
//!
//! ## Protocol:
//! 1. `POST {endpoint}` with the raw image as body, Basic auth `api:{token}`
//! 2. read the `Location` header of the 2xx response
//! 3. `GET {location}`, the 2xx body is the compressed image
//!
//! Any non-2xx response fails immediately. No retries, no caching: every call
//! is independent.

use crate::error::{Result, TinifyError};
use reqwest::header::LOCATION;
use reqwest::{Client, Response, Url};
use std::future::Future;
use tracing::debug;

/// Username Tinify expects for Basic auth
const API_USER: &str = "api";

/// Compressed image returned by the service
#[derive(Debug, Clone)]
pub struct RemoteOptimization {
    pub bytes: Vec<u8>,
    /// URL the compressed image was downloaded from
    pub location: Url,
}

/// Something that turns image bytes into optimized image bytes
pub trait RemoteOptimizer {
    fn optimize(
        &self,
        image: Vec<u8>,
        credential: &str,
    ) -> impl Future<Output = Result<RemoteOptimization>> + Send;
}

/// HTTP client for the Tinify API
#[derive(Clone)]
pub struct TinifyClient {
    client: Client,
    endpoint: Url,
}

impl TinifyClient {
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("tinicly/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http_client(client, endpoint)
    }

    /// Reuse an already configured `reqwest::Client`
    pub fn with_http_client(client: Client, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            TinifyError::Validation(format!("invalid endpoint {}: {}", endpoint, e))
        })?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn shrink(&self, image: Vec<u8>, credential: &str) -> Result<Url> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(API_USER, Some(credential))
            .body(image)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(TinifyError::MissingLocation)?;

        response.url().join(location).map_err(|e| {
            TinifyError::Validation(format!("invalid Location header {}: {}", location, e))
        })
    }

    async fn download(&self, location: &Url) -> Result<Vec<u8>> {
        let response = self.client.get(location.clone()).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

impl RemoteOptimizer for TinifyClient {
    async fn optimize(&self, image: Vec<u8>, credential: &str) -> Result<RemoteOptimization> {
        let original_size = image.len();
        let location = self.shrink(image, credential).await?;
        debug!("Shrunk {} bytes, fetching {}", original_size, location);

        let bytes = self.download(&location).await?;
        Ok(RemoteOptimization { bytes, location })
    }
}

/// Turn a non-2xx response into a `RemoteService` error carrying its body
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let message = response.text().await.unwrap_or_default().trim().to_string();
    Err(TinifyError::RemoteService {
        status,
        url,
        message,
    })
}
