//! # Resource API Client
//!
//! HTTP client for the resource (posts) API. It reports status and body as
//! received; deciding what a non-201 means is left to the data fixture.

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ApiEndpointConfig;
use crate::constants::RESOURCES_PATH;
use crate::error::{FlowError, FlowResult};
use crate::models::NewResource;

/// Status and raw body of an API call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> FlowResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client for resource API operations
pub struct ResourceApiClient {
    client: Client,
    base_url: Url,
    config: ApiEndpointConfig,
}

impl std::fmt::Debug for ResourceApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.config.timeout_ms)
            .field("auth_enabled", &self.config.auth_token.is_some())
            .finish()
    }
}

impl ResourceApiClient {
    /// Create new resource API client with the given configuration
    pub fn new(config: ApiEndpointConfig) -> FlowResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            FlowError::config_error(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;

        let mut client_builder =
            Client::builder().user_agent(format!("projectflow/{}", env!("CARGO_PKG_VERSION")));

        if let Some(timeout_ms) = config.timeout_ms {
            client_builder = client_builder.timeout(Duration::from_millis(timeout_ms));
        }

        if let Some(ref token) = config.auth_token {
            let mut default_headers = reqwest::header::HeaderMap::new();
            let value: reqwest::header::HeaderValue = format!("Bearer {token}")
                .parse()
                .map_err(|e| FlowError::config_error(format!("Invalid API auth token: {e}")))?;
            default_headers.insert(reqwest::header::AUTHORIZATION, value);
            client_builder = client_builder.default_headers(default_headers);
        }

        let client = client_builder.build().map_err(|e| {
            FlowError::config_error(format!("Failed to create HTTP client: {e}"))
        })?;

        info!(
            "Created ResourceApiClient for base_url: {}, timeout: {:?}ms",
            base_url, config.timeout_ms
        );

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST {base}/posts` with the JSON payload
    pub async fn create_resource(&self, payload: &NewResource) -> FlowResult<ApiResponse> {
        let url = self.endpoint(RESOURCES_PATH)?;
        debug!("Creating resource at: {}", url);

        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::CREATED {
            info!("Resource created: {}", status);
        } else {
            warn!("Resource creation answered {}: {}", status, body);
        }

        Ok(ApiResponse { status, body })
    }

    /// `DELETE {base}/posts/{id}`
    pub async fn delete_resource(&self, resource_id: i64) -> FlowResult<ApiResponse> {
        let url = self.endpoint(&format!("{RESOURCES_PATH}/{resource_id}"))?;
        debug!("Deleting resource at: {}", url);

        let response = self.client.delete(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FlowError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        info!("Resource {} deleted: {}", resource_id, status);
        Ok(ApiResponse { status, body })
    }

    /// Append `path` to the base URL, keeping any path prefix the base carries
    fn endpoint(&self, path: &str) -> FlowResult<Url> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| FlowError::config_error(format!("Invalid URL: {e}")))
    }
}
