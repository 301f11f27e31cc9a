//! Data fixture: create the resource the UI checks look for.
//!
//! Setup is fail-fast. Anything but `201 Created` aborts with the status in
//! the error, before any browser work starts. Teardown is always invoked by the
//! scenario; under [`CleanupPolicy::LogOnly`] it only logs, since the demo API
//! never stored the resource.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api_clients::{ApiResponse, ResourceApiClient};
use crate::config::{CleanupPolicy, FixtureConfig};
use crate::error::{FlowError, FlowResult};
use crate::logging::log_error;
use crate::models::{NewResource, ResourceRecord};

/// What teardown did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TeardownOutcome {
    Logged { resource_id: i64 },
    Deleted { resource_id: i64 },
    DeleteFailed { resource_id: i64, error: String },
}

/// A created resource and the knowledge to clean it up
#[derive(Debug, Clone)]
pub struct ResourceFixture {
    record: ResourceRecord,
}

impl ResourceFixture {
    /// Create the resource from `config`'s payload
    pub async fn setup(client: &ResourceApiClient, config: &FixtureConfig) -> FlowResult<Self> {
        let payload = NewResource::new(&config.title, &config.body, config.user_id);
        Self::setup_with_payload(client, &payload, config.sentinel_id).await
    }

    /// Create the resource and force its id to `sentinel_id`
    pub async fn setup_with_payload(
        client: &ResourceApiClient,
        payload: &NewResource,
        sentinel_id: i64,
    ) -> FlowResult<Self> {
        let response = client.create_resource(payload).await?;
        let record = Self::record_from_response(&response, sentinel_id)?;

        info!(
            resource_id = record.resource_id(),
            title = %record.title,
            "Data fixture ready"
        );
        Ok(Self { record })
    }

    /// Apply the 201 precondition and the sentinel id to a create response
    pub fn record_from_response(
        response: &ApiResponse,
        sentinel_id: i64,
    ) -> FlowResult<ResourceRecord> {
        if response.status != StatusCode::CREATED {
            log_error(
                "data_fixture",
                "create_resource",
                &format!("API prerequisite failed: {}", response.status.as_u16()),
                Some(&response.body),
            );
            return Err(FlowError::ApiPrerequisite {
                status: response.status.as_u16(),
                message: response
                    .status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        Ok(response
            .json::<ResourceRecord>()?
            .with_sentinel_id(sentinel_id))
    }

    pub fn record(&self) -> &ResourceRecord {
        &self.record
    }

    pub fn resource_id(&self) -> i64 {
        self.record.resource_id()
    }

    /// Release the resource according to `policy`
    ///
    /// Never fails: a failed delete is logged and reported in the outcome.
    pub async fn teardown(
        self,
        client: &ResourceApiClient,
        policy: CleanupPolicy,
    ) -> TeardownOutcome {
        let resource_id = self.resource_id();

        match policy {
            CleanupPolicy::LogOnly => {
                info!("[Teardown] Cleaned up project {}", resource_id);
                TeardownOutcome::Logged { resource_id }
            }
            CleanupPolicy::Delete => match client.delete_resource(resource_id).await {
                Ok(_) => {
                    info!("[Teardown] Deleted project {}", resource_id);
                    TeardownOutcome::Deleted { resource_id }
                }
                Err(e) => {
                    warn!("[Teardown] Failed to delete project {}: {}", resource_id, e);
                    TeardownOutcome::DeleteFailed {
                        resource_id,
                        error: e.to_string(),
                    }
                }
            },
        }
    }
}
