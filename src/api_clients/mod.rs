//! API Client Modules
//!
//! HTTP clients for the external services the flow depends on. The resource
//! API is the only one today: it creates the project the UI checks look for.

pub mod resource_client;

pub use resource_client::{ApiResponse, ResourceApiClient};
