//! # Resource Models
//!
//! Wire types for the create-resource call. Field names follow the API's
//! camelCase JSON (`userId`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::payload;

/// Payload sent to `POST /posts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResource {
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

impl NewResource {
    pub fn new(title: impl Into<String>, body: impl Into<String>, user_id: i64) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            user_id,
        }
    }
}

impl Default for NewResource {
    fn default() -> Self {
        Self::new(payload::TITLE, payload::BODY, payload::USER_ID)
    }
}

/// A created resource as echoed back by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Server-assigned id, replaced locally by the sentinel
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Any additional fields the server echoed
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceRecord {
    /// Replace whatever id the server returned with `sentinel`
    #[must_use]
    pub fn with_sentinel_id(mut self, sentinel: i64) -> Self {
        self.id = Some(sentinel);
        self
    }

    /// Id used to address the resource; `0` if the record was never assigned one
    pub fn resource_id(&self) -> i64 {
        self.id.unwrap_or_default()
    }
}
