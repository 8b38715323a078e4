//! Push relay trait and endpoint types.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Endpoint attribute holding the device token.
pub const ATTR_TOKEN: &str = "Token";

/// Endpoint attribute holding `"true"` or `"false"`.
pub const ATTR_ENABLED: &str = "Enabled";

/// Endpoint attribute holding the free-form description.
pub const ATTR_CUSTOM_USER_DATA: &str = "CustomUserData";

/// Endpoint attribute map, as returned by the relay.
pub type EndpointAttributes = HashMap<String, String>;

/// One endpoint of a platform application listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Endpoint ARN.
    pub arn: String,
    /// Attributes at listing time.
    #[serde(default)]
    pub attributes: EndpointAttributes,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(arn: impl Into<String>, attributes: EndpointAttributes) -> Self {
        Self {
            arn: arn.into(),
            attributes,
        }
    }

    /// Get an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Device token.
    pub fn token(&self) -> Option<&str> {
        self.attribute(ATTR_TOKEN)
    }

    /// Description stored at creation.
    pub fn custom_user_data(&self) -> Option<&str> {
        self.attribute(ATTR_CUSTOM_USER_DATA)
    }
}

/// Remote push relay.
///
/// One method per remote call; implementations do no filtering or caching.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushRelay: Send + Sync {
    /// List every platform application ARN.
    async fn list_platform_applications(&self) -> Result<Vec<String>>;

    /// List the endpoints registered under an application.
    async fn list_endpoints_by_application(&self, application_arn: &str) -> Result<Vec<Endpoint>>;

    /// Read an endpoint's attributes.
    async fn get_endpoint_attributes(&self, endpoint_arn: &str) -> Result<EndpointAttributes>;

    /// Replace an endpoint's attributes.
    async fn set_endpoint_attributes(
        &self,
        endpoint_arn: &str,
        attributes: EndpointAttributes,
    ) -> Result<()>;

    /// Register a device token under an application, returning the new ARN.
    async fn create_platform_endpoint(
        &self,
        token: &str,
        application_arn: &str,
        custom_user_data: &str,
    ) -> Result<String>;

    /// Delete an endpoint.
    async fn delete_endpoint(&self, endpoint_arn: &str) -> Result<()>;

    /// Publish a `json` structured message, returning the message ID.
    async fn publish(&self, target_arn: &str, message: &str) -> Result<String>;
}
