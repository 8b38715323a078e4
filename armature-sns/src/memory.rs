//! In-process push relay.
//!
//! Mirrors the SNS behaviour the manager depends on, so endpoint logic can
//! be exercised without an AWS account.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::{
    ATTR_CUSTOM_USER_DATA, ATTR_ENABLED, ATTR_TOKEN, Endpoint, EndpointAttributes, PushRelay,
    Result, SnsError,
};

const ARN_PREFIX: &str = "arn:aws:sns:us-east-1:000000000000";

/// A message accepted by [`InMemoryRelay::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Target endpoint ARN.
    pub target_arn: String,
    /// The `json` structured message.
    pub message: String,
    /// Generated message ID.
    pub message_id: String,
}

#[derive(Default)]
struct State {
    applications: Vec<String>,
    endpoints: HashMap<String, Vec<Endpoint>>,
    published: Vec<PublishedMessage>,
    fail_publish: bool,
}

impl State {
    fn find_endpoint_mut(&mut self, endpoint_arn: &str) -> Option<&mut Endpoint> {
        self.endpoints
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|e| e.arn == endpoint_arn)
    }

    fn find_endpoint(&self, endpoint_arn: &str) -> Option<&Endpoint> {
        self.endpoints
            .values()
            .flat_map(|list| list.iter())
            .find(|e| e.arn == endpoint_arn)
    }
}

/// In-memory [`PushRelay`].
#[derive(Default)]
pub struct InMemoryRelay {
    state: RwLock<State>,
}

impl InMemoryRelay {
    /// Create an empty relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a platform application ARN.
    pub fn application_arn(platform: &str, name: &str) -> String {
        format!("{}:app/{}/{}", ARN_PREFIX, platform, name)
    }

    /// Register a platform application, returning its ARN.
    pub fn add_application(&self, platform: &str, name: &str) -> String {
        let arn = Self::application_arn(platform, name);
        let mut state = self.state.write();
        if !state.applications.contains(&arn) {
            state.applications.push(arn.clone());
            state.endpoints.insert(arn.clone(), Vec::new());
        }
        arn
    }

    /// Make every subsequent publish fail (or succeed again).
    pub fn fail_publishes(&self, fail: bool) {
        self.state.write().fail_publish = fail;
    }

    /// Messages published so far.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.state.read().published.clone()
    }

    /// Number of endpoints across all applications.
    pub fn endpoint_count(&self) -> usize {
        self.state.read().endpoints.values().map(Vec::len).sum()
    }

    fn endpoint_arn_for(application_arn: &str) -> String {
        let base = application_arn.replacen(":app/", ":endpoint/", 1);
        format!("{}/{}", base, uuid::Uuid::new_v4())
    }
}

#[async_trait]
impl PushRelay for InMemoryRelay {
    async fn list_platform_applications(&self) -> Result<Vec<String>> {
        Ok(self.state.read().applications.clone())
    }

    async fn list_endpoints_by_application(&self, application_arn: &str) -> Result<Vec<Endpoint>> {
        self.state
            .read()
            .endpoints
            .get(application_arn)
            .cloned()
            .ok_or_else(|| {
                SnsError::not_found("ListEndpointsByPlatformApplication", application_arn)
            })
    }

    async fn get_endpoint_attributes(&self, endpoint_arn: &str) -> Result<EndpointAttributes> {
        self.state
            .read()
            .find_endpoint(endpoint_arn)
            .map(|e| e.attributes.clone())
            .ok_or_else(|| SnsError::not_found("GetEndpointAttributes", endpoint_arn))
    }

    async fn set_endpoint_attributes(
        &self,
        endpoint_arn: &str,
        attributes: EndpointAttributes,
    ) -> Result<()> {
        let mut state = self.state.write();
        let endpoint = state
            .find_endpoint_mut(endpoint_arn)
            .ok_or_else(|| SnsError::not_found("SetEndpointAttributes", endpoint_arn))?;
        endpoint.attributes = attributes;
        Ok(())
    }

    async fn create_platform_endpoint(
        &self,
        token: &str,
        application_arn: &str,
        custom_user_data: &str,
    ) -> Result<String> {
        let mut state = self.state.write();
        let endpoints = state
            .endpoints
            .get_mut(application_arn)
            .ok_or_else(|| SnsError::not_found("CreatePlatformEndpoint", application_arn))?;

        let arn = Self::endpoint_arn_for(application_arn);
        let mut attributes = EndpointAttributes::new();
        attributes.insert(ATTR_TOKEN.to_string(), token.to_string());
        attributes.insert(ATTR_ENABLED.to_string(), "true".to_string());
        if !custom_user_data.is_empty() {
            attributes.insert(
                ATTR_CUSTOM_USER_DATA.to_string(),
                custom_user_data.to_string(),
            );
        }
        endpoints.push(Endpoint::new(arn.clone(), attributes));

        debug!(endpoint_arn = %arn, "In-memory endpoint created");
        Ok(arn)
    }

    async fn delete_endpoint(&self, endpoint_arn: &str) -> Result<()> {
        // SNS treats deleting an unknown endpoint as success.
        let mut state = self.state.write();
        for list in state.endpoints.values_mut() {
            list.retain(|e| e.arn != endpoint_arn);
        }
        Ok(())
    }

    async fn publish(&self, target_arn: &str, message: &str) -> Result<String> {
        let mut state = self.state.write();
        if state.fail_publish {
            return Err(SnsError::remote("Publish", "publish rejected"));
        }

        let endpoint = state
            .find_endpoint(target_arn)
            .ok_or_else(|| SnsError::not_found("Publish", target_arn))?;
        if endpoint.attribute(ATTR_ENABLED) != Some("true") {
            return Err(SnsError::remote(
                "Publish",
                format!("endpoint is disabled: {}", target_arn),
            ));
        }

        let message_id = uuid::Uuid::new_v4().to_string();
        state.published.push(PublishedMessage {
            target_arn: target_arn.to_string(),
            message: message.to_string(),
            message_id: message_id.clone(),
        });
        Ok(message_id)
    }
}
