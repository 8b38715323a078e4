//! Endpoint manager: directory, ARN parsing and publishing over a relay.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::arn::{owning_application, platform_segment};
use crate::payload::{self, Platform};
use crate::{
    ATTR_ENABLED, Endpoint, EndpointAttributes, PayloadConfig, PushRelay, Result, SnsConfig,
    SnsError, SnsRelay,
};

/// Outcome of [`EndpointManager::send_push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishStatus {
    /// The relay accepted the message.
    Published {
        /// Relay-assigned message ID.
        message_id: String,
    },
    /// The publish call failed. The cause is logged, not returned.
    Failed,
}

impl PublishStatus {
    /// Numeric result code: `0` when published, `-1` when failed.
    pub fn code(&self) -> i32 {
        match self {
            PublishStatus::Published { .. } => 0,
            PublishStatus::Failed => -1,
        }
    }

    /// Check if the message was published.
    pub fn is_published(&self) -> bool {
        matches!(self, PublishStatus::Published { .. })
    }
}

/// Device endpoint and platform application manager.
///
/// Stateless: every call goes to the relay, nothing is cached.
///
/// ```rust,ignore
/// use armature_sns::{EndpointManager, SnsConfig};
///
/// let config = SnsConfig::from_env().region("us-east-1").build();
/// let manager = EndpointManager::from_config(&config).await?;
///
/// let app = manager.list_applications().await?.remove(0);
/// let endpoint = manager.create_endpoint("device-token", "user 42", &app).await?;
/// let status = manager.send_push("Hello", &endpoint, 3).await?;
/// assert_eq!(status.code(), 0);
/// ```
#[derive(Clone)]
pub struct EndpointManager {
    relay: Arc<dyn PushRelay>,
    payload: PayloadConfig,
}

impl EndpointManager {
    /// Create a manager over any relay, with default payload constants.
    pub fn new(relay: impl PushRelay + 'static) -> Self {
        Self::with_relay(Arc::new(relay))
    }

    /// Create a manager over a shared relay.
    pub fn with_relay(relay: Arc<dyn PushRelay>) -> Self {
        Self {
            relay,
            payload: PayloadConfig::default(),
        }
    }

    /// Create a manager backed by Amazon SNS.
    pub async fn from_config(config: &SnsConfig) -> Result<Self> {
        let relay = SnsRelay::new(config).await?;
        Ok(Self::new(relay).payload_config(config.payload.clone()))
    }

    /// Override the payload constants.
    pub fn payload_config(mut self, payload: PayloadConfig) -> Self {
        self.payload = payload;
        self
    }

    /// Get the underlying relay.
    pub fn relay(&self) -> &Arc<dyn PushRelay> {
        &self.relay
    }

    /// Publish a message to one endpoint.
    ///
    /// Argument and lookup failures are errors. A failing publish call is
    /// reported as [`PublishStatus::Failed`] instead.
    pub async fn send_push(
        &self,
        message: &str,
        endpoint_arn: &str,
        unread_count: u32,
    ) -> Result<PublishStatus> {
        const OP: &str = "SendPush";

        if endpoint_arn.trim().is_empty() {
            return Err(SnsError::invalid_argument(OP, "endpoint_arn"));
        }
        if message.trim().is_empty() {
            return Err(SnsError::invalid_argument(OP, "message"));
        }

        let endpoint = self
            .get_endpoint(None, Some(endpoint_arn))
            .await
            .map_err(|e| e.within(OP))?
            .ok_or_else(|| SnsError::not_found(OP, "endpoint_arn"))?;

        let slug = self.get_platform_arn(&endpoint).map_err(|e| e.within(OP))?;
        if slug.is_empty() {
            return Err(SnsError::invalid_argument(OP, "platform"));
        }

        let platform = Platform::from_slug(&slug);
        if !platform.is_supported() {
            debug!(platform = %platform, "No payload shape for platform, sending default only");
        }
        let envelope = payload::build_envelope(&platform, message, unread_count, &self.payload)
            .map_err(|e| e.within(OP))?;

        match self.relay.publish(&endpoint, &envelope).await {
            Ok(message_id) => {
                debug!(endpoint_arn = %endpoint, message_id = %message_id, "Push published");
                Ok(PublishStatus::Published { message_id })
            }
            Err(e) => {
                warn!(endpoint_arn = %endpoint, error = %e, "Push publish failed");
                Ok(PublishStatus::Failed)
            }
        }
    }

    /// ARNs of every endpoint in every application.
    pub async fn list_endpoints_token(&self) -> Result<Vec<String>> {
        let endpoints = self
            .list_all_endpoints()
            .await
            .map_err(|e| e.within("ListEndpointsToken"))?;
        Ok(endpoints.into_iter().map(|e| e.arn).collect())
    }

    /// ARNs of endpoints whose `CustomUserData` contains `description`.
    ///
    /// A blank or missing filter returns every endpoint.
    pub async fn get_endpoints(&self, description: Option<&str>) -> Result<Vec<String>> {
        let endpoints = self
            .list_all_endpoints()
            .await
            .map_err(|e| e.within("GetEndpoints"))?;

        let arns = match description {
            Some(filter) if !filter.trim().is_empty() => endpoints
                .into_iter()
                .filter(|e| e.custom_user_data().is_some_and(|d| d.contains(filter)))
                .map(|e| e.arn)
                .collect(),
            _ => endpoints.into_iter().map(|e| e.arn).collect(),
        };
        Ok(arns)
    }

    /// Look up an endpoint by ARN, or else by device token.
    ///
    /// With an ARN, the endpoint exists if it has at least one attribute.
    /// With a token, the first endpoint whose `Token` matches is returned.
    pub async fn get_endpoint(
        &self,
        token: Option<&str>,
        endpoint_arn: Option<&str>,
    ) -> Result<Option<String>> {
        const OP: &str = "GetEndpoint";

        if let Some(arn) = endpoint_arn.filter(|a| !a.trim().is_empty()) {
            return match self.relay.get_endpoint_attributes(arn).await {
                Ok(attributes) if !attributes.is_empty() => Ok(Some(arn.to_string())),
                Ok(_) => Ok(None),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e.within(OP)),
            };
        }

        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            let endpoints = self.list_all_endpoints().await.map_err(|e| e.within(OP))?;
            return Ok(endpoints
                .into_iter()
                .find(|e| e.token() == Some(token))
                .map(|e| e.arn));
        }

        Ok(None)
    }

    /// Register a device token under an application.
    ///
    /// A token that is already registered is a conflict. A description that
    /// matches exactly one endpoint returns that endpoint unchanged; one that
    /// matches several is a conflict. A blank description matches every
    /// endpoint, like the [`get_endpoints`](Self::get_endpoints) filter.
    pub async fn create_endpoint(
        &self,
        registration_id: &str,
        description: &str,
        application_arn: &str,
    ) -> Result<String> {
        const OP: &str = "CreateEndpoint";

        if registration_id.trim().is_empty() {
            return Err(SnsError::invalid_argument(OP, "registration_id"));
        }

        if let Some(existing) = self
            .get_endpoint(Some(registration_id), None)
            .await
            .map_err(|e| e.within(OP))?
        {
            return Err(SnsError::conflict(
                OP,
                format!("duplicate registration: registration_id already bound to {existing}"),
            ));
        }

        let mut matches = self
            .get_endpoints(Some(description))
            .await
            .map_err(|e| e.within(OP))?;
        match matches.len() {
            0 => {}
            1 => {
                let arn = matches.remove(0);
                debug!(endpoint_arn = %arn, "Reusing endpoint matched by description");
                return Ok(arn);
            }
            n => {
                return Err(SnsError::conflict(
                    OP,
                    format!("ambiguous description: {n} endpoints match"),
                ));
            }
        }

        if self
            .get_application(Some(application_arn), None)
            .await
            .map_err(|e| e.within(OP))?
            .is_none()
        {
            return Err(SnsError::not_found(OP, "application_arn"));
        }

        let arn = self
            .relay
            .create_platform_endpoint(registration_id, application_arn, description)
            .await
            .map_err(|e| e.within(OP))?;

        debug!(endpoint_arn = %arn, application_arn = %application_arn, "Endpoint created");
        Ok(arn)
    }

    /// Read an endpoint's attributes.
    pub async fn get_endpoint_attributes(&self, endpoint_arn: &str) -> Result<EndpointAttributes> {
        self.relay
            .get_endpoint_attributes(endpoint_arn)
            .await
            .map_err(|e| e.within("GetEndpointAttributes"))
    }

    /// Set one attribute, keeping the others.
    pub async fn set_endpoint_attribute(
        &self,
        endpoint_arn: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        const OP: &str = "SetEndpointAttribute";

        if self
            .get_endpoint(None, Some(endpoint_arn))
            .await
            .map_err(|e| e.within(OP))?
            .is_none()
        {
            return Err(SnsError::not_found(OP, "endpoint_arn"));
        }

        let mut attributes = self
            .relay
            .get_endpoint_attributes(endpoint_arn)
            .await
            .map_err(|e| e.within(OP))?;
        attributes.insert(key.to_string(), value.to_string());

        // The relay replaces the whole map.
        self.relay
            .set_endpoint_attributes(endpoint_arn, attributes)
            .await
            .map_err(|e| e.within(OP))?;

        debug!(endpoint_arn = %endpoint_arn, key = %key, "Endpoint attribute set");
        Ok(())
    }

    /// Resolve an application.
    ///
    /// With an application ARN, returns it if the relay knows it. With an
    /// endpoint ARN, returns everything before its last `/` without a remote
    /// call.
    pub async fn get_application(
        &self,
        application_arn: Option<&str>,
        endpoint_arn: Option<&str>,
    ) -> Result<Option<String>> {
        const OP: &str = "GetApplication";

        if let Some(app) = application_arn.filter(|a| !a.is_empty()) {
            let applications = self.list_applications().await.map_err(|e| e.within(OP))?;
            return Ok(applications.into_iter().find(|a| a == app));
        }

        if let Some(endpoint) = endpoint_arn.filter(|e| !e.is_empty()) {
            return owning_application(endpoint)
                .map(|a| Some(a.to_string()))
                .ok_or_else(|| SnsError::invalid_argument(OP, "endpoint_arn"));
        }

        Ok(None)
    }

    /// ARNs of every platform application.
    pub async fn list_applications(&self) -> Result<Vec<String>> {
        self.relay
            .list_platform_applications()
            .await
            .map_err(|e| e.within("ListApplications"))
    }

    /// Platform slug of an ARN (`GCM`, `APNS`, ...).
    pub fn get_platform_arn(&self, arn: &str) -> Result<String> {
        const OP: &str = "GetPlatformArn";

        if arn.is_empty() {
            return Err(SnsError::invalid_argument(OP, "arn"));
        }
        platform_segment(arn)
            .map(str::to_string)
            .ok_or_else(|| SnsError::invalid_argument(OP, format!("malformed arn: {arn}")))
    }

    /// Check whether an endpoint's `Enabled` attribute is exactly `"true"`.
    pub async fn is_endpoint_enabled(&self, endpoint_arn: &str) -> Result<bool> {
        let attributes = self
            .relay
            .get_endpoint_attributes(endpoint_arn)
            .await
            .map_err(|e| e.within("IsEndpointEnabled"))?;
        Ok(attributes.get(ATTR_ENABLED).map(String::as_str) == Some("true"))
    }

    /// Check whether an endpoint is listed under an application.
    pub async fn is_endpoint_in_application(
        &self,
        endpoint_arn: &str,
        application_arn: &str,
    ) -> Result<bool> {
        let endpoints = self
            .relay
            .list_endpoints_by_application(application_arn)
            .await
            .map_err(|e| e.within("IsEndpointInApplication"))?;
        Ok(endpoints.iter().any(|e| e.arn == endpoint_arn))
    }

    /// Delete an endpoint. No existence check is made first.
    pub async fn delete_endpoint(&self, endpoint_arn: &str) -> Result<()> {
        self.relay
            .delete_endpoint(endpoint_arn)
            .await
            .map_err(|e| e.within("DeleteEndpoint"))?;
        debug!(endpoint_arn = %endpoint_arn, "Endpoint deleted");
        Ok(())
    }

    /// Every endpoint of every application, one relay call per application.
    async fn list_all_endpoints(&self) -> Result<Vec<Endpoint>> {
        let mut all = Vec::new();
        for application in self.list_applications().await? {
            let endpoints = self
                .relay
                .list_endpoints_by_application(&application)
                .await?;
            all.extend(endpoints);
        }
        Ok(all)
    }
}

impl std::fmt::Debug for EndpointManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointManager")
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::MockPushRelay;
    use crate::{ErrorKind, InMemoryRelay};
    use serde_json::{Value, json};

    const APP: &str = "arn:aws:sns:us-east-1:000000000000:app/GCM/MyApp";

    const GCM_ENDPOINT: &str = "arn:aws:sns:us-east-1:000000000000:endpoint/GCM/MyApp/0a1b2c3d";

    fn attributes(pairs: &[(&str, &str)]) -> EndpointAttributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_send_push_publish_failure_returns_failed() {
        let mut relay = MockPushRelay::new();
        relay
            .expect_get_endpoint_attributes()
            .returning(|_| Ok(attributes(&[("Enabled", "true")])));
        relay
            .expect_publish()
            .times(1)
            .returning(|_, _| Err(SnsError::remote("Publish", "throttled")));

        let manager = EndpointManager::new(relay);
        let status = manager.send_push("Hello", GCM_ENDPOINT, 0).await.unwrap();

        assert_eq!(status, PublishStatus::Failed);
        assert_eq!(status.code(), -1);
    }

    #[tokio::test]
    async fn test_send_push_builds_gcm_envelope() {
        let mut relay = MockPushRelay::new();
        relay
            .expect_get_endpoint_attributes()
            .returning(|_| Ok(attributes(&[("Token", "t")])));
        relay
            .expect_publish()
            .withf(|target, message| {
                let value: Value = serde_json::from_str(message).unwrap();
                let gcm: Value = serde_json::from_str(value["GCM"].as_str().unwrap()).unwrap();
                target.contains("endpoint/GCM/")
                    && value["default"] == "Hello"
                    && gcm == json!({ "data": { "title": "ONnergy", "message": "Hello" } })
            })
            .returning(|_, _| Ok("msg-1".to_string()));

        let manager = EndpointManager::new(relay);
        let status = manager.send_push("Hello", GCM_ENDPOINT, 0).await.unwrap();

        assert_eq!(
            status,
            PublishStatus::Published {
                message_id: "msg-1".to_string()
            }
        );
        assert_eq!(status.code(), 0);
    }

    #[tokio::test]
    async fn test_send_push_requires_arguments() {
        let manager = EndpointManager::new(MockPushRelay::new());

        let err = manager.send_push("Hello", " ", 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.message().contains("endpoint_arn"));

        let err = manager.send_push("", GCM_ENDPOINT, 0).await.unwrap_err();
        assert_eq!(err.operation(), "SendPush");
        assert!(err.message().contains("message"));
    }

    #[tokio::test]
    async fn test_send_push_unknown_endpoint() {
        let manager = EndpointManager::new(InMemoryRelay::new());
        let err = manager
            .send_push("Hello", GCM_ENDPOINT, 0)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.operation(), "SendPush");
    }

    #[tokio::test]
    async fn test_relay_outage_propagates_with_operation() {
        let mut relay = MockPushRelay::new();
        relay
            .expect_list_platform_applications()
            .returning(|| Err(SnsError::remote("ListPlatformApplications", "503")));

        let manager = EndpointManager::new(relay);
        let err = manager.get_endpoints(None).await.unwrap_err();

        assert_eq!(err.operation(), "GetEndpoints");
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
        assert!(err.message().contains("ListPlatformApplications"));
    }

    #[tokio::test]
    async fn test_get_endpoint_empty_attributes_is_none() {
        let mut relay = MockPushRelay::new();
        relay
            .expect_get_endpoint_attributes()
            .returning(|_| Ok(EndpointAttributes::new()));

        let manager = EndpointManager::new(relay);
        assert_eq!(
            manager.get_endpoint(None, Some(GCM_ENDPOINT)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_get_endpoint_arn_takes_precedence() {
        let mut relay = MockPushRelay::new();
        relay
            .expect_get_endpoint_attributes()
            .returning(|_| Ok(attributes(&[("Token", "other")])));
        relay.expect_list_platform_applications().never();

        let manager = EndpointManager::new(relay);
        let arn = GCM_ENDPOINT.to_string();
        assert_eq!(
            manager.get_endpoint(Some("token"), Some(arn.as_str())).await.unwrap(),
            Some(arn)
        );
    }

    #[tokio::test]
    async fn test_get_endpoint_without_arguments() {
        let manager = EndpointManager::new(MockPushRelay::new());
        assert_eq!(manager.get_endpoint(None, None).await.unwrap(), None);
        assert_eq!(manager.get_endpoint(Some(""), Some(" ")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_application_from_endpoint_needs_no_relay() {
        let manager = EndpointManager::new(MockPushRelay::new());

        let app = manager
            .get_application(None, Some(GCM_ENDPOINT))
            .await
            .unwrap();
        assert_eq!(
            app.as_deref(),
            Some("arn:aws:sns:us-east-1:000000000000:endpoint/GCM/MyApp")
        );

        let err = manager
            .get_application(None, Some("no-separator"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert_eq!(manager.get_application(None, None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_application_checks_known_list() {
        let mut relay = MockPushRelay::new();
        relay
            .expect_list_platform_applications()
            .returning(|| Ok(vec![APP.to_string()]));

        let manager = EndpointManager::new(relay);
        assert_eq!(
            manager.get_application(Some(APP), None).await.unwrap(),
            Some(APP.to_string())
        );
        assert_eq!(
            manager
                .get_application(Some("arn:aws:sns:us-east-1:000000000000:app/GCM/Other"), None)
                .await
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_get_platform_arn() {
        let manager = EndpointManager::new(MockPushRelay::new());

        assert_eq!(manager.get_platform_arn("app/PLATFORM/suffix").unwrap(), "PLATFORM");
        assert_eq!(manager.get_platform_arn(GCM_ENDPOINT).unwrap(), "GCM");
        assert_eq!(manager.get_platform_arn("x/WNS/y").unwrap(), "WNS");

        let err = manager.get_platform_arn("").unwrap_err();
        assert_eq!(err.to_string(), "GetPlatformArn: invalid argument: arn");
        assert!(manager.get_platform_arn("only/one").is_err());
    }

    #[tokio::test]
    async fn test_is_endpoint_enabled_requires_exact_true() {
        for (value, expected) in [
            (Some("true"), true),
            (Some("True"), false),
            (Some("false"), false),
            (Some(""), false),
            (None, false),
        ] {
            let mut relay = MockPushRelay::new();
            relay.expect_get_endpoint_attributes().returning(move |_| {
                let mut attrs = attributes(&[("Token", "t")]);
                if let Some(v) = value {
                    attrs.insert("Enabled".to_string(), v.to_string());
                }
                Ok(attrs)
            });

            let manager = EndpointManager::new(relay);
            assert_eq!(
                manager.is_endpoint_enabled(GCM_ENDPOINT).await.unwrap(),
                expected,
                "Enabled = {:?}",
                value
            );
        }
    }

    #[tokio::test]
    async fn test_delete_endpoint_passes_relay_error_through() {
        let mut relay = MockPushRelay::new();
        relay
            .expect_delete_endpoint()
            .returning(|arn| Err(SnsError::not_found("DeleteEndpoint", arn)));

        let manager = EndpointManager::new(relay);
        let err = manager.delete_endpoint("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "DeleteEndpoint: not found: missing");
    }

    #[test]
    fn test_publish_status_codes() {
        assert_eq!(
            PublishStatus::Published {
                message_id: String::new()
            }
            .code(),
            0
        );
        assert!(!PublishStatus::Failed.is_published());
    }
}
