//! SNS push configuration.

use serde::{Deserialize, Serialize};

use crate::{Result, SnsError};

/// Default GCM notification title.
pub const DEFAULT_GCM_TITLE: &str = "ONnergy";

/// Default APNS sound file.
pub const DEFAULT_APNS_SOUND: &str = "bingbong.aiff";

/// Explicit AWS credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

/// Fixed values baked into platform payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadConfig {
    /// Title shown on GCM notifications.
    #[serde(default = "default_gcm_title")]
    pub gcm_title: String,
    /// Sound file played by APNS notifications.
    #[serde(default = "default_apns_sound")]
    pub apns_sound: String,
}

fn default_gcm_title() -> String {
    DEFAULT_GCM_TITLE.to_string()
}

fn default_apns_sound() -> String {
    DEFAULT_APNS_SOUND.to_string()
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            gcm_title: default_gcm_title(),
            apns_sound: default_apns_sound(),
        }
    }
}

/// SNS service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnsConfig {
    /// AWS region.
    pub region: Option<String>,
    /// Credentials used to sign every relay call.
    pub credentials: Credentials,
    /// Custom endpoint URL (for LocalStack).
    pub endpoint_url: Option<String>,
    /// Payload constants.
    #[serde(default)]
    pub payload: PayloadConfig,
}

impl SnsConfig {
    /// Create a configuration with explicit credentials.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self::builder()
            .credentials(access_key_id, secret_access_key)
            .build()
    }

    /// Create a builder.
    pub fn builder() -> SnsConfigBuilder {
        SnsConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> SnsConfigBuilder {
        let mut builder = SnsConfigBuilder::new();

        if let Ok(region) = std::env::var("AWS_REGION") {
            builder = builder.region(region);
        } else if let Ok(region) = std::env::var("AWS_DEFAULT_REGION") {
            builder = builder.region(region);
        }

        if let Ok(endpoint) = std::env::var("AWS_ENDPOINT_URL") {
            builder = builder.endpoint_url(endpoint);
        }

        if let (Ok(access_key), Ok(secret_key)) = (
            std::env::var("AWS_ACCESS_KEY_ID"),
            std::env::var("AWS_SECRET_ACCESS_KEY"),
        ) {
            builder = builder.credentials(access_key, secret_key);
        }

        if let Ok(token) = std::env::var("AWS_SESSION_TOKEN") {
            builder = builder.session_token(token);
        }

        if let Ok(title) = std::env::var("SNS_PUSH_GCM_TITLE") {
            builder = builder.gcm_title(title);
        }

        if let Ok(sound) = std::env::var("SNS_PUSH_APNS_SOUND") {
            builder = builder.apns_sound(sound);
        }

        builder
    }

    /// Check that both credential halves are present.
    pub fn validate(&self) -> Result<()> {
        if self.credentials.access_key_id.trim().is_empty() {
            return Err(SnsError::invalid_argument("Configure", "access_key_id"));
        }
        if self.credentials.secret_access_key.trim().is_empty() {
            return Err(SnsError::invalid_argument("Configure", "secret_access_key"));
        }
        Ok(())
    }
}

/// Builder for SNS configuration.
#[derive(Default)]
pub struct SnsConfigBuilder {
    config: SnsConfig,
}

impl SnsConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the AWS region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = Some(region.into());
        self
    }

    /// Set the access key pair.
    pub fn credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.config.credentials.access_key_id = access_key_id.into();
        self.config.credentials.secret_access_key = secret_access_key.into();
        self
    }

    /// Set a session token.
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.config.credentials.session_token = Some(token.into());
        self
    }

    /// Set a custom endpoint URL.
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint_url = Some(url.into());
        self
    }

    /// Configure for LocalStack.
    pub fn localstack(self) -> Self {
        self.endpoint_url("http://localhost:4566")
    }

    /// Set the GCM notification title.
    pub fn gcm_title(mut self, title: impl Into<String>) -> Self {
        self.config.payload.gcm_title = title.into();
        self
    }

    /// Set the APNS sound file.
    pub fn apns_sound(mut self, sound: impl Into<String>) -> Self {
        self.config.payload.apns_sound = sound.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SnsConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SnsConfig::builder()
            .region("eu-west-1")
            .credentials("AKID", "SECRET")
            .localstack()
            .build();

        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.credentials.access_key_id, "AKID");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(config.payload, PayloadConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_credentials_rejected() {
        let err = SnsConfig::new("", "secret").validate().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("access_key_id"));

        let err = SnsConfig::new("key", "  ").validate().unwrap_err();
        assert!(err.to_string().contains("secret_access_key"));
    }

    #[test]
    fn test_deserialize_with_payload_defaults() {
        let config: SnsConfig = serde_json::from_str(
            r#"{
                "region": "us-east-1",
                "credentials": { "access_key_id": "a", "secret_access_key": "b" },
                "endpoint_url": null
            }"#,
        )
        .unwrap();

        assert_eq!(config.payload.gcm_title, DEFAULT_GCM_TITLE);
        assert_eq!(config.payload.apns_sound, DEFAULT_APNS_SOUND);
        assert!(config.credentials.session_token.is_none());
    }
}
