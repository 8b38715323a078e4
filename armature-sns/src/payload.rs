//! Per-platform publish payloads.
//!
//! SNS expects a `json` structured message: a top-level object whose
//! `default` key carries the plain text and whose platform keys carry the
//! provider payload *as a JSON string*.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::json;

use crate::{PayloadConfig, Result, SnsError};

/// Envelope key carrying the plain text message.
const DEFAULT_KEY: &str = "default";

/// Push platform, as named by the second ARN segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Google Cloud Messaging (Android).
    Gcm,
    /// Apple Push Notification Service.
    Apns,
    /// APNS development environment.
    ApnsSandbox,
    /// Any slug without a dedicated payload shape.
    Other(String),
}

impl Platform {
    /// Parse a platform slug. Matching is exact.
    pub fn from_slug(slug: &str) -> Self {
        match slug {
            "GCM" => Platform::Gcm,
            "APNS" => Platform::Apns,
            "APNS_SANDBOX" => Platform::ApnsSandbox,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Slug used as the envelope key.
    pub fn as_slug(&self) -> &str {
        match self {
            Platform::Gcm => "GCM",
            Platform::Apns => "APNS",
            Platform::ApnsSandbox => "APNS_SANDBOX",
            Platform::Other(slug) => slug,
        }
    }

    /// Check if this platform has a payload shape.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Other(_))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_slug())
    }
}

/// Build the provider-specific payload for one platform.
///
/// Unsupported platforms yield an empty string.
pub fn format_platform_payload(
    platform: &Platform,
    message: &str,
    unread_count: u32,
    config: &PayloadConfig,
) -> String {
    match platform {
        Platform::Gcm => json!({
            "data": {
                "title": config.gcm_title,
                "message": message,
            }
        })
        .to_string(),
        Platform::Apns | Platform::ApnsSandbox => json!({
            "aps": {
                "alert": message,
                "badge": unread_count,
                "sound": config.apns_sound,
            }
        })
        .to_string(),
        Platform::Other(_) => String::new(),
    }
}

/// Build the full `json` structured message for a publish call.
///
/// A platform slugged `default` would collide with the plain text key and is
/// rejected.
pub fn build_envelope(
    platform: &Platform,
    message: &str,
    unread_count: u32,
    config: &PayloadConfig,
) -> Result<String> {
    if platform.as_slug() == DEFAULT_KEY {
        return Err(SnsError::invalid_argument(
            "BuildEnvelope",
            "platform slug collides with the default message key",
        ));
    }

    let mut envelope = BTreeMap::new();
    envelope.insert(DEFAULT_KEY, message.to_string());
    envelope.insert(
        platform.as_slug(),
        format_platform_payload(platform, message, unread_count, config),
    );
    Ok(serde_json::to_string(&envelope)?)
}
