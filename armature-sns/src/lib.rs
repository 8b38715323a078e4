//! # Armature SNS
//!
//! Mobile push through Amazon SNS platform endpoints.
//!
//! ## Features
//!
//! - **Endpoint directory**: list applications, find, create and delete
//!   device endpoints, read and write endpoint attributes
//! - **ARN parsing**: platform slug and owning application from an
//!   endpoint ARN
//! - **Publishing**: GCM and APNS payloads wrapped in the SNS `json`
//!   message structure
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use armature_sns::{EndpointManager, SnsConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SnsConfig::builder()
//!         .region("us-east-1")
//!         .credentials("AKIA...", "secret")
//!         .build();
//!
//!     let manager = EndpointManager::from_config(&config).await?;
//!
//!     let endpoint = manager
//!         .create_endpoint("device-token", "user 42", "arn:aws:sns:...:app/GCM/MyApp")
//!         .await?;
//!     manager.send_push("You have a new message", &endpoint, 1).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Without AWS
//!
//! ```
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! use armature_sns::{EndpointManager, InMemoryRelay};
//!
//! let relay = InMemoryRelay::new();
//! let app = relay.add_application("APNS", "MyApp");
//! let manager = EndpointManager::new(relay);
//!
//! let endpoint = manager.create_endpoint("token", "user 42", &app).await.unwrap();
//! assert_eq!(manager.get_platform_arn(&endpoint).unwrap(), "APNS");
//! assert_eq!(manager.send_push("Hi", &endpoint, 2).await.unwrap().code(), 0);
//! # });
//! ```

pub mod arn;
mod client;
mod config;
mod error;
mod manager;
mod memory;
pub mod payload;
mod relay;

pub use client::SnsRelay;
pub use config::{
    Credentials, DEFAULT_APNS_SOUND, DEFAULT_GCM_TITLE, PayloadConfig, SnsConfig,
    SnsConfigBuilder,
};
pub use error::{ErrorKind, Result, SnsError};
pub use manager::{EndpointManager, PublishStatus};
pub use memory::{InMemoryRelay, PublishedMessage};
pub use payload::Platform;
pub use relay::{
    ATTR_CUSTOM_USER_DATA, ATTR_ENABLED, ATTR_TOKEN, Endpoint, EndpointAttributes, PushRelay,
};

// Re-export AWS types for convenience
pub use aws_config;
pub use aws_sdk_sns;

/// Prelude for common imports.
///
/// ```
/// use armature_sns::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::SnsRelay;
    pub use crate::config::{PayloadConfig, SnsConfig};
    pub use crate::error::{ErrorKind, Result, SnsError};
    pub use crate::manager::{EndpointManager, PublishStatus};
    pub use crate::memory::InMemoryRelay;
    pub use crate::payload::Platform;
    pub use crate::relay::{Endpoint, EndpointAttributes, PushRelay};
}
