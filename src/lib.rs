// Armature Notifications - mobile push over managed relays
//
// Re-exports the relay integrations enabled through feature flags.

#[cfg(feature = "sns")]
pub use armature_sns;

#[cfg(feature = "sns")]
pub use armature_sns::{EndpointManager, PublishStatus, SnsConfig, SnsError};

/// Prelude for common imports
pub mod prelude {
    #[cfg(feature = "sns")]
    pub use armature_sns::prelude::*;
}
