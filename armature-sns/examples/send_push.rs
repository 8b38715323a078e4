//! Send a push notification to one SNS endpoint.
//!
//! ```text
//! AWS_REGION=us-east-1 AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=... \
//!     cargo run -p armature-sns --example send_push -- <endpoint-arn> "Hello" 1
//! ```

use armature_sns::{EndpointManager, SnsConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("armature_sns=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let endpoint = args.next().ok_or("usage: send_push <endpoint-arn> <message> [unread]")?;
    let message = args.next().unwrap_or_else(|| "Hello from Armature".to_string());
    let unread: u32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(0);

    let config = SnsConfig::from_env().build();
    let manager = EndpointManager::from_config(&config).await?;

    if !manager.is_endpoint_enabled(&endpoint).await? {
        tracing::warn!(endpoint_arn = %endpoint, "Endpoint is disabled");
    }

    let status = manager.send_push(&message, &endpoint, unread).await?;
    println!("{:?} (code {})", status, status.code());

    Ok(())
}
