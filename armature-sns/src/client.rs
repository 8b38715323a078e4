//! Amazon SNS implementation of [`PushRelay`].

use async_trait::async_trait;
use aws_sdk_sns::error::{DisplayErrorContext, ProvideErrorMetadata};
use tracing::{debug, info};

use crate::{Endpoint, EndpointAttributes, PushRelay, Result, SnsConfig, SnsError};

/// Push relay backed by Amazon SNS.
///
/// Only the resolved SDK configuration is kept. Every call acquires its own
/// SNS client, which is dropped when the call returns.
#[derive(Debug, Clone)]
pub struct SnsRelay {
    sdk_config: aws_config::SdkConfig,
}

impl SnsRelay {
    /// Create a new SNS relay. Fails on blank credentials.
    pub async fn new(config: &SnsConfig) -> Result<Self> {
        config.validate()?;
        let sdk_config = Self::build_sdk_config(config).await;

        info!(
            region = ?sdk_config.region(),
            endpoint_url = ?config.endpoint_url,
            "SNS relay initialized"
        );

        Ok(Self { sdk_config })
    }

    /// Create from an already loaded SDK configuration.
    pub fn from_sdk_config(sdk_config: aws_config::SdkConfig) -> Self {
        Self { sdk_config }
    }

    /// Build AWS SDK configuration.
    async fn build_sdk_config(config: &SnsConfig) -> aws_config::SdkConfig {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        let creds = aws_credential_types::Credentials::new(
            &config.credentials.access_key_id,
            &config.credentials.secret_access_key,
            config.credentials.session_token.clone(),
            None,
            "armature-sns",
        );
        loader = loader.credentials_provider(creds);

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        loader.load().await
    }

    /// Get the SDK configuration.
    pub fn sdk_config(&self) -> &aws_config::SdkConfig {
        &self.sdk_config
    }

    fn client(&self) -> aws_sdk_sns::Client {
        aws_sdk_sns::Client::new(&self.sdk_config)
    }
}

/// SNS error code of `NotFoundException`.
const NOT_FOUND_CODE: &str = "NotFound";

fn remote<E>(operation: &'static str, err: E) -> SnsError
where
    E: std::error::Error + ProvideErrorMetadata,
{
    let message = DisplayErrorContext(&err).to_string();
    match err.code() {
        Some(NOT_FOUND_CODE) => SnsError::not_found(operation, message),
        _ => SnsError::remote(operation, message),
    }
}

#[async_trait]
impl PushRelay for SnsRelay {
    async fn list_platform_applications(&self) -> Result<Vec<String>> {
        let output = self
            .client()
            .list_platform_applications()
            .send()
            .await
            .map_err(|e| remote("ListPlatformApplications", e))?;

        let arns: Vec<String> = output
            .platform_applications()
            .iter()
            .filter_map(|app| app.platform_application_arn())
            .map(str::to_string)
            .collect();

        debug!(count = arns.len(), "Listed platform applications");
        Ok(arns)
    }

    async fn list_endpoints_by_application(&self, application_arn: &str) -> Result<Vec<Endpoint>> {
        let output = self
            .client()
            .list_endpoints_by_platform_application()
            .platform_application_arn(application_arn)
            .send()
            .await
            .map_err(|e| remote("ListEndpointsByPlatformApplication", e))?;

        let endpoints: Vec<Endpoint> = output
            .endpoints()
            .iter()
            .filter_map(|endpoint| {
                endpoint.endpoint_arn().map(|arn| {
                    Endpoint::new(arn, endpoint.attributes().cloned().unwrap_or_default())
                })
            })
            .collect();

        debug!(
            application_arn = %application_arn,
            count = endpoints.len(),
            "Listed endpoints"
        );
        Ok(endpoints)
    }

    async fn get_endpoint_attributes(&self, endpoint_arn: &str) -> Result<EndpointAttributes> {
        let output = self
            .client()
            .get_endpoint_attributes()
            .endpoint_arn(endpoint_arn)
            .send()
            .await
            .map_err(|e| remote("GetEndpointAttributes", e))?;

        Ok(output.attributes().cloned().unwrap_or_default())
    }

    async fn set_endpoint_attributes(
        &self,
        endpoint_arn: &str,
        attributes: EndpointAttributes,
    ) -> Result<()> {
        self.client()
            .set_endpoint_attributes()
            .endpoint_arn(endpoint_arn)
            .set_attributes(Some(attributes))
            .send()
            .await
            .map_err(|e| remote("SetEndpointAttributes", e))?;

        debug!(endpoint_arn = %endpoint_arn, "Endpoint attributes replaced");
        Ok(())
    }

    async fn create_platform_endpoint(
        &self,
        token: &str,
        application_arn: &str,
        custom_user_data: &str,
    ) -> Result<String> {
        let output = self
            .client()
            .create_platform_endpoint()
            .platform_application_arn(application_arn)
            .token(token)
            .custom_user_data(custom_user_data)
            .send()
            .await
            .map_err(|e| remote("CreatePlatformEndpoint", e))?;

        output.endpoint_arn().map(str::to_string).ok_or_else(|| {
            SnsError::remote("CreatePlatformEndpoint", "response carried no endpoint ARN")
        })
    }

    async fn delete_endpoint(&self, endpoint_arn: &str) -> Result<()> {
        self.client()
            .delete_endpoint()
            .endpoint_arn(endpoint_arn)
            .send()
            .await
            .map_err(|e| remote("DeleteEndpoint", e))?;

        debug!(endpoint_arn = %endpoint_arn, "Endpoint deleted");
        Ok(())
    }

    async fn publish(&self, target_arn: &str, message: &str) -> Result<String> {
        let output = self
            .client()
            .publish()
            .target_arn(target_arn)
            .message(message)
            .message_structure("json")
            .send()
            .await
            .map_err(|e| remote("Publish", e))?;

        Ok(output.message_id().unwrap_or_default().to_string())
    }
}
