use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Load AWS configuration for `region` from the default credential chain
/// (environment, profile, or the Lambda execution role).
pub async fn build_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

pub fn runtime_client(config: &SdkConfig) -> aws_sdk_bedrockruntime::Client {
    aws_sdk_bedrockruntime::Client::new(config)
}
