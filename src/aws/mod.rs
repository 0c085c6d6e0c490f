// Shared AWS SDK configuration.
//
// One SdkConfig is loaded per process and every service client is built
// from it. Credentials come from the default provider chain (the Lambda
// execution role, or the usual env vars and profiles locally). Endpoint
// overrides for local emulators use the SDK's own AWS_ENDPOINT_URL and
// AWS_ENDPOINT_URL_<SERVICE> variables.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

/// Load the shared SDK configuration for `region`.
pub async fn load_config(region: &str) -> SdkConfig {
    debug!(region = region, "Loading AWS configuration");
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}
