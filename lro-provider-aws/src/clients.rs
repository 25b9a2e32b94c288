//! AWS SDK clients for one region

use aws_config::Region;
use aws_sdk_cloudcontrol::Client as CloudControlClient;
use aws_sdk_elasticbeanstalk::Client as BeanstalkClient;

/// SDK clients sharing one loaded configuration
#[derive(Clone, Debug)]
pub struct AwsClients {
    pub elasticbeanstalk: BeanstalkClient,
    pub cloudcontrol: CloudControlClient,
    region: String,
}

impl AwsClients {
    /// Load configuration from the environment for the specified region
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            elasticbeanstalk: BeanstalkClient::new(&config),
            cloudcontrol: CloudControlClient::new(&config),
            region: region.to_string(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}
