//! Bucket stack - a single S3 bucket

use log::info;
use strata_core::error::DefinitionResult;
use strata_core::registry::Registry;
use strata_core::resource::Value;
use strata_provider_aws::s3::Bucket;

use crate::config::StackConfig;

pub const BUCKET_NAME: &str = "my-bucket";

pub fn define(registry: &mut dyn Registry, config: &StackConfig) -> DefinitionResult<Bucket> {
    let acl = config.bucket_acl()?;
    info!("defining bucket stack with {} ACL", acl.canned_name());

    let bucket = Bucket::new(registry, BUCKET_NAME, &acl)?;
    registry.export("bucketName", bucket.id.apply(Value::String))?;
    Ok(bucket)
}
