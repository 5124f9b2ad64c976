//! S3 - Bucket descriptor

use log::warn;
use strata_core::error::{ConfigurationError, DefinitionResult};
use strata_core::output::Output;
use strata_core::registry::{RegisteredResource, Registry, ResourceOptions};
use strata_core::resource::Resource;

use crate::schemas::s3::BUCKET_TYPE;

/// Canned ACL of a bucket
///
/// Anything other than `Private` must say why it is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BucketAcl {
    #[default]
    Private,
    PublicRead { justification: String },
}

impl BucketAcl {
    pub fn public_read(justification: impl Into<String>) -> Result<Self, ConfigurationError> {
        let justification = justification.into();
        if justification.trim().is_empty() {
            return Err(ConfigurationError::invalid(
                "bucket.justification",
                "a public-read bucket needs a non-empty justification",
            ));
        }
        Ok(BucketAcl::PublicRead { justification })
    }

    /// Build from a canned ACL name as written in configuration
    pub fn parse(acl: &str, justification: Option<&str>) -> Result<Self, ConfigurationError> {
        match acl {
            "private" => Ok(BucketAcl::Private),
            "public-read" => Self::public_read(justification.unwrap_or_default()),
            other => Err(ConfigurationError::invalid(
                "bucket.acl",
                format!("unsupported ACL '{}', expected private or public-read", other),
            )),
        }
    }

    pub fn canned_name(&self) -> &'static str {
        match self {
            BucketAcl::Private => "private",
            BucketAcl::PublicRead { .. } => "public-read",
        }
    }
}

/// A registered bucket
#[derive(Debug, Clone)]
pub struct Bucket {
    pub resource: RegisteredResource,
    pub id: Output<String>,
    pub arn: Output<String>,
}

impl Bucket {
    pub fn new(registry: &mut dyn Registry, name: &str, acl: &BucketAcl) -> DefinitionResult<Self> {
        let mut resource = Resource::new(BUCKET_TYPE, name).with_attribute("acl", acl.canned_name());
        if let BucketAcl::PublicRead { justification } = acl {
            warn!("bucket {} is publicly readable: {}", name, justification);
            resource = resource.with_attribute("acl_justification", justification.as_str());
        }

        let resource = registry.register(resource, ResourceOptions::new())?;
        Ok(Self {
            id: resource.string_output("id")?,
            arn: resource.string_output("arn")?,
            resource,
        })
    }
}
