//! Strata AWS Provider
//!
//! AWS resource descriptors (network, EKS, IAM, S3) and the provider that
//! exposes their schemas to a registry.

pub mod eks;
pub mod iam;
pub mod network;
pub mod s3;
pub mod schemas;

use strata_core::provider::{Provider, ResourceType};
use strata_core::schema::ResourceSchema;

pub use eks::{ClusterSpec, EksCluster, NodeGroupSpec, OidcProvider};
pub use iam::{Policy, PolicyAttachment, PolicyDocument, Role, ServiceAccountIdentity};
pub use network::{NetworkSpec, Vpc};
pub use s3::{Bucket, BucketAcl};

/// VPC resource type
pub struct VpcType;

impl ResourceType for VpcType {
    fn name(&self) -> &'static str {
        schemas::vpc::VPC_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::vpc::vpc_schema()
    }
}

/// EKS cluster resource type
pub struct ClusterType;

impl ResourceType for ClusterType {
    fn name(&self) -> &'static str {
        schemas::eks::CLUSTER_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::eks::cluster_schema()
    }
}

/// IAM OIDC identity provider resource type
pub struct OidcProviderType;

impl ResourceType for OidcProviderType {
    fn name(&self) -> &'static str {
        schemas::eks::OIDC_PROVIDER_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::eks::oidc_provider_schema()
    }
}

/// IAM role resource type
pub struct RoleType;

impl ResourceType for RoleType {
    fn name(&self) -> &'static str {
        schemas::iam::ROLE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::iam::role_schema()
    }
}

/// IAM managed policy resource type
pub struct PolicyType;

impl ResourceType for PolicyType {
    fn name(&self) -> &'static str {
        schemas::iam::POLICY_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::iam::policy_schema()
    }
}

/// IAM policy attachment resource type
pub struct PolicyAttachmentType;

impl ResourceType for PolicyAttachmentType {
    fn name(&self) -> &'static str {
        schemas::iam::POLICY_ATTACHMENT_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::iam::policy_attachment_schema()
    }
}

/// S3 bucket resource type
pub struct S3BucketType;

impl ResourceType for S3BucketType {
    fn name(&self) -> &'static str {
        schemas::s3::BUCKET_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::s3::bucket_schema()
    }
}

/// AWS Provider
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsProvider;

impl AwsProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for AwsProvider {
    fn name(&self) -> &'static str {
        "aws"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        vec![
            Box::new(VpcType),
            Box::new(ClusterType),
            Box::new(OidcProviderType),
            Box::new(RoleType),
            Box::new(PolicyType),
            Box::new(PolicyAttachmentType),
            Box::new(S3BucketType),
        ]
    }
}
