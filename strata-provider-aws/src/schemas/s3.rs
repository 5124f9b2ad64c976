//! S3 bucket schema definition

use strata_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use super::types as aws_types;

pub const BUCKET_TYPE: &str = "s3.bucket";

/// Returns the schema for S3 buckets
pub fn bucket_schema() -> ResourceSchema {
    ResourceSchema::new(BUCKET_TYPE)
        .with_description("An S3 bucket for object storage")
        .attribute(
            AttributeSchema::new("acl", aws_types::s3_acl())
                .with_description("The canned ACL for the bucket"),
        )
        .attribute(
            AttributeSchema::new("acl_justification", AttributeType::String)
                .with_description("Why a non-private ACL is acceptable"),
        )
        .output("arn")
        .output("bucket")
}

/// Returns all S3-related schemas
pub fn schemas() -> Vec<ResourceSchema> {
    vec![bucket_schema()]
}
