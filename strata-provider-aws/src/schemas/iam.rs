//! IAM schema definitions

use strata_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::types as aws_types;

pub const ROLE_TYPE: &str = "iam.role";
pub const POLICY_TYPE: &str = "iam.policy";
pub const POLICY_ATTACHMENT_TYPE: &str = "iam.policy_attachment";

pub fn role_schema() -> ResourceSchema {
    ResourceSchema::new(ROLE_TYPE)
        .with_description("An IAM role")
        .attribute(
            AttributeSchema::new("assume_role_policy", AttributeType::String)
                .required()
                .with_description("Trust policy document (JSON)"),
        )
        .attribute(AttributeSchema::new("description", AttributeType::String))
        .output("arn")
        .output("name")
}

pub fn policy_schema() -> ResourceSchema {
    ResourceSchema::new(POLICY_TYPE)
        .with_description("A customer managed IAM policy")
        .attribute(
            AttributeSchema::new("policy", AttributeType::String)
                .required()
                .with_description("Permissions policy document (JSON)"),
        )
        .output("arn")
}

pub fn policy_attachment_schema() -> ResourceSchema {
    ResourceSchema::new(POLICY_ATTACHMENT_TYPE)
        .with_description("Attaches a managed policy to roles")
        .attribute(AttributeSchema::new("policy_arn", aws_types::arn()).required())
        .attribute(AttributeSchema::new("roles", types::string_list()).required())
}

/// Returns all IAM schemas
pub fn schemas() -> Vec<ResourceSchema> {
    vec![role_schema(), policy_schema(), policy_attachment_schema()]
}
