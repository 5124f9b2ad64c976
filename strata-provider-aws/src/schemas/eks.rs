//! EKS cluster schema definitions

use strata_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::types as aws_types;

pub const CLUSTER_TYPE: &str = "eks.cluster";
pub const OIDC_PROVIDER_TYPE: &str = "iam.openid_connect_provider";

/// Returns the schema for an EKS cluster with its default node group
pub fn cluster_schema() -> ResourceSchema {
    ResourceSchema::new(CLUSTER_TYPE)
        .with_description("A managed Kubernetes control plane with a default node group")
        .attribute(AttributeSchema::new("vpc_id", AttributeType::String).required())
        .attribute(AttributeSchema::new("public_subnet_ids", types::string_list()).required())
        .attribute(
            AttributeSchema::new("node_group", AttributeType::Map(Box::new(AttributeType::Any)))
                .required()
                .with_description("desired_capacity, min_size, max_size and instance_type"),
        )
        .attribute(AttributeSchema::new("create_oidc_provider", AttributeType::Bool))
        .output("name")
        .secret_output("kubeconfig")
        .output("oidc_issuer")
}

/// Returns the schema for the IAM OIDC identity provider of a cluster
pub fn oidc_provider_schema() -> ResourceSchema {
    ResourceSchema::new(OIDC_PROVIDER_TYPE)
        .with_description("IAM OpenID Connect identity provider trusting a cluster's issuer")
        .attribute(AttributeSchema::new("url", AttributeType::String).required())
        .attribute(AttributeSchema::new("client_id_list", types::string_list()).required())
        .attribute(AttributeSchema::new("thumbprint_list", types::string_list()))
        .output("arn")
        .output("url")
}

/// Schema of the node group map nested in the cluster
pub fn node_group_schema() -> ResourceSchema {
    ResourceSchema::new("eks.node_group")
        .attribute(AttributeSchema::new("desired_capacity", types::non_negative_int()).required())
        .attribute(AttributeSchema::new("min_size", types::non_negative_int()).required())
        .attribute(AttributeSchema::new("max_size", types::positive_int()).required())
        .attribute(AttributeSchema::new("instance_type", aws_types::instance_type()).required())
}

/// Returns all EKS-related schemas
pub fn schemas() -> Vec<ResourceSchema> {
    vec![cluster_schema(), oidc_provider_schema()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use strata_core::resource::Value;

    #[test]
    fn valid_node_group() {
        let mut attrs = BTreeMap::new();
        attrs.insert("desired_capacity".to_string(), Value::Int(2));
        attrs.insert("min_size".to_string(), Value::Int(1));
        attrs.insert("max_size".to_string(), Value::Int(3));
        attrs.insert("instance_type".to_string(), Value::from("t2.small"));
        assert!(node_group_schema().validate(&attrs).is_ok());
    }

    #[test]
    fn node_group_rejects_bad_instance_type() {
        let mut attrs = BTreeMap::new();
        attrs.insert("desired_capacity".to_string(), Value::Int(2));
        attrs.insert("min_size".to_string(), Value::Int(1));
        attrs.insert("max_size".to_string(), Value::Int(3));
        attrs.insert("instance_type".to_string(), Value::from("small"));
        assert!(node_group_schema().validate(&attrs).is_err());
    }

    #[test]
    fn oidc_provider_outputs() {
        let schema = oidc_provider_schema();
        assert!(schema.outputs.contains(&"arn".to_string()));
        assert!(schema.outputs.contains(&"url".to_string()));
    }
}
