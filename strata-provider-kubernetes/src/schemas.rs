//! Kubernetes schema definitions
//!
//! Resource type tokens follow `kubernetes:<group>/<version>:<Kind>`, with
//! the core group spelled `core`.

use strata_core::resource::Value;
use strata_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

pub const TOKEN_PREFIX: &str = "kubernetes:";
pub const PROVIDER_TYPE: &str = "providers.kubernetes";
pub const NAMESPACE_TYPE: &str = "kubernetes:core/v1:Namespace";
pub const SERVICE_ACCOUNT_TYPE: &str = "kubernetes:core/v1:ServiceAccount";
pub const CHART_TYPE: &str = "kubernetes:helm.sh/v3:Chart";
pub const CRD_TYPE: &str = "kubernetes:apiextensions.k8s.io/v1:CustomResourceDefinition";

/// Annotation binding a service account to an IAM role
pub const ROLE_ARN_ANNOTATION: &str = "eks.amazonaws.com/role-arn";

/// Type token for a manifest's `apiVersion` and `kind`
pub fn manifest_type_token(api_version: &str, kind: &str) -> String {
    let group_version = if api_version.contains('/') {
        api_version.to_string()
    } else {
        format!("core/{}", api_version)
    };
    format!("{}{}:{}", TOKEN_PREFIX, group_version, kind)
}

fn object_metadata() -> AttributeType {
    AttributeType::Map(Box::new(AttributeType::Any))
}

/// Metadata that must carry the IAM role annotation
fn irsa_metadata() -> AttributeType {
    AttributeType::Custom {
        name: "IrsaObjectMeta".to_string(),
        base: Box::new(object_metadata()),
        validate: |value| {
            let annotation = value
                .get("annotations")
                .and_then(|annotations| annotations.get(ROLE_ARN_ANNOTATION));
            match annotation {
                Some(Value::String(_)) | Some(Value::Deferred(_)) => Ok(()),
                _ => Err(format!("missing annotation '{}'", ROLE_ARN_ANNOTATION)),
            }
        },
    }
}

fn manifest_schema(resource_type: &str, metadata: AttributeType) -> ResourceSchema {
    ResourceSchema::new(resource_type)
        .attribute(AttributeSchema::new("apiVersion", AttributeType::String).required())
        .attribute(AttributeSchema::new("kind", AttributeType::String).required())
        .attribute(AttributeSchema::new("metadata", metadata).required())
        .output("metadata")
}

/// Binding of resources to one cluster
pub fn provider_schema() -> ResourceSchema {
    ResourceSchema::new(PROVIDER_TYPE)
        .with_description("Connection to a Kubernetes cluster")
        .attribute(
            AttributeSchema::new("kubeconfig", AttributeType::Any)
                .required()
                .with_description("Kubeconfig of the target cluster"),
        )
}

pub fn namespace_schema() -> ResourceSchema {
    manifest_schema(NAMESPACE_TYPE, object_metadata()).with_description("A Kubernetes namespace")
}

pub fn service_account_schema() -> ResourceSchema {
    manifest_schema(SERVICE_ACCOUNT_TYPE, irsa_metadata())
        .with_description("A service account bound to an IAM role")
}

pub fn chart_schema() -> ResourceSchema {
    ResourceSchema::new(CHART_TYPE)
        .with_description("A Helm chart release; rendered manifests become its children")
        .attribute(AttributeSchema::new("chart", AttributeType::String).required())
        .attribute(AttributeSchema::new("repo", AttributeType::String))
        .attribute(AttributeSchema::new("namespace", AttributeType::String).required())
        .attribute(AttributeSchema::new("values", AttributeType::Map(Box::new(AttributeType::Any))))
}

/// Schema for any other manifest (e.g., objects rendered by a chart)
pub fn generic_schema(resource_type: &str) -> ResourceSchema {
    manifest_schema(resource_type, object_metadata())
}

/// Returns all Kubernetes schemas with a fixed token
pub fn all_schemas() -> Vec<ResourceSchema> {
    vec![
        provider_schema(),
        namespace_schema(),
        service_account_schema(),
        chart_schema(),
    ]
}
