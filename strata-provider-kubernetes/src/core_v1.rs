//! core/v1 objects: Namespace and ServiceAccount

use strata_core::error::DefinitionResult;
use strata_core::output::Output;
use strata_core::registry::{RegisteredResource, Registry, ResourceOptions};
use strata_core::resource::{Resource, Value};

use crate::meta::ObjectMeta;
use crate::schemas::{NAMESPACE_TYPE, ROLE_ARN_ANNOTATION, SERVICE_ACCOUNT_TYPE};

fn object(resource_type: &str, name: &str, kind: &str, metadata: Value) -> Resource {
    Resource::new(resource_type, name)
        .with_attribute("apiVersion", "v1")
        .with_attribute("kind", kind)
        .with_attribute("metadata", metadata)
}

/// A registered namespace
#[derive(Debug, Clone)]
pub struct Namespace {
    pub resource: RegisteredResource,
    /// `metadata.name` as reported by the cluster
    pub name: Output<String>,
}

impl Namespace {
    pub fn new(
        registry: &mut dyn Registry,
        name: &str,
        metadata: &ObjectMeta,
        options: ResourceOptions,
    ) -> DefinitionResult<Self> {
        let resource = registry.register(
            object(NAMESPACE_TYPE, name, "Namespace", metadata.to_value()),
            options,
        )?;
        Ok(Self {
            name: resource.nested_string_output("metadata", "name")?,
            resource,
        })
    }
}

/// A registered service account bound to an IAM role
#[derive(Debug, Clone)]
pub struct ServiceAccount {
    pub resource: RegisteredResource,
    pub name: Output<String>,
}

impl ServiceAccount {
    /// `metadata` gets the role annotation added; callers set name and namespace
    pub fn new(
        registry: &mut dyn Registry,
        name: &str,
        metadata: ObjectMeta,
        role_arn: Output<String>,
        options: ResourceOptions,
    ) -> DefinitionResult<Self> {
        let metadata = metadata.with_annotation(ROLE_ARN_ANNOTATION, role_arn);
        let resource = registry.register(
            object(SERVICE_ACCOUNT_TYPE, name, "ServiceAccount", metadata.to_value()),
            options,
        )?;
        Ok(Self {
            name: resource.nested_string_output("metadata", "name")?,
            resource,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KubernetesProvider;
    use serde_json::json;
    use strata_core::preview::PreviewRegistry;
    use strata_core::resource::ResourceId;

    fn registry() -> PreviewRegistry {
        PreviewRegistry::new(vec![Box::new(KubernetesProvider::new())])
    }

    #[test]
    fn namespace_name_comes_from_metadata_output() {
        let mut registry = registry();
        let meta = ObjectMeta::named("aws-lb-controller").unwrap();
        let ns = Namespace::new(&mut registry, "ns", &meta, ResourceOptions::new()).unwrap();

        assert!(ns.name.resolution().is_pending());
        registry
            .resolve(
                ns.resource.id(),
                "metadata",
                json!({"name": "aws-lb-controller", "uid": "1234"}),
            )
            .unwrap();
        assert_eq!(
            ns.name.resolution().ready(),
            Some("aws-lb-controller".to_string())
        );
    }

    #[test]
    fn service_account_carries_role_annotation() {
        let mut registry = registry();
        let meta = ObjectMeta::named("aws-lb-controller").unwrap();
        let ns = Namespace::new(&mut registry, "ns", &meta, ResourceOptions::new()).unwrap();

        let (role_arn, resolver) =
            Output::<String>::unresolved(ResourceId::new("iam.role", "controller"));
        let sa = ServiceAccount::new(
            &mut registry,
            "sa",
            ObjectMeta::named("controller-sa")
                .unwrap()
                .in_namespace(ns.name.clone()),
            role_arn,
            ResourceOptions::new(),
        )
        .unwrap();

        let deps = registry.entry(sa.resource.id()).unwrap().dependencies();
        assert!(deps.contains(ns.resource.id()));
        assert!(deps.contains(&ResourceId::new("iam.role", "controller")));

        registry
            .resolve(ns.resource.id(), "metadata", json!({"name": "aws-lb-controller"}))
            .unwrap();
        resolver.resolve("arn:aws:iam::123456789012:role/controller".to_string());

        assert_eq!(
            registry.resolved_properties(sa.resource.id()).unwrap(),
            Some(json!({
                "apiVersion": "v1",
                "kind": "ServiceAccount",
                "metadata": {
                    "name": "controller-sa",
                    "namespace": "aws-lb-controller",
                    "annotations": {
                        "eks.amazonaws.com/role-arn": "arn:aws:iam::123456789012:role/controller"
                    }
                }
            }))
        );
    }
}
