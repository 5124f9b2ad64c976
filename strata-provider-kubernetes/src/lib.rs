//! Strata Kubernetes Provider
//!
//! Kubernetes descriptors (provider binding, namespaces, service accounts,
//! Helm charts) and the hooks applied to rendered manifests.

pub mod binding;
pub mod core_v1;
pub mod helm;
pub mod meta;
pub mod schemas;
pub mod transforms;

use strata_core::provider::{Provider, ResourceType};
use strata_core::schema::ResourceSchema;

pub use binding::ProviderBinding;
pub use core_v1::{Namespace, ServiceAccount};
pub use helm::{Chart, ChartSpec};
pub use meta::ObjectMeta;
pub use transforms::remove_crd_status;

/// Kubernetes provider resource type
pub struct ProviderBindingType;

impl ResourceType for ProviderBindingType {
    fn name(&self) -> &'static str {
        schemas::PROVIDER_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::provider_schema()
    }
}

/// Namespace resource type
pub struct NamespaceType;

impl ResourceType for NamespaceType {
    fn name(&self) -> &'static str {
        schemas::NAMESPACE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::namespace_schema()
    }
}

/// ServiceAccount resource type
pub struct ServiceAccountType;

impl ResourceType for ServiceAccountType {
    fn name(&self) -> &'static str {
        schemas::SERVICE_ACCOUNT_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::service_account_schema()
    }
}

/// Helm chart resource type
pub struct ChartType;

impl ResourceType for ChartType {
    fn name(&self) -> &'static str {
        schemas::CHART_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        schemas::chart_schema()
    }
}

/// Kubernetes Provider
#[derive(Debug, Clone, Copy, Default)]
pub struct KubernetesProvider;

impl KubernetesProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for KubernetesProvider {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        vec![
            Box::new(ProviderBindingType),
            Box::new(NamespaceType),
            Box::new(ServiceAccountType),
            Box::new(ChartType),
        ]
    }

    /// Charts render arbitrary kinds, so any `kubernetes:` token is accepted
    fn schema_for(&self, resource_type: &str) -> Option<ResourceSchema> {
        if let Some(t) = self
            .resource_types()
            .into_iter()
            .find(|t| t.name() == resource_type)
        {
            return Some(t.schema());
        }
        resource_type
            .starts_with(schemas::TOKEN_PREFIX)
            .then(|| schemas::generic_schema(resource_type))
    }
}
