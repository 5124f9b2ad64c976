//! Provider binding - Which cluster Kubernetes resources go to

use log::debug;
use strata_core::error::DefinitionResult;
use strata_core::output::Output;
use strata_core::registry::{RegisteredResource, Registry, ResourceOptions};
use strata_core::resource::{Resource, Value};

use crate::schemas::PROVIDER_TYPE;

/// A registered Kubernetes provider bound to one kubeconfig
///
/// Resources registered with `ResourceOptions::with_provider(&binding.resource)`
/// are created in that cluster, and come after it in apply order.
#[derive(Debug, Clone)]
pub struct ProviderBinding {
    pub resource: RegisteredResource,
}

impl ProviderBinding {
    pub fn new(
        registry: &mut dyn Registry,
        name: &str,
        kubeconfig: Output<Value>,
    ) -> DefinitionResult<Self> {
        debug!("binding Kubernetes provider {}", name);
        let resource = registry.register(
            Resource::new(PROVIDER_TYPE, name).with_attribute("kubeconfig", kubeconfig),
            ResourceOptions::new(),
        )?;
        Ok(Self { resource })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KubernetesProvider;
    use strata_core::preview::PreviewRegistry;

    #[test]
    fn binding_keeps_kubeconfig_secret() {
        let mut registry = PreviewRegistry::new(vec![Box::new(KubernetesProvider::new())]);
        let kubeconfig = Output::known(Value::from("apiVersion: v1")).secret();
        let binding = ProviderBinding::new(&mut registry, "provider", kubeconfig).unwrap();

        let entry = registry.entry(binding.resource.id()).unwrap();
        assert!(entry.resource.attributes["kubeconfig"].contains_secret());
    }
}
