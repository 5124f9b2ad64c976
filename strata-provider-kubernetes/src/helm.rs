//! Helm - Chart releases and the manifests they render
//!
//! Rendering itself is Helm's job. A chart is registered as one resource;
//! whatever manifests rendering produced are then registered as its children,
//! so they inherit the chart's provider and its transformation hooks.

use log::{debug, info};
use strata_core::error::{ConfigurationError, DefinitionResult};
use strata_core::registry::{RegisteredResource, Registry, ResourceOptions};
use strata_core::resource::{Resource, ResourceId, Value};

use crate::schemas::{CHART_TYPE, manifest_type_token};

/// Desired chart release
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub chart: String,
    pub repo: Option<String>,
    pub namespace: Value,
    pub values: Value,
}

impl ChartSpec {
    pub fn new(chart: impl Into<String>, namespace: impl Into<Value>) -> Self {
        Self {
            chart: chart.into(),
            repo: None,
            namespace: namespace.into(),
            values: Value::Map(Default::default()),
        }
    }

    pub fn from_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    pub fn with_values(mut self, values: Value) -> Self {
        self.values = values;
        self
    }

    fn to_resource(&self, name: &str) -> Resource {
        let mut resource = Resource::new(CHART_TYPE, name)
            .with_attribute("chart", self.chart.as_str())
            .with_attribute("namespace", self.namespace.clone())
            .with_attribute("values", self.values.clone());
        if let Some(repo) = &self.repo {
            resource = resource.with_attribute("repo", repo.as_str());
        }
        resource
    }
}

/// A registered chart release
#[derive(Debug, Clone)]
pub struct Chart {
    pub resource: RegisteredResource,
    provider: Option<ResourceId>,
}

impl Chart {
    pub fn new(
        registry: &mut dyn Registry,
        name: &str,
        spec: &ChartSpec,
        options: ResourceOptions,
    ) -> DefinitionResult<Self> {
        let provider = options.provider.clone();
        let resource = registry.register(spec.to_resource(name), options)?;
        Ok(Self { resource, provider })
    }

    /// Register manifests produced by rendering this chart
    ///
    /// Each manifest needs `apiVersion`, `kind` and `metadata.name`; it is
    /// named `<chart>-<namespace>/<name>` (or `<chart>-<name>` when
    /// cluster-scoped) and owned by the chart.
    pub fn register_rendered(
        &self,
        registry: &mut dyn Registry,
        manifests: Vec<serde_json::Value>,
    ) -> DefinitionResult<Vec<RegisteredResource>> {
        let chart_name = &self.resource.id().name;
        let mut registered = Vec::with_capacity(manifests.len());

        for (index, manifest) in manifests.into_iter().enumerate() {
            let field = format!("{}.manifests[{}]", self.resource.id(), index);
            let (resource_type, name) = manifest_identity(&manifest)
                .map_err(|msg| ConfigurationError::invalid(field, msg))?;

            let mut resource = Resource::new(resource_type, format!("{}-{}", chart_name, name));
            if let Value::Map(attributes) = Value::from(manifest) {
                resource.attributes = attributes;
            }

            let options = ResourceOptions {
                provider: self.provider.clone(),
                parent: Some(self.resource.id().clone()),
                ..ResourceOptions::default()
            };
            debug!("registering rendered {}", resource.id);
            registered.push(registry.register(resource, options)?);
        }

        info!(
            "chart {} rendered {} manifests",
            self.resource.id(),
            registered.len()
        );
        Ok(registered)
    }
}

/// Type token and namespaced name of a rendered manifest
fn manifest_identity(manifest: &serde_json::Value) -> Result<(String, String), String> {
    let field = |key: &str| {
        manifest
            .get(key)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| format!("manifest has no string '{}'", key))
    };
    let api_version = field("apiVersion")?;
    let kind = field("kind")?;
    let metadata = manifest
        .get("metadata")
        .ok_or_else(|| "manifest has no 'metadata'".to_string())?;
    let name = metadata
        .get("name")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| "manifest has no 'metadata.name'".to_string())?;

    let qualified = match metadata.get("namespace").and_then(serde_json::Value::as_str) {
        Some(namespace) => format!("{}/{}", namespace, name),
        None => name.to_string(),
    };
    Ok((manifest_type_token(api_version, kind), qualified))
}
