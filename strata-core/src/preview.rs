//! Preview - In-memory registry used for previews and tests
//!
//! The preview registry accepts registrations exactly like an engine would:
//! it validates them against provider schemas, runs transformation hooks and
//! hands out unresolved outputs. It never talks to a cloud. Outputs can be
//! settled through `resolve`/`fail` to simulate materialization.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use log::debug;

use crate::error::{DefinitionError, RegistrationError};
use crate::output::{Output, Resolution, Resolver};
use crate::provider::Provider;
use crate::registry::{RegisteredResource, Registry, ResourceOptions};
use crate::resource::{Resource, ResourceId, Value};
use crate::transform::Transformation;

/// A registration as recorded by the preview registry
#[derive(Debug)]
pub struct PreviewEntry {
    pub resource: Resource,
    pub options: ResourceOptions,
    /// Names of the hooks that changed this resource
    pub applied_transformations: Vec<String>,
    resolvers: BTreeMap<String, Resolver<Value>>,
}

impl PreviewEntry {
    pub fn id(&self) -> &ResourceId {
        &self.resource.id
    }

    /// Every resource this one must come after
    pub fn dependencies(&self) -> BTreeSet<ResourceId> {
        let mut deps = self.resource.dependencies();
        deps.extend(self.options.parent.iter().cloned());
        deps.extend(self.options.provider.iter().cloned());
        deps.extend(self.options.depends_on.iter().cloned());
        deps.remove(&self.resource.id);
        deps
    }
}

/// In-memory implementation of `Registry`
pub struct PreviewRegistry {
    providers: Vec<Box<dyn Provider>>,
    entries: Vec<PreviewEntry>,
    index: HashMap<ResourceId, usize>,
    exports: Vec<(String, Output<Value>)>,
}

impl PreviewRegistry {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self {
            providers,
            entries: Vec::new(),
            index: HashMap::new(),
            exports: Vec::new(),
        }
    }

    /// Registrations in registration order
    pub fn entries(&self) -> &[PreviewEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &ResourceId) -> Option<&PreviewEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn exports(&self) -> &[(String, Output<Value>)] {
        &self.exports
    }

    pub fn export_named(&self, name: &str) -> Option<&Output<Value>> {
        self.exports
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, output)| output)
    }

    /// Settle one output of a registered resource
    pub fn resolve(
        &self,
        id: &ResourceId,
        output: &str,
        value: impl Into<Value>,
    ) -> Result<bool, RegistrationError> {
        let resolver = self.resolver(id, output)?;
        Ok(resolver.resolve(value.into()))
    }

    /// Mark every output of a resource as failed
    pub fn fail(&self, id: &ResourceId, reason: &str) -> Result<(), RegistrationError> {
        let entry = self.registered(id)?;
        for resolver in entry.resolvers.values() {
            resolver.fail(reason);
        }
        Ok(())
    }

    fn resolver(
        &self,
        id: &ResourceId,
        output: &str,
    ) -> Result<&Resolver<Value>, RegistrationError> {
        let entry = self.registered(id)?;
        entry
            .resolvers
            .get(output)
            .ok_or_else(|| RegistrationError::UnknownOutput {
                resource: id.clone(),
                output: output.to_string(),
            })
    }

    fn registered(&self, id: &ResourceId) -> Result<&PreviewEntry, RegistrationError> {
        self.entry(id)
            .ok_or_else(|| RegistrationError::NotRegistered(id.clone()))
    }

    /// Resolved input properties of a resource, `None` while inputs are pending
    pub fn resolved_properties(
        &self,
        id: &ResourceId,
    ) -> Result<Option<serde_json::Value>, DefinitionError> {
        let entry = self.registered(id)?;
        match entry.resource.properties_json() {
            Resolution::Ready(json) => Ok(Some(json)),
            Resolution::Pending => Ok(None),
            Resolution::Failed(source) => Err(DefinitionError::UpstreamResolution {
                resource: id.clone(),
                source,
            }),
        }
    }

    /// Fail on the first resource (in preview order) whose inputs failed
    pub fn check_upstream(&self) -> Result<(), DefinitionError> {
        for id in self.preview_order() {
            self.resolved_properties(&id)?;
        }
        Ok(())
    }

    /// Groups of resources an engine could create together
    ///
    /// A resource lands one wave after the latest of its dependencies, so
    /// independent resources share the first wave whatever order they were
    /// registered in.
    pub fn apply_waves(&self) -> Vec<Vec<ResourceId>> {
        let mut wave_of: HashMap<&ResourceId, usize> = HashMap::new();
        let mut waves: Vec<Vec<ResourceId>> = Vec::new();

        // Dependencies are always registered before their dependents
        for entry in &self.entries {
            let wave = entry
                .dependencies()
                .iter()
                .filter_map(|dep| wave_of.get(dep).map(|w| w + 1))
                .max()
                .unwrap_or(0);
            wave_of.insert(entry.id(), wave);
            if waves.len() <= wave {
                waves.resize_with(wave + 1, Vec::new);
            }
            waves[wave].push(entry.id().clone());
        }

        waves
    }

    /// Flattened `apply_waves`
    pub fn preview_order(&self) -> Vec<ResourceId> {
        self.apply_waves().into_iter().flatten().collect()
    }

    /// Hooks inherited from the parent chain, outermost ancestor first
    fn inherited_transformations(&self, options: &ResourceOptions) -> Vec<Transformation> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut parent = options.parent.clone();
        while let Some(id) = parent {
            if !seen.insert(id.clone()) {
                break;
            }
            match self.entry(&id) {
                Some(entry) => {
                    chain.push(entry.options.transformations.clone());
                    parent = entry.options.parent.clone();
                }
                None => break,
            }
        }
        chain.into_iter().rev().flatten().collect()
    }

    fn check_relation(
        &self,
        resource: &ResourceId,
        relation: &'static str,
        target: &ResourceId,
    ) -> Result<(), RegistrationError> {
        if self.index.contains_key(target) {
            Ok(())
        } else {
            Err(RegistrationError::UnknownRelation {
                resource: resource.clone(),
                relation,
                target: target.clone(),
            })
        }
    }
}

impl Registry for PreviewRegistry {
    fn register(
        &mut self,
        mut resource: Resource,
        options: ResourceOptions,
    ) -> Result<RegisteredResource, RegistrationError> {
        let id = resource.id.clone();
        if self.index.contains_key(&id) {
            return Err(RegistrationError::Duplicate(id));
        }

        let schema = self
            .providers
            .iter()
            .find_map(|p| p.schema_for(&id.resource_type))
            .ok_or_else(|| RegistrationError::UnknownType {
                resource: id.clone(),
            })?;

        if let Some(parent) = &options.parent {
            self.check_relation(&id, "parent", parent)?;
        }
        if let Some(provider) = &options.provider {
            self.check_relation(&id, "provider", provider)?;
        }
        for dep in &options.depends_on {
            self.check_relation(&id, "dependency", dep)?;
        }

        // Hooks run once, here, before anything else sees the properties
        let mut hooks = self.inherited_transformations(&options);
        hooks.extend(options.transformations.iter().cloned());
        let mut applied = Vec::new();
        let mut tree = Value::Map(std::mem::take(&mut resource.attributes));
        for hook in &hooks {
            if hook.apply(&id.resource_type, &mut tree) {
                debug!("transformation '{}' rewrote {}", hook.name(), id);
                applied.push(hook.name().to_string());
            }
        }
        resource.attributes = match tree {
            Value::Map(map) => map,
            _ => BTreeMap::new(),
        };

        schema
            .validate(&resource.attributes)
            .map_err(|errors| RegistrationError::Invalid {
                resource: id.clone(),
                errors,
            })?;

        let mut outputs = BTreeMap::new();
        let mut resolvers = BTreeMap::new();
        for name in &schema.outputs {
            let (output, resolver) = Output::unresolved(id.clone());
            let output = if schema.is_secret_output(name) {
                output.secret()
            } else {
                output
            };
            outputs.insert(name.clone(), output);
            resolvers.insert(name.clone(), resolver);
        }

        debug!("registered {} with {} outputs", id, outputs.len());

        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(PreviewEntry {
            resource,
            options,
            applied_transformations: applied,
            resolvers,
        });

        Ok(RegisteredResource::new(id, outputs))
    }

    fn export(&mut self, name: &str, value: Output<Value>) -> Result<(), RegistrationError> {
        if self.export_named(name).is_some() {
            return Err(RegistrationError::DuplicateExport(name.to_string()));
        }
        debug!("exported '{}'", name);
        self.exports.push((name.to_string(), value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ResourceType;
    use crate::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
    use serde_json::json;

    struct NetworkType;

    impl ResourceType for NetworkType {
        fn name(&self) -> &'static str {
            "test.network"
        }

        fn schema(&self) -> ResourceSchema {
            ResourceSchema::new(self.name())
                .attribute(AttributeSchema::new("cidr", types::cidr()).required())
                .output("network_id")
                .secret_output("token")
        }
    }

    struct AppType;

    impl ResourceType for AppType {
        fn name(&self) -> &'static str {
            "test.app"
        }

        fn schema(&self) -> ResourceSchema {
            ResourceSchema::new(self.name())
                .attribute(AttributeSchema::new("network", AttributeType::String))
                .attribute(AttributeSchema::new("spec", AttributeType::Any))
        }
    }

    struct TestProvider;

    impl Provider for TestProvider {
        fn name(&self) -> &'static str {
            "test"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![Box::new(NetworkType), Box::new(AppType)]
        }
    }

    fn registry() -> PreviewRegistry {
        PreviewRegistry::new(vec![Box::new(TestProvider)])
    }

    fn network(registry: &mut PreviewRegistry) -> RegisteredResource {
        registry
            .register(
                Resource::new("test.network", "main").with_attribute("cidr", "10.0.0.0/16"),
                ResourceOptions::new(),
            )
            .unwrap()
    }

    #[test]
    fn register_hands_out_declared_outputs() {
        let mut registry = registry();
        let net = network(&mut registry);
        assert!(net.output("id").is_ok());
        assert!(net.output("network_id").is_ok());
        assert!(net.output("arn").is_err());
    }

    #[test]
    fn secret_outputs_stay_masked_on_the_handle() {
        let mut registry = registry();
        let net = network(&mut registry);
        registry.resolve(net.id(), "token", "s3cr3t-value").unwrap();
        registry.resolve(net.id(), "network_id", "net-1").unwrap();

        assert!(net.output("token").unwrap().is_secret());
        assert!(!net.output("network_id").unwrap().is_secret());
        let shown = format!("{:?}", net);
        assert!(!shown.contains("s3cr3t-value"));
        assert!(shown.contains("net-1"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = registry();
        network(&mut registry);
        let err = registry
            .register(
                Resource::new("test.network", "main").with_attribute("cidr", "10.1.0.0/16"),
                ResourceOptions::new(),
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Duplicate(_)));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register(Resource::new("test.unknown", "x"), ResourceOptions::new())
            .unwrap_err();
        assert!(matches!(err, RegistrationError::UnknownType { .. }));
    }

    #[test]
    fn schema_violations_are_rejected() {
        let mut registry = registry();
        let err = registry
            .register(
                Resource::new("test.network", "bad").with_attribute("cidr", "10.0.0.0/40"),
                ResourceOptions::new(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("test.network.bad"));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut registry = registry();
        let mut options = ResourceOptions::new();
        options.parent = Some(ResourceId::new("test.network", "ghost"));
        let err = registry
            .register(Resource::new("test.app", "web"), options)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::UnknownRelation {
                relation: "parent",
                ..
            }
        ));
    }

    #[test]
    fn apply_waves_follow_dependencies_not_registration_order() {
        let mut registry = registry();
        let net = network(&mut registry);
        let network_id = net.string_output("network_id").unwrap();
        let a = registry
            .register(
                Resource::new("test.app", "a").with_attribute("network", network_id),
                ResourceOptions::new(),
            )
            .unwrap();
        registry
            .register(Resource::new("test.app", "b"), ResourceOptions::new())
            .unwrap();
        registry
            .register(
                Resource::new("test.app", "c"),
                ResourceOptions::new().depends_on(&a),
            )
            .unwrap();

        let waves = registry.apply_waves();
        let names: Vec<Vec<&str>> = waves
            .iter()
            .map(|wave| wave.iter().map(|id| id.name.as_str()).collect())
            .collect();
        assert_eq!(names, vec![vec!["main", "b"], vec!["a"], vec!["c"]]);
        assert_eq!(registry.preview_order().len(), 4);
    }

    #[test]
    fn transformations_apply_to_descendants() {
        let mut registry = registry();
        let strip = Transformation::remove_for_type("strip", "test.app", "spec.status");
        let parent = registry
            .register(
                Resource::new("test.app", "parent"),
                ResourceOptions::new().with_transformation(strip),
            )
            .unwrap();
        registry
            .register(
                Resource::new("test.app", "child")
                    .with_attribute("spec", Value::from(json!({"status": {}, "size": 1}))),
                ResourceOptions::new().with_parent(&parent),
            )
            .unwrap();

        let child = registry.entry(&ResourceId::new("test.app", "child")).unwrap();
        assert_eq!(child.applied_transformations, vec!["strip".to_string()]);
        assert_eq!(
            registry
                .resolved_properties(child.id())
                .unwrap(),
            Some(json!({"spec": {"size": 1}}))
        );
    }

    #[test]
    fn failed_upstream_fails_consumers() {
        let mut registry = registry();
        let net = network(&mut registry);
        let network_id = net.string_output("network_id").unwrap();
        registry
            .register(
                Resource::new("test.app", "web").with_attribute("network", network_id),
                ResourceOptions::new(),
            )
            .unwrap();

        assert!(registry.check_upstream().is_ok());
        registry.fail(net.id(), "quota exceeded").unwrap();

        let err = registry.check_upstream().unwrap_err();
        match err {
            DefinitionError::UpstreamResolution { resource, source } => {
                assert_eq!(resource, ResourceId::new("test.app", "web"));
                assert_eq!(source.upstream, "test.network.main");
            }
            other => panic!("Expected UpstreamResolution, got {:?}", other),
        }
    }

    #[test]
    fn resolve_settles_consumers() {
        let mut registry = registry();
        let net = network(&mut registry);
        let network_id = net.string_output("network_id").unwrap();
        let web = registry
            .register(
                Resource::new("test.app", "web").with_attribute("network", network_id),
                ResourceOptions::new(),
            )
            .unwrap();

        assert_eq!(registry.resolved_properties(web.id()).unwrap(), None);
        assert!(registry.resolve(net.id(), "network_id", "net-123").unwrap());
        assert_eq!(
            registry.resolved_properties(web.id()).unwrap(),
            Some(json!({"network": "net-123"}))
        );
    }

    #[test]
    fn duplicate_export_is_rejected() {
        let mut registry = registry();
        registry.export("name", Output::known(Value::from("x"))).unwrap();
        assert!(registry.export("name", Output::known(Value::from("y"))).is_err());
        assert_eq!(registry.exports().len(), 1);
    }
}
