//! Registry - The declarative registration interface
//!
//! Stack definitions hand every descriptor to a `Registry` together with its
//! options and get back a handle exposing the resource's deferred outputs.
//! What happens afterwards (planning, applying, state) belongs to whoever
//! implements the trait.

use std::collections::BTreeMap;

use crate::assert::assert_defined;
use crate::error::{ConfigurationError, RegistrationError};
use crate::output::Output;
use crate::resource::{Resource, ResourceId, Value};
use crate::transform::Transformation;

/// Options that accompany a registration
#[derive(Debug, Clone, Default)]
pub struct ResourceOptions {
    /// Provider resource this resource is bound to (e.g., a Kubernetes provider)
    pub provider: Option<ResourceId>,
    /// Owning resource; used for deletion ordering and hook inheritance
    pub parent: Option<ResourceId>,
    /// Extra ordering edges not visible through outputs
    pub depends_on: Vec<ResourceId>,
    /// Hooks applied to this resource and its descendants
    pub transformations: Vec<Transformation>,
}

impl ResourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: &RegisteredResource) -> Self {
        self.provider = Some(provider.id().clone());
        self
    }

    pub fn with_parent(mut self, parent: &RegisteredResource) -> Self {
        self.parent = Some(parent.id().clone());
        self
    }

    pub fn depends_on(mut self, resource: &RegisteredResource) -> Self {
        self.depends_on.push(resource.id().clone());
        self
    }

    pub fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.transformations.push(transformation);
        self
    }
}

/// Handle to a registered resource
#[derive(Debug, Clone)]
pub struct RegisteredResource {
    id: ResourceId,
    outputs: BTreeMap<String, Output<Value>>,
}

impl RegisteredResource {
    pub fn new(id: ResourceId, outputs: BTreeMap<String, Output<Value>>) -> Self {
        Self { id, outputs }
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Deferred output attribute declared by the resource type
    pub fn output(&self, name: &str) -> Result<Output<Value>, ConfigurationError> {
        assert_defined(
            &format!("{}.{}", self.id, name),
            self.outputs.get(name).cloned(),
        )
    }

    /// Output attribute that must resolve to a string
    pub fn string_output(&self, name: &str) -> Result<Output<String>, ConfigurationError> {
        let field = format!("{}.{}", self.id, name);
        Ok(self.output(name)?.try_apply(move |value| match value {
            Value::String(s) => Ok(s),
            other => Err(format!("{} resolved to non-string value {:?}", field, other)),
        }))
    }

    /// Output attribute that must resolve to a list of strings
    pub fn string_list_output(
        &self,
        name: &str,
    ) -> Result<Output<Vec<String>>, ConfigurationError> {
        let field = format!("{}.{}", self.id, name);
        Ok(self.output(name)?.try_apply(move |value| match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(format!("{} contains non-string item {:?}", field, other)),
                })
                .collect(),
            other => Err(format!("{} resolved to non-list value {:?}", field, other)),
        }))
    }

    /// String at `key` inside a map-valued output (e.g., `metadata.name`)
    pub fn nested_string_output(
        &self,
        name: &str,
        key: &str,
    ) -> Result<Output<String>, ConfigurationError> {
        let field = format!("{}.{}.{}", self.id, name, key);
        let key = key.to_string();
        Ok(self.output(name)?.try_apply(move |value| {
            match value.get(&key).and_then(Value::as_str) {
                Some(s) => Ok(s.to_string()),
                None => Err(format!("{} is not a string", field)),
            }
        }))
    }
}

/// Declarative registration interface
pub trait Registry {
    /// Register a resource; returns a handle to its outputs
    fn register(
        &mut self,
        resource: Resource,
        options: ResourceOptions,
    ) -> Result<RegisteredResource, RegistrationError>;

    /// Record a named program output
    fn export(&mut self, name: &str, value: Output<Value>) -> Result<(), RegistrationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Resolution;

    fn handle_with(name: &str) -> (RegisteredResource, crate::output::Resolver<Value>) {
        let id = ResourceId::new("test", "r");
        let (output, resolver) = Output::unresolved(id.clone());
        let outputs = BTreeMap::from([(name.to_string(), output)]);
        (RegisteredResource::new(id, outputs), resolver)
    }

    #[test]
    fn undeclared_output_is_configuration_error() {
        let (handle, _) = handle_with("arn");
        let err = handle.output("url").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::Undefined {
                field: "test.r.url".to_string()
            }
        );
    }

    #[test]
    fn string_output_checks_shape() {
        let (handle, resolver) = handle_with("arn");
        let arn = handle.string_output("arn").unwrap();
        resolver.resolve(Value::Int(1));
        assert!(matches!(arn.resolution(), Resolution::Failed(_)));
    }

    #[test]
    fn nested_string_output_reads_key() {
        let (handle, resolver) = handle_with("metadata");
        let name = handle.nested_string_output("metadata", "name").unwrap();
        resolver.resolve(Value::map([("name", "aws-lb-controller")]));
        assert_eq!(
            name.resolution(),
            Resolution::Ready("aws-lb-controller".to_string())
        );
    }

    #[test]
    fn string_list_output() {
        let (handle, resolver) = handle_with("subnets");
        let subnets = handle.string_list_output("subnets").unwrap();
        resolver.resolve(Value::List(vec![Value::from("a"), Value::from("b")]));
        assert_eq!(
            subnets.resolution(),
            Resolution::Ready(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn options_builder_records_relations() {
        let (parent, _) = handle_with("id");
        let options = ResourceOptions::new()
            .with_parent(&parent)
            .with_provider(&parent)
            .depends_on(&parent)
            .with_transformation(Transformation::new("noop", |_, _| false));
        assert_eq!(options.parent.as_ref(), Some(parent.id()));
        assert_eq!(options.provider.as_ref(), Some(parent.id()));
        assert_eq!(options.depends_on.len(), 1);
        assert_eq!(options.transformations[0].name(), "noop");
    }
}
