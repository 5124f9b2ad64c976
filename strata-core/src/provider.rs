//! Provider - Trait describing the resource types a provider accepts
//!
//! A Provider groups the resource types of one platform (AWS, Kubernetes).
//! Creating, updating and deleting those resources is the engine's job; the
//! definition pass only needs each type's schema and its output attributes.

use crate::schema::ResourceSchema;

/// Definition of resource types that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Resource type token (e.g., "s3.bucket")
    fn name(&self) -> &'static str;

    /// Attribute and output schema for this resource type
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.name())
    }
}

/// Main Provider trait
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "aws")
    fn name(&self) -> &'static str;

    /// List of resource types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Schema for a resource type token, if this provider handles it
    ///
    /// Providers whose type space is open-ended (rendered manifests) override
    /// this instead of enumerating every type.
    fn schema_for(&self, resource_type: &str) -> Option<ResourceSchema> {
        self.resource_types()
            .into_iter()
            .find(|t| t.name() == resource_type)
            .map(|t| t.schema())
    }
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).resource_types()
    }

    fn schema_for(&self, resource_type: &str) -> Option<ResourceSchema> {
        (**self).schema_for(resource_type)
    }
}
