//! Error - Failures that abort a definition pass

use std::path::PathBuf;

use thiserror::Error;

use crate::resource::ResourceId;
use crate::schema::TypeError;

/// A required or supplied configuration value is absent or invalid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Expected '{field}' to be defined, but received None")]
    Undefined { field: String },

    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl ConfigurationError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A deferred value could not be resolved because its producer failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{upstream} failed to resolve: {reason}")]
pub struct UpstreamResolutionError {
    /// Resource (or resources) the failed value comes from
    pub upstream: String,
    pub reason: String,
}

impl UpstreamResolutionError {
    pub fn new(upstream: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            upstream: upstream.into(),
            reason: reason.into(),
        }
    }
}

/// Rejected registration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    #[error("Resource {0} is already registered")]
    Duplicate(ResourceId),

    #[error("[{resource}] No provider handles resource type '{}'", resource.resource_type)]
    UnknownType { resource: ResourceId },

    #[error("[{resource}] {relation} {target} is not registered")]
    UnknownRelation {
        resource: ResourceId,
        relation: &'static str,
        target: ResourceId,
    },

    #[error("[{resource}] {}", errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Invalid {
        resource: ResourceId,
        errors: Vec<TypeError>,
    },

    #[error("Resource {0} is not registered")]
    NotRegistered(ResourceId),

    #[error("[{resource}] Resource type declares no output '{output}'")]
    UnknownOutput { resource: ResourceId, output: String },

    #[error("Output '{0}' is already exported")]
    DuplicateExport(String),
}

/// Any failure of the definition pass
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("[{resource}] {source}")]
    UpstreamResolution {
        resource: ResourceId,
        #[source]
        source: UpstreamResolutionError,
    },

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

pub type DefinitionResult<T> = Result<T, DefinitionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_names_the_field() {
        let err = ConfigurationError::Undefined {
            field: "cluster.oidc_provider.arn".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Expected 'cluster.oidc_provider.arn' to be defined, but received None"
        );
    }

    #[test]
    fn upstream_error_names_consumer_and_producer() {
        let err = DefinitionError::UpstreamResolution {
            resource: ResourceId::new("iam.role", "controller"),
            source: UpstreamResolutionError::new("eks.cluster.demo", "timed out"),
        };
        assert_eq!(
            err.to_string(),
            "[iam.role.controller] eks.cluster.demo failed to resolve: timed out"
        );
    }

    #[test]
    fn file_read_names_the_path() {
        let err = DefinitionError::FileRead {
            path: PathBuf::from("iam_policy.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("iam_policy.json"));
    }
}
