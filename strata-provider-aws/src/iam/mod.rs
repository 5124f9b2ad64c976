//! IAM - Roles, managed policies and their attachments

pub mod policy_document;
pub mod trust_policy;

use log::debug;
use strata_core::error::DefinitionResult;
use strata_core::output::Output;
use strata_core::registry::{RegisteredResource, Registry, ResourceOptions};
use strata_core::resource::{Resource, Value};

pub use policy_document::PolicyDocument;
pub use trust_policy::{ServiceAccountIdentity, TrustPolicy, trust_policy_output};

use crate::eks::OidcProvider;
use crate::schemas::iam::{POLICY_ATTACHMENT_TYPE, POLICY_TYPE, ROLE_TYPE};

/// A registered IAM role
#[derive(Debug, Clone)]
pub struct Role {
    pub resource: RegisteredResource,
    pub arn: Output<String>,
    pub name: Output<String>,
}

impl Role {
    pub fn new(
        registry: &mut dyn Registry,
        name: &str,
        assume_role_policy: Output<String>,
        description: Option<&str>,
    ) -> DefinitionResult<Self> {
        let mut resource =
            Resource::new(ROLE_TYPE, name).with_attribute("assume_role_policy", assume_role_policy);
        if let Some(description) = description {
            resource = resource.with_attribute("description", description);
        }
        let resource = registry.register(resource, ResourceOptions::new())?;
        Ok(Self {
            arn: resource.string_output("arn")?,
            name: resource.string_output("name")?,
            resource,
        })
    }

    /// Role assumable only by `identity` through the cluster's OIDC provider
    pub fn for_service_account(
        registry: &mut dyn Registry,
        name: &str,
        oidc_provider: &OidcProvider,
        identity: ServiceAccountIdentity,
    ) -> DefinitionResult<Self> {
        debug!("role {} trusts {}", name, identity);
        let description = format!("Assumed by {}", identity);
        let policy = trust_policy_output(&oidc_provider.arn, &oidc_provider.url, identity);
        Self::new(registry, name, policy, Some(&description))
    }
}

/// A customer managed policy owned by a role
#[derive(Debug, Clone)]
pub struct Policy {
    pub resource: RegisteredResource,
    pub arn: Output<String>,
}

impl Policy {
    pub fn new(
        registry: &mut dyn Registry,
        name: &str,
        document: &PolicyDocument,
        owner: &Role,
    ) -> DefinitionResult<Self> {
        let resource = registry.register(
            Resource::new(POLICY_TYPE, name).with_attribute("policy", document.as_str()),
            ResourceOptions::new().with_parent(&owner.resource),
        )?;
        Ok(Self {
            arn: resource.string_output("arn")?,
            resource,
        })
    }
}

/// Binding of a managed policy to a role
#[derive(Debug, Clone)]
pub struct PolicyAttachment {
    pub resource: RegisteredResource,
}

impl PolicyAttachment {
    pub fn new(
        registry: &mut dyn Registry,
        name: &str,
        policy: &Policy,
        role: &Role,
    ) -> DefinitionResult<Self> {
        let resource = registry.register(
            Resource::new(POLICY_ATTACHMENT_TYPE, name)
                .with_attribute("policy_arn", policy.arn.clone())
                .with_attribute("roles", Value::List(vec![Value::from(role.name.clone())])),
            ResourceOptions::new().with_parent(&role.resource),
        )?;
        Ok(Self { resource })
    }
}
