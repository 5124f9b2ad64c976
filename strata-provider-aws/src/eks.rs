//! EKS - Managed Kubernetes cluster descriptor
//!
//! Registers the control plane with its default node group and, when asked,
//! the IAM OIDC identity provider that lets service accounts assume roles.

use log::debug;
use strata_core::error::{ConfigurationError, DefinitionResult};
use strata_core::output::Output;
use strata_core::registry::{RegisteredResource, Registry, ResourceOptions};
use strata_core::resource::{Resource, Value};

use crate::schemas::eks::{CLUSTER_TYPE, OIDC_PROVIDER_TYPE, node_group_schema};

/// Audience used by service-account tokens exchanged with STS
pub const STS_AUDIENCE: &str = "sts.amazonaws.com";

/// Sizing of the cluster's default node group
///
/// Construction enforces `min_size <= desired_capacity <= max_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroupSpec {
    desired_capacity: u32,
    min_size: u32,
    max_size: u32,
    instance_type: String,
}

impl NodeGroupSpec {
    pub fn new(
        desired_capacity: u32,
        min_size: u32,
        max_size: u32,
        instance_type: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        if max_size == 0 {
            return Err(ConfigurationError::invalid(
                "node_group.max_size",
                "must be at least 1",
            ));
        }
        if min_size > max_size {
            return Err(ConfigurationError::invalid(
                "node_group.min_size",
                format!("min_size {} exceeds max_size {}", min_size, max_size),
            ));
        }
        if desired_capacity < min_size || desired_capacity > max_size {
            return Err(ConfigurationError::invalid(
                "node_group.desired_capacity",
                format!(
                    "desired_capacity {} is outside [{}, {}]",
                    desired_capacity, min_size, max_size
                ),
            ));
        }
        let instance_type = instance_type.into();
        crate::schemas::types::validate_instance_type(&instance_type)
            .map_err(|msg| ConfigurationError::invalid("node_group.instance_type", msg))?;

        Ok(Self {
            desired_capacity,
            min_size,
            max_size,
            instance_type,
        })
    }

    pub fn desired_capacity(&self) -> u32 {
        self.desired_capacity
    }

    pub fn min_size(&self) -> u32 {
        self.min_size
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn instance_type(&self) -> &str {
        &self.instance_type
    }

    fn to_value(&self) -> Value {
        Value::map([
            ("desired_capacity", Value::from(self.desired_capacity)),
            ("min_size", Value::from(self.min_size)),
            ("max_size", Value::from(self.max_size)),
            ("instance_type", Value::from(self.instance_type.as_str())),
        ])
    }
}

/// Desired cluster
#[derive(Debug, Clone)]
pub struct ClusterSpec {
    pub vpc_id: Output<String>,
    pub public_subnet_ids: Output<Vec<String>>,
    pub node_group: NodeGroupSpec,
    pub create_oidc_provider: bool,
}

/// IAM OIDC identity provider created for a cluster
#[derive(Debug, Clone)]
pub struct OidcProvider {
    pub resource: RegisteredResource,
    pub arn: Output<String>,
    /// Issuer URL without scheme (e.g., "oidc.eks.us-east-1.amazonaws.com/id/EXAMPLE")
    pub url: Output<String>,
}

/// A registered EKS cluster
#[derive(Debug, Clone)]
pub struct EksCluster {
    pub resource: RegisteredResource,
    pub name: Output<String>,
    /// Secret by schema
    pub kubeconfig: Output<Value>,
    pub oidc_issuer: Output<String>,
    /// Present only when `create_oidc_provider` was set
    pub oidc_provider: Option<OidcProvider>,
}

impl EksCluster {
    pub fn new(
        registry: &mut dyn Registry,
        name: &str,
        spec: &ClusterSpec,
    ) -> DefinitionResult<Self> {
        let node_group = spec.node_group.to_value();
        if let Some(map) = node_group.as_map()
            && let Err(errors) = node_group_schema().validate(map)
        {
            let message = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ConfigurationError::invalid("node_group", message).into());
        }

        let resource = registry.register(
            Resource::new(CLUSTER_TYPE, name)
                .with_attribute("vpc_id", spec.vpc_id.clone())
                .with_attribute("public_subnet_ids", spec.public_subnet_ids.clone())
                .with_attribute("node_group", node_group)
                .with_attribute("create_oidc_provider", spec.create_oidc_provider),
            ResourceOptions::new(),
        )?;

        let oidc_issuer = resource.string_output("oidc_issuer")?;
        let oidc_provider = if spec.create_oidc_provider {
            Some(Self::register_oidc_provider(
                registry,
                name,
                &resource,
                &oidc_issuer,
            )?)
        } else {
            None
        };

        Ok(Self {
            name: resource.string_output("name")?,
            kubeconfig: resource.output("kubeconfig")?,
            oidc_issuer,
            oidc_provider,
            resource,
        })
    }

    fn register_oidc_provider(
        registry: &mut dyn Registry,
        cluster_name: &str,
        cluster: &RegisteredResource,
        issuer: &Output<String>,
    ) -> DefinitionResult<OidcProvider> {
        debug!("registering OIDC provider for cluster {}", cluster_name);
        let resource = registry.register(
            Resource::new(OIDC_PROVIDER_TYPE, format!("{}-oidcProvider", cluster_name))
                .with_attribute("url", issuer.clone())
                .with_attribute("client_id_list", Value::List(vec![Value::from(STS_AUDIENCE)])),
            ResourceOptions::new().with_parent(cluster),
        )?;
        Ok(OidcProvider {
            arn: resource.string_output("arn")?,
            url: resource
                .string_output("url")?
                .apply(|url| url.trim_start_matches("https://").to_string()),
            resource,
        })
    }
}
