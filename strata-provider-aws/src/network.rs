//! Network - VPC descriptor

use std::collections::BTreeMap;

use strata_core::error::DefinitionResult;
use strata_core::output::Output;
use strata_core::registry::{RegisteredResource, Registry, ResourceOptions};
use strata_core::resource::Resource;

use crate::schemas::vpc::VPC_TYPE;

/// Default number of availability zones the subnets are spread across
pub const DEFAULT_AVAILABILITY_ZONES: u32 = 2;

/// Desired VPC layout
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSpec {
    pub cidr_block: String,
    pub tags: BTreeMap<String, String>,
    pub availability_zones: u32,
}

impl NetworkSpec {
    pub fn new(cidr_block: impl Into<String>) -> Self {
        Self {
            cidr_block: cidr_block.into(),
            tags: BTreeMap::new(),
            availability_zones: DEFAULT_AVAILABILITY_ZONES,
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    fn to_resource(&self, name: &str) -> Resource {
        Resource::new(VPC_TYPE, name)
            .with_attribute("cidr_block", self.cidr_block.as_str())
            .with_attribute("number_of_availability_zones", self.availability_zones)
            .with_attribute("tags", self.tags.clone())
    }
}

/// A registered VPC
#[derive(Debug, Clone)]
pub struct Vpc {
    pub resource: RegisteredResource,
    pub vpc_id: Output<String>,
    pub public_subnet_ids: Output<Vec<String>>,
    pub private_subnet_ids: Output<Vec<String>>,
}

impl Vpc {
    pub fn new(
        registry: &mut dyn Registry,
        name: &str,
        spec: &NetworkSpec,
    ) -> DefinitionResult<Self> {
        let resource = registry.register(spec.to_resource(name), ResourceOptions::new())?;
        Ok(Self {
            vpc_id: resource.string_output("vpc_id")?,
            public_subnet_ids: resource.string_list_output("public_subnet_ids")?,
            private_subnet_ids: resource.string_list_output("private_subnet_ids")?,
            resource,
        })
    }
}
