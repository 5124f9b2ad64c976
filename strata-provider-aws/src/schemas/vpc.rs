//! VPC resource schema definitions

use strata_core::schema::{AttributeSchema, ResourceSchema, types};

use super::types as aws_types;

pub const VPC_TYPE: &str = "ec2.vpc";

/// Returns the schema for a VPC with its public/private subnet layout
pub fn vpc_schema() -> ResourceSchema {
    ResourceSchema::new(VPC_TYPE)
        .with_description("A VPC with one public and one private subnet per availability zone")
        .attribute(
            AttributeSchema::new("cidr_block", aws_types::private_cidr())
                .required()
                .with_description("The IPv4 network range for the VPC, in CIDR notation"),
        )
        .attribute(
            AttributeSchema::new("number_of_availability_zones", types::positive_int())
                .with_description("Number of availability zones to spread subnets across"),
        )
        .attribute(
            AttributeSchema::new("tags", types::string_map())
                .with_description("Tags applied to the VPC"),
        )
        .output("vpc_id")
        .output("public_subnet_ids")
        .output("private_subnet_ids")
}

/// Returns all VPC-related schemas
pub fn schemas() -> Vec<ResourceSchema> {
    vec![vpc_schema()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use strata_core::resource::Value;

    #[test]
    fn valid_vpc() {
        let schema = vpc_schema();
        let mut attrs = BTreeMap::new();
        attrs.insert("cidr_block".to_string(), Value::from("10.0.0.0/16"));
        attrs.insert("number_of_availability_zones".to_string(), Value::Int(2));
        attrs.insert("tags".to_string(), Value::map([("Name", "demo")]));

        assert!(schema.validate(&attrs).is_ok());
    }

    #[test]
    fn public_cidr_is_rejected() {
        let schema = vpc_schema();
        let mut attrs = BTreeMap::new();
        attrs.insert("cidr_block".to_string(), Value::from("54.0.0.0/16"));

        assert!(schema.validate(&attrs).is_err());
    }

    #[test]
    fn cidr_is_required() {
        assert!(vpc_schema().validate(&BTreeMap::new()).is_err());
    }
}
