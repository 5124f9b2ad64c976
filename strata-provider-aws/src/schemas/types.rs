//! AWS-specific type definitions

use std::sync::LazyLock;

use regex::Regex;
use strata_core::resource::Value;
use strata_core::schema::{AttributeType, validate_cidr};

/// Valid AWS regions (in AWS format with hyphens)
pub const VALID_REGIONS: &[&str] = &[
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-south-1",
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-central-1",
    "eu-north-1",
    "ca-central-1",
    "sa-east-1",
];

static INSTANCE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9-]*\.(nano|micro|small|medium|large|metal|[0-9]*xlarge)$")
        .expect("instance type pattern is valid")
});

/// Check a region name and return it in AWS format
///
/// Accepts the AWS form ("ap-northeast-1") and the underscore form ("ap_northeast_1").
pub fn validate_region(s: &str) -> Result<String, String> {
    let normalized = normalize_region(s);
    if VALID_REGIONS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(format!(
            "Invalid region '{}', expected one of: {}",
            s,
            VALID_REGIONS.join(", ")
        ))
    }
}

/// Normalize region string to AWS format (hyphens)
/// - "ap_northeast_1" -> "ap-northeast-1"
/// - "ap-northeast-1" -> "ap-northeast-1"
fn normalize_region(s: &str) -> String {
    s.trim().replace('_', "-")
}

/// EC2 instance type such as "t2.small" or "m5.2xlarge"
pub fn instance_type() -> AttributeType {
    AttributeType::Custom {
        name: "InstanceType".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => validate_instance_type(s),
            _ => Err("Expected string".to_string()),
        },
    }
}

pub fn validate_instance_type(s: &str) -> Result<(), String> {
    if INSTANCE_TYPE.is_match(s) {
        Ok(())
    } else {
        Err(format!(
            "Invalid instance type '{}': expected <family>.<size> such as t2.small",
            s
        ))
    }
}

/// CIDR block inside one of the RFC 1918 private ranges
pub fn private_cidr() -> AttributeType {
    AttributeType::Custom {
        name: "PrivateCidr".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => validate_private_cidr(s),
            _ => Err("Expected string".to_string()),
        },
    }
}

pub fn validate_private_cidr(cidr: &str) -> Result<(), String> {
    let (octets, prefix) = validate_cidr(cidr)?;
    let private = match octets {
        [10, ..] => prefix >= 8,
        [172, b, ..] if (16..=31).contains(&b) => prefix >= 12,
        [192, 168, ..] => prefix >= 16,
        _ => false,
    };
    if private {
        Ok(())
    } else {
        Err(format!(
            "CIDR '{}' is not inside a private range (10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16)",
            cidr
        ))
    }
}

/// Canned ACLs accepted for buckets
pub fn s3_acl() -> AttributeType {
    AttributeType::Enum(vec![
        "private".to_string(),
        "public-read".to_string(),
        "public-read-write".to_string(),
        "authenticated-read".to_string(),
    ])
}

/// IAM ARN (e.g., "arn:aws:iam::123456789012:role/name")
pub fn arn() -> AttributeType {
    AttributeType::Custom {
        name: "Arn".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) if s.starts_with("arn:") && s.split(':').count() >= 6 => Ok(()),
            Value::String(s) => Err(format!("Invalid ARN '{}'", s)),
            _ => Err("Expected string".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Region validation tests

    #[test]
    fn region_accepts_aws_format() {
        assert_eq!(validate_region("us-east-1"), Ok("us-east-1".to_string()));
    }

    #[test]
    fn region_accepts_underscore_format() {
        assert_eq!(validate_region("ap_northeast_1"), Ok("ap-northeast-1".to_string()));
    }

    #[test]
    fn region_rejects_invalid_region() {
        let err = validate_region("invalid-region").unwrap_err();
        assert!(err.contains("Invalid region"));
        assert!(err.contains("ap-northeast-1")); // Should suggest valid regions
    }

    #[test]
    fn region_rejects_availability_zone() {
        // us-east-1a is an AZ, not a region
        assert!(validate_region("us-east-1a").is_err());
    }

    #[test]
    fn region_validates_all_valid_regions() {
        for region in VALID_REGIONS {
            assert!(validate_region(region).is_ok(), "Region {} should be valid", region);
        }
    }

    #[test]
    fn instance_types() {
        assert!(validate_instance_type("t2.small").is_ok());
        assert!(validate_instance_type("m5.2xlarge").is_ok());
        assert!(validate_instance_type("c6gn.metal").is_ok());
        assert!(validate_instance_type("t2").is_err());
        assert!(validate_instance_type("small").is_err());
        assert!(validate_instance_type("T2.SMALL").is_err());
    }

    #[test]
    fn private_ranges() {
        assert!(validate_private_cidr("10.0.0.0/16").is_ok());
        assert!(validate_private_cidr("172.20.0.0/16").is_ok());
        assert!(validate_private_cidr("192.168.0.0/24").is_ok());
        assert!(validate_private_cidr("172.32.0.0/16").is_err());
        assert!(validate_private_cidr("8.8.8.0/24").is_err());
        assert!(validate_private_cidr("10.0.0.0/4").is_err()); // wider than 10/8
        assert!(validate_private_cidr("10.0.0.0").is_err());
    }

    #[test]
    fn arn_format() {
        let t = arn();
        assert!(
            t.validate(&Value::String(
                "arn:aws:iam::123456789012:oidc-provider/oidc.eks.us-east-1.amazonaws.com/id/EXAMPLE"
                    .to_string()
            ))
            .is_ok()
        );
        assert!(t.validate(&Value::String("role/name".to_string())).is_err());
    }

    #[test]
    fn acl_enum() {
        assert!(s3_acl().validate(&Value::String("private".to_string())).is_ok());
        assert!(s3_acl().validate(&Value::String("public".to_string())).is_err());
    }
}
