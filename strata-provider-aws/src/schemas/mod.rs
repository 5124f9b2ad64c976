//! AWS resource schema definitions

pub mod eks;
pub mod iam;
pub mod s3;
pub mod types;
pub mod vpc;

use strata_core::schema::ResourceSchema;

/// Returns all AWS schemas
pub fn all_schemas() -> Vec<ResourceSchema> {
    let mut schemas = Vec::new();
    schemas.extend(vpc::schemas());
    schemas.extend(eks::schemas());
    schemas.extend(iam::schemas());
    schemas.extend(s3::schemas());
    schemas
}
