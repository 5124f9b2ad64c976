//! Transformation hooks for Kubernetes manifests

use strata_core::transform::Transformation;

use crate::schemas::CRD_TYPE;

pub const CRD_STATUS_PATH: &str = "spec.versions[*].subresources.status";

/// Drop the status subresource from every version of a CustomResourceDefinition
///
/// Other resource types pass through untouched.
pub fn remove_crd_status() -> Transformation {
    Transformation::remove_for_type("remove-crd-status", CRD_TYPE, CRD_STATUS_PATH)
}
