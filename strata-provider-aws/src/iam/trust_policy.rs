//! Trust policy for IAM Roles for Service Accounts
//!
//! A role assumable through the cluster's OIDC identity provider, restricted
//! to exactly one Kubernetes service account via the `<issuer>:sub` claim.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use strata_core::output::Output;

pub const POLICY_VERSION: &str = "2012-10-17";
pub const ASSUME_ROLE_WITH_WEB_IDENTITY: &str = "sts:AssumeRoleWithWebIdentity";

/// Identity a projected service-account token presents as its `sub` claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccountIdentity {
    pub namespace: String,
    pub name: String,
}

impl ServiceAccountIdentity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ServiceAccountIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system:serviceaccount:{}:{}", self.namespace, self.name)
    }
}

/// Condition key for the subject claim of tokens issued by `oidc_url`
///
/// IAM keys conditions on the bare issuer, so a leading scheme is dropped.
pub fn oidc_condition_key(oidc_url: &str) -> String {
    format!("{}:sub", oidc_url.trim_start_matches("https://"))
}

/// The `StringEquals` map with a single subject entry
pub fn string_equals_condition(
    oidc_url: &str,
    identity: &ServiceAccountIdentity,
) -> BTreeMap<String, String> {
    BTreeMap::from([(oidc_condition_key(oidc_url), identity.to_string())])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrustPolicy {
    pub version: String,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: String,
    pub principal: Principal,
    pub action: String,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    pub federated: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Condition {
    pub string_equals: BTreeMap<String, String>,
}

impl TrustPolicy {
    /// Allow `identity` to assume the role through the provider `oidc_arn`
    pub fn for_service_account(
        oidc_arn: &str,
        oidc_url: &str,
        identity: &ServiceAccountIdentity,
    ) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: vec![Statement {
                effect: "Allow".to_string(),
                principal: Principal {
                    federated: oidc_arn.to_string(),
                },
                action: ASSUME_ROLE_WITH_WEB_IDENTITY.to_string(),
                condition: Condition {
                    string_equals: string_equals_condition(oidc_url, identity),
                },
            }],
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Trust policy JSON that resolves once the provider ARN and URL are known
pub fn trust_policy_output(
    oidc_arn: &Output<String>,
    oidc_url: &Output<String>,
    identity: ServiceAccountIdentity,
) -> Output<String> {
    Output::all([oidc_arn.clone(), oidc_url.clone()]).try_apply(move |parts| match parts.as_slice() {
        [arn, url] => TrustPolicy::for_service_account(arn, url, &identity)
            .to_json()
            .map_err(|e| e.to_string()),
        _ => Err(format!("expected OIDC arn and url, got {} values", parts.len())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::output::Resolution;
    use strata_core::resource::ResourceId;

    const ARN: &str =
        "arn:aws:iam::123456789012:oidc-provider/oidc.eks.us-east-1.amazonaws.com/id/EXAMPLE";
    const URL: &str = "oidc.eks.us-east-1.amazonaws.com/id/EXAMPLE";

    fn controller() -> ServiceAccountIdentity {
        ServiceAccountIdentity::new("aws-lb-controller", "aws-lb-controller-serviceaccount")
    }

    #[test]
    fn identity_string() {
        assert_eq!(
            controller().to_string(),
            "system:serviceaccount:aws-lb-controller:aws-lb-controller-serviceaccount"
        );
    }

    #[test]
    fn condition_key_keeps_bare_issuer() {
        assert_eq!(
            oidc_condition_key("oidc.eks.eu-west-1.amazonaws.com/id/ABC"),
            "oidc.eks.eu-west-1.amazonaws.com/id/ABC:sub"
        );
    }

    #[test]
    fn condition_key_strips_scheme() {
        assert_eq!(
            oidc_condition_key(&format!("https://{}", URL)),
            format!("{}:sub", URL)
        );
    }

    #[test]
    fn condition_map_has_single_subject_entry() {
        let condition = string_equals_condition(URL, &controller());
        assert_eq!(
            condition,
            BTreeMap::from([(
                "oidc.eks.us-east-1.amazonaws.com/id/EXAMPLE:sub".to_string(),
                "system:serviceaccount:aws-lb-controller:aws-lb-controller-serviceaccount"
                    .to_string()
            )])
        );
    }

    #[test]
    fn document_serializes_exactly() {
        let policy = TrustPolicy::for_service_account(ARN, URL, &controller());
        assert_eq!(
            policy.to_json().unwrap(),
            concat!(
                r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","#,
                r#""Principal":{"Federated":"arn:aws:iam::123456789012:oidc-provider/oidc.eks.us-east-1.amazonaws.com/id/EXAMPLE"},"#,
                r#""Action":"sts:AssumeRoleWithWebIdentity","#,
                r#""Condition":{"StringEquals":{"oidc.eks.us-east-1.amazonaws.com/id/EXAMPLE:sub":"#,
                r#""system:serviceaccount:aws-lb-controller:aws-lb-controller-serviceaccount"}}}]}"#
            )
        );
    }

    #[test]
    fn deferred_document_waits_for_both_inputs() {
        let (arn, resolve_arn) = Output::<String>::unresolved(ResourceId::new("oidc", "arn"));
        let (url, resolve_url) = Output::<String>::unresolved(ResourceId::new("oidc", "url"));
        let policy = trust_policy_output(&arn, &url, controller());

        resolve_arn.resolve(ARN.to_string());
        assert!(policy.resolution().is_pending());

        resolve_url.resolve(URL.to_string());
        let json: serde_json::Value =
            serde_json::from_str(&policy.resolution().ready().unwrap()).unwrap();
        assert_eq!(json["Statement"][0]["Principal"]["Federated"], ARN);
        assert_eq!(
            json["Statement"][0]["Condition"]["StringEquals"][format!("{}:sub", URL)],
            "system:serviceaccount:aws-lb-controller:aws-lb-controller-serviceaccount"
        );
        assert_eq!(policy.dependencies().len(), 2);
    }

    #[test]
    fn deferred_document_fails_with_issuer() {
        let (arn, resolve_arn) = Output::<String>::unresolved(ResourceId::new("oidc", "arn"));
        let url = Output::known(URL.to_string());
        let policy = trust_policy_output(&arn, &url, controller());

        resolve_arn.fail("provider rejected");
        assert!(matches!(policy.resolution(), Resolution::Failed(_)));
    }
}
