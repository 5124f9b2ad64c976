//! Object metadata shared by every Kubernetes descriptor

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use strata_core::error::ConfigurationError;
use strata_core::resource::Value;

static DNS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("DNS label pattern is valid")
});

const MAX_NAME_LENGTH: usize = 63;

/// Check an RFC 1123 label as used for namespace and object names
pub fn validate_dns_label(name: &str) -> Result<(), String> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(format!(
            "'{}' is longer than {} characters",
            name, MAX_NAME_LENGTH
        ));
    }
    if !DNS_LABEL.is_match(name) {
        return Err(format!(
            "'{}' must consist of lowercase alphanumerics or '-', and start and end with an alphanumeric",
            name
        ));
    }
    Ok(())
}

/// `metadata` of a Kubernetes object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMeta {
    name: String,
    namespace: Option<Value>,
    labels: BTreeMap<String, String>,
    annotations: BTreeMap<String, Value>,
}

impl ObjectMeta {
    pub fn named(name: impl Into<String>) -> Result<Self, ConfigurationError> {
        let name = name.into();
        validate_dns_label(&name).map_err(|msg| ConfigurationError::invalid("metadata.name", msg))?;
        Ok(Self {
            name,
            namespace: None,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        })
    }

    /// Place the object in a namespace; usually a namespace's deferred name
    pub fn in_namespace(mut self, namespace: impl Into<Value>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn to_value(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::from(self.name.as_str()));
        if let Some(namespace) = &self.namespace {
            map.insert("namespace".to_string(), namespace.clone());
        }
        if !self.labels.is_empty() {
            map.insert("labels".to_string(), Value::from(self.labels.clone()));
        }
        if !self.annotations.is_empty() {
            map.insert("annotations".to_string(), Value::Map(self.annotations.clone()));
        }
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns_labels() {
        assert!(validate_dns_label("aws-lb-controller").is_ok());
        assert!(validate_dns_label("a").is_ok());
        assert!(validate_dns_label("AWS").is_err());
        assert!(validate_dns_label("-leading").is_err());
        assert!(validate_dns_label("trailing-").is_err());
        assert!(validate_dns_label("with.dot").is_err());
        assert!(validate_dns_label(&"a".repeat(64)).is_err());
    }

    #[test]
    fn invalid_name_is_configuration_error() {
        let err = ObjectMeta::named("Bad_Name").unwrap_err();
        assert!(err.to_string().contains("metadata.name"));
    }

    #[test]
    fn renders_only_present_fields() {
        let meta = ObjectMeta::named("aws-lb-controller")
            .unwrap()
            .with_label("app.kubernetes.io/name", "aws-load-balancer-controller");
        assert_eq!(
            meta.to_value(),
            Value::map([
                ("name", Value::from("aws-lb-controller")),
                (
                    "labels",
                    Value::map([("app.kubernetes.io/name", "aws-load-balancer-controller")]),
                ),
            ])
        );
    }
}
