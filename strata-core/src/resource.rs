//! Resource - Descriptors handed to the registry and their property trees

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::output::{Output, Resolution};

/// Unique identifier for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceId {
    /// Resource type token (e.g., "ec2.vpc", "kubernetes:core/v1:Namespace")
    pub resource_type: String,
    /// Logical name given by the stack definition
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// Property value of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Value produced by another resource, known only after it is materialized
    Deferred(Output<Value>),
}

impl Value {
    /// Build a map from key/value pairs
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key of a map value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Resources referenced by deferred leaves anywhere in this tree
    pub fn dependencies(&self) -> BTreeSet<ResourceId> {
        let mut deps = BTreeSet::new();
        self.collect_dependencies(&mut deps);
        deps
    }

    fn collect_dependencies(&self, deps: &mut BTreeSet<ResourceId>) {
        match self {
            Value::Deferred(output) => deps.extend(output.dependencies().iter().cloned()),
            Value::List(items) => {
                for item in items {
                    item.collect_dependencies(deps);
                }
            }
            Value::Map(map) => {
                for value in map.values() {
                    value.collect_dependencies(deps);
                }
            }
            _ => {}
        }
    }

    /// Whether any deferred leaf is secret
    pub fn contains_secret(&self) -> bool {
        match self {
            Value::Deferred(output) => output.is_secret(),
            Value::List(items) => items.iter().any(Value::contains_secret),
            Value::Map(map) => map.values().any(Value::contains_secret),
            _ => false,
        }
    }

    /// Resolve every deferred leaf and convert to JSON
    ///
    /// Failed leaves win over pending ones so that a broken upstream is
    /// reported even while other inputs are still outstanding.
    pub fn to_json(&self) -> Resolution<serde_json::Value> {
        match self {
            Value::Null => Resolution::Ready(serde_json::Value::Null),
            Value::String(s) => Resolution::Ready(serde_json::Value::String(s.clone())),
            Value::Int(n) => Resolution::Ready(serde_json::Value::from(*n)),
            Value::Float(n) => Resolution::Ready(serde_json::Value::from(*n)),
            Value::Bool(b) => Resolution::Ready(serde_json::Value::Bool(*b)),
            Value::List(items) => {
                let mut pending = false;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item.to_json() {
                        Resolution::Ready(v) => out.push(v),
                        Resolution::Pending => pending = true,
                        Resolution::Failed(e) => return Resolution::Failed(e),
                    }
                }
                if pending {
                    Resolution::Pending
                } else {
                    Resolution::Ready(serde_json::Value::Array(out))
                }
            }
            Value::Map(map) => {
                let mut pending = false;
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    match v.to_json() {
                        Resolution::Ready(v) => {
                            out.insert(k.clone(), v);
                        }
                        Resolution::Pending => pending = true,
                        Resolution::Failed(e) => return Resolution::Failed(e),
                    }
                }
                if pending {
                    Resolution::Pending
                } else {
                    Resolution::Ready(serde_json::Value::Object(out))
                }
            }
            Value::Deferred(output) => match output.resolution() {
                Resolution::Ready(v) => v.to_json(),
                Resolution::Pending => Resolution::Pending,
                Resolution::Failed(e) => Resolution::Failed(e),
            },
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, String>> for Value {
    fn from(map: BTreeMap<String, String>) -> Self {
        Value::map(map)
    }
}

impl From<Output<Value>> for Value {
    fn from(output: Output<Value>) -> Self {
        Value::Deferred(output)
    }
}

impl From<Output<String>> for Value {
    fn from(output: Output<String>) -> Self {
        Value::Deferred(output.apply(Value::String))
    }
}

impl From<Output<Vec<String>>> for Value {
    fn from(output: Output<Vec<String>>) -> Self {
        Value::Deferred(
            output.apply(|items| Value::List(items.into_iter().map(Value::String).collect())),
        )
    }
}

/// Desired state of a single resource
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub attributes: BTreeMap<String, Value>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(resource_type, name),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Resources this resource's properties reference
    pub fn dependencies(&self) -> BTreeSet<ResourceId> {
        self.attributes
            .values()
            .flat_map(|v| v.dependencies())
            .collect()
    }

    /// Resolve the whole property bag to JSON
    pub fn properties_json(&self) -> Resolution<serde_json::Value> {
        Value::Map(self.attributes.clone()).to_json()
    }
}
