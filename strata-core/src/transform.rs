//! Transform - Hooks that rewrite property trees at registration time
//!
//! A transformation receives the resource type token and the mutable
//! property tree of every resource it is attached to (and of that resource's
//! descendants). Hooks must be pure and idempotent: the registry applies them
//! once per resource, but applying one twice must not change the result.

use std::fmt;
use std::sync::Arc;

use crate::resource::Value;

/// One step of a property path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Map key
    Key(String),
    /// Every element of a list
    Each,
}

/// Parse a dotted path such as `spec.versions[*].subresources.status`
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    for part in path.split('.').filter(|p| !p.is_empty()) {
        let mut key = part;
        let mut wildcards = 0;
        while let Some(stripped) = key.strip_suffix("[*]") {
            key = stripped;
            wildcards += 1;
        }
        if !key.is_empty() {
            segments.push(PathSegment::Key(key.to_string()));
        }
        segments.extend(std::iter::repeat_n(PathSegment::Each, wildcards));
    }
    segments
}

/// Remove the node at `path`; returns true if anything was removed
///
/// Missing intermediate nodes, non-container nodes and deferred leaves make
/// this a no-op.
pub fn remove_path(value: &mut Value, path: &[PathSegment]) -> bool {
    match path {
        [] => false,
        [PathSegment::Key(key)] => match value {
            Value::Map(map) => map.remove(key).is_some(),
            _ => false,
        },
        [PathSegment::Each] => match value {
            Value::List(items) => {
                let removed = !items.is_empty();
                items.clear();
                removed
            }
            _ => false,
        },
        [PathSegment::Key(key), rest @ ..] => match value {
            Value::Map(map) => map
                .get_mut(key)
                .is_some_and(|child| remove_path(child, rest)),
            _ => false,
        },
        [PathSegment::Each, rest @ ..] => match value {
            Value::List(items) => items
                .iter_mut()
                .fold(false, |removed, item| remove_path(item, rest) || removed),
            _ => false,
        },
    }
}

type Hook = dyn Fn(&str, &mut Value) -> bool + Send + Sync;

/// Named resource transformation
#[derive(Clone)]
pub struct Transformation {
    name: String,
    hook: Arc<Hook>,
}

impl Transformation {
    /// Wrap a hook; it returns true when it changed the tree
    pub fn new<F>(name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&str, &mut Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            hook: Arc::new(hook),
        }
    }

    /// Remove `path` from resources whose type token equals `resource_type`
    pub fn remove_for_type(
        name: impl Into<String>,
        resource_type: impl Into<String>,
        path: &str,
    ) -> Self {
        let target = resource_type.into();
        let segments = parse_path(path);
        Self::new(name, move |ty, props| {
            ty == target && remove_path(props, &segments)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, resource_type: &str, props: &mut Value) -> bool {
        (self.hook)(resource_type, props)
    }
}

impl fmt::Debug for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformation")
            .field("name", &self.name)
            .finish()
    }
}
