//! Named sets of legal parameter labels.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::logging::debug;

/// The legal labels for one binding call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSchema {
    name: String,
    params: HashSet<String>,
}

impl ParamSchema {
    pub fn new<'p>(name: &str, params: impl IntoIterator<Item = &'p str>) -> Self {
        Self {
            name: name.to_string(),
            params: params.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allows(&self, label: &str) -> bool {
        self.params.contains(label)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Schemas by name. Registration replaces; nothing is ever removed.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<ParamSchema>>>,
}

impl SchemaRegistry {
    pub fn register<'p>(&self, name: &str, params: impl IntoIterator<Item = &'p str>) {
        let schema = ParamSchema::new(name, params);
        debug!(schema = name, params = schema.len(), "registering param schema");
        self.schemas
            .write()
            .insert(name.to_string(), Arc::new(schema));
    }

    pub fn get(&self, name: &str) -> Option<Arc<ParamSchema>> {
        self.schemas.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = SchemaRegistry::default();
        registry.register("Doc::new_PARAMS", ["name", "count"]);
        let schema = registry.get("Doc::new_PARAMS").unwrap();
        assert!(schema.allows("name"));
        assert!(!schema.allows("colour"));
        assert_eq!(schema.name(), "Doc::new_PARAMS");
        assert!(registry.get("Other::PARAMS").is_none());
    }
}
