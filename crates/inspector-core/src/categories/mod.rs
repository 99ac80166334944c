//! Built-in item categories and the registry that selects them by name

mod cookbooks;
mod data_bags;
mod document;

use std::collections::BTreeMap;
use std::sync::Arc;

use inspector_fs::DefinitionLoader;

pub use cookbooks::CookbookValidator;
pub use data_bags::{DataBagItemValidator, DataBagValidator};
pub use document::DocumentValidator;

use crate::config::CategoryPaths;
use crate::remote::RemoteStore;
use crate::validator::Validator;
use crate::{Error, Result};

/// Everything a category needs to load both sides of its items
#[derive(Clone)]
pub struct CategoryContext {
    pub remote: Arc<dyn RemoteStore>,
    pub loader: DefinitionLoader,
    pub paths: CategoryPaths,
}

impl CategoryContext {
    pub fn new(remote: Arc<dyn RemoteStore>, paths: CategoryPaths) -> Self {
        Self {
            remote,
            loader: DefinitionLoader::new(),
            paths,
        }
    }
}

/// Category names in the order `all` runs them
pub const BUILTIN_CATEGORIES: &[&str] = &[
    "cookbooks",
    "data-bags",
    "data-bag-items",
    "environments",
    "roles",
];

/// Registry of checklist validators keyed by category name.
pub struct CategoryRegistry {
    order: Vec<String>,
    validators: BTreeMap<String, Arc<dyn Validator>>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            validators: BTreeMap::new(),
        }
    }

    /// Registry with every built-in category.
    pub fn with_builtins(context: &CategoryContext) -> Self {
        let mut registry = Self::new();
        registry.register("cookbooks", Arc::new(CookbookValidator::new(context.clone())));
        registry.register("data-bags", Arc::new(DataBagValidator::new(context.clone())));
        registry.register(
            "data-bag-items",
            Arc::new(DataBagItemValidator::new(context.clone())),
        );
        registry.register(
            "environments",
            Arc::new(DocumentValidator::environments(context.clone())),
        );
        registry.register("roles", Arc::new(DocumentValidator::roles(context.clone())));
        registry
    }

    /// Register a validator; re-registering a name replaces it in place.
    pub fn register(&mut self, name: impl Into<String>, validator: Arc<dyn Validator>) {
        let name = name.into();
        if !self.validators.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.validators.insert(name, validator);
    }

    /// Look up a category by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Validator>> {
        self.validators
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownCategory {
                name: name.to_string(),
                available: self.order.join(", "),
            })
    }

    /// Registered names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
