//! Whole-document comparison for roles and environments

use std::collections::BTreeSet;

use inspector_fs::NormalizedPath;
use serde_json::{Value, json};

use super::CategoryContext;
use crate::item::{DEFINED_IN_RUBY, MISSING_ON_SERVER};
use crate::validator::{Cancellation, Validator};
use crate::{Item, Result};

/// Compares a server document with the local definition of the same name.
///
/// Both sides are laid over the category's default document first, so a
/// local file that omits an empty attribute map still matches the fully
/// populated object the server returns.
///
/// Names defined only as Ruby DSL (`<name>.rb`) are listed locally but
/// reported as not compared.
pub struct DocumentValidator {
    title: String,
    collection: String,
    folder: NormalizedPath,
    defaults: Option<fn(&str) -> Value>,
    skip: Vec<String>,
    context: CategoryContext,
}

impl DocumentValidator {
    pub fn new(
        title: impl Into<String>,
        collection: impl Into<String>,
        folder: NormalizedPath,
        context: CategoryContext,
    ) -> Self {
        Self {
            title: title.into(),
            collection: collection.into(),
            folder,
            defaults: None,
            skip: Vec::new(),
            context,
        }
    }

    pub fn roles(context: CategoryContext) -> Self {
        let folder = context.paths.roles.clone();
        Self::new("Roles", "roles", folder, context).with_defaults(role_defaults)
    }

    pub fn environments(context: CategoryContext) -> Self {
        let folder = context.paths.environments.clone();
        Self::new("Environments", "environments", folder, context)
            .with_defaults(environment_defaults)
            .skipping("_default")
    }

    pub fn with_defaults(mut self, defaults: fn(&str) -> Value) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Exclude a name from both sides, e.g. server-managed built-ins.
    pub fn skipping(mut self, name: impl Into<String>) -> Self {
        self.skip.push(name.into());
        self
    }

    fn retain(&self, mut names: BTreeSet<String>) -> BTreeSet<String> {
        names.retain(|name| !self.skip.contains(name));
        names
    }

    fn normalize(&self, name: &str, document: Value) -> Value {
        match self.defaults {
            Some(defaults) if document.is_object() => {
                let mut base = defaults(name);
                deep_merge_value(&mut base, &document);
                base
            }
            _ => document,
        }
    }
}

impl Validator for DocumentValidator {
    fn title(&self) -> &str {
        &self.title
    }

    fn remote_names(&self) -> Result<BTreeSet<String>> {
        Ok(self.retain(self.context.remote.documents(&self.collection)?))
    }

    fn local_names(&self) -> Result<BTreeSet<String>> {
        let loader = &self.context.loader;
        let mut names = loader.names(&self.folder)?;
        names.extend(loader.ruby_names(&self.folder)?);
        Ok(self.retain(names))
    }

    fn validate_cancellable(&self, name: &str, cancel: &Cancellation) -> Result<Item> {
        let server = self
            .context
            .remote
            .document(&self.collection, name)?
            .map(|doc| self.normalize(name, doc));
        cancel.check(name)?;
        let local = self
            .context
            .loader
            .load(&self.folder, name)
            .map(|doc| self.normalize(name, doc));

        let ruby = local
            .is_none()
            .then(|| self.context.loader.find_ruby(&self.folder, name))
            .flatten();
        if let Some(path) = ruby {
            tracing::debug!(%path, "Skipping Ruby definition");
            let mut item = Item::new(name, server, None);
            if item.server.is_none() {
                item.push_message(MISSING_ON_SERVER);
            }
            item.push_message(DEFINED_IN_RUBY);
            return Ok(item);
        }
        Ok(Item::compared(name, server, local))
    }
}

fn role_defaults(name: &str) -> Value {
    json!({
        "name": name,
        "description": "",
        "json_class": "Chef::Role",
        "chef_type": "role",
        "default_attributes": {},
        "override_attributes": {},
        "run_list": [],
        "env_run_lists": {}
    })
}

fn environment_defaults(name: &str) -> Value {
    json!({
        "name": name,
        "description": "",
        "json_class": "Chef::Environment",
        "chef_type": "environment",
        "default_attributes": {},
        "override_attributes": {},
        "cookbook_versions": {}
    })
}

/// Deep merge two JSON values
///
/// If both values are objects, merge them recursively with `other` taking precedence.
/// Otherwise, `other` replaces `base`.
fn deep_merge_value(base: &mut Value, other: &Value) {
    match (base, other) {
        (Value::Object(base_map), Value::Object(other_map)) => {
            for (key, other_val) in other_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge_value(base_val, other_val);
                } else {
                    base_map.insert(key.clone(), other_val.clone());
                }
            }
        }
        (base, other) => {
            *base = other.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryPaths;
    use crate::item::{Discrepancy, MISSING_LOCALLY};
    use crate::remote::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup(remote: MemoryStore) -> (TempDir, CategoryContext) {
        let temp = TempDir::new().unwrap();
        let root = NormalizedPath::new(temp.path());
        std::fs::create_dir_all(temp.path().join("roles")).unwrap();
        std::fs::create_dir_all(temp.path().join("environments")).unwrap();
        let context = CategoryContext::new(Arc::new(remote), CategoryPaths::conventional(&root));
        (temp, context)
    }

    #[test]
    fn sparse_local_role_matches_populated_server_role() {
        let remote = MemoryStore::new().with_document(
            "roles",
            "web",
            json!({
                "name": "web",
                "description": "",
                "json_class": "Chef::Role",
                "chef_type": "role",
                "default_attributes": {},
                "override_attributes": {},
                "run_list": ["recipe[nginx]"],
                "env_run_lists": {}
            }),
        );
        let (temp, context) = setup(remote);
        std::fs::write(
            temp.path().join("roles/web.json"),
            r#"{"name": "web", "run_list": ["recipe[nginx]"]}"#,
        )
        .unwrap();

        let item = DocumentValidator::roles(context).validate("web").unwrap();
        assert!(item.passed(), "unexpected errors: {:?}", item.errors);
    }

    #[test]
    fn differing_attribute_is_reported_as_diff() {
        let remote = MemoryStore::new().with_document(
            "roles",
            "web",
            json!({"name": "web", "default_attributes": {"nginx": {"port": 80}}}),
        );
        let (temp, context) = setup(remote);
        std::fs::write(
            temp.path().join("roles/web.json"),
            r#"{"name": "web", "default_attributes": {"nginx": {"port": 8080}}}"#,
        )
        .unwrap();

        let item = DocumentValidator::roles(context).validate("web").unwrap();
        assert_eq!(item.errors.len(), 1);
        let Discrepancy::Diff(diff) = &item.errors[0] else {
            panic!("expected a diff");
        };
        assert_eq!(
            serde_json::to_value(diff).unwrap(),
            json!({"default_attributes": {"nginx": {"port": {"server": 80, "local": 8080}}}})
        );
    }

    #[test]
    fn absence_on_either_side_is_a_message() {
        let remote = MemoryStore::new().with_document("roles", "db", json!({"name": "db"}));
        let (temp, context) = setup(remote);
        std::fs::write(temp.path().join("roles/cache.json"), r#"{"name": "cache"}"#).unwrap();

        let validator = DocumentValidator::roles(context);
        assert_eq!(
            validator.validate("db").unwrap().errors,
            vec![Discrepancy::from(MISSING_LOCALLY)]
        );
        assert_eq!(
            validator.validate("cache").unwrap().errors,
            vec![Discrepancy::from(MISSING_ON_SERVER)]
        );
    }

    #[test]
    fn unparseable_local_file_counts_as_missing() {
        let remote = MemoryStore::new().with_document("roles", "web", json!({"name": "web"}));
        let (temp, context) = setup(remote);
        std::fs::write(temp.path().join("roles/web.json"), "{ broken").unwrap();

        let item = DocumentValidator::roles(context).validate("web").unwrap();
        assert_eq!(item.local, None);
        assert_eq!(item.errors, vec![Discrepancy::from(MISSING_LOCALLY)]);
    }

    #[test]
    fn unparseable_local_only_role_fails() {
        let (temp, context) = setup(MemoryStore::new());
        std::fs::write(temp.path().join("roles/ghost.json"), "{ broken").unwrap();

        let validator = DocumentValidator::roles(context);
        let names = validator.local_names().unwrap();
        assert!(names.contains("ghost"));

        let item = validator.validate("ghost").unwrap();
        assert_eq!(item.server, None);
        assert_eq!(item.local, None);
        assert_eq!(item.errors, vec![Discrepancy::from(MISSING_ON_SERVER)]);
    }

    #[test]
    fn ruby_only_role_is_listed_but_not_compared() {
        let remote = MemoryStore::new().with_document("roles", "web", json!({"name": "web"}));
        let (temp, context) = setup(remote);
        std::fs::write(temp.path().join("roles/web.rb"), "name 'web'\n").unwrap();
        std::fs::write(temp.path().join("roles/base.rb"), "name 'base'\n").unwrap();

        let validator = DocumentValidator::roles(context);
        let names: Vec<String> = validator.local_names().unwrap().into_iter().collect();
        assert_eq!(names, vec!["base", "web"]);

        assert_eq!(
            validator.validate("web").unwrap().errors,
            vec![Discrepancy::from(DEFINED_IN_RUBY)]
        );
        assert_eq!(
            validator.validate("base").unwrap().errors,
            vec![
                Discrepancy::from(MISSING_ON_SERVER),
                Discrepancy::from(DEFINED_IN_RUBY)
            ]
        );
    }

    #[test]
    fn structured_definition_is_preferred_over_ruby() {
        let remote = MemoryStore::new().with_document("roles", "web", json!({"name": "web"}));
        let (temp, context) = setup(remote);
        std::fs::write(temp.path().join("roles/web.rb"), "name 'web'\n").unwrap();
        std::fs::write(temp.path().join("roles/web.json"), r#"{"name": "web"}"#).unwrap();

        let item = DocumentValidator::roles(context).validate("web").unwrap();
        assert!(item.passed(), "unexpected errors: {:?}", item.errors);
    }

    #[test]
    fn default_environment_is_excluded() {
        let remote = MemoryStore::new()
            .with_document("environments", "_default", json!({"name": "_default"}))
            .with_document("environments", "production", json!({"name": "production"}));
        let (_temp, context) = setup(remote);

        let names = DocumentValidator::environments(context).remote_names().unwrap();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["production"]);
    }

    #[test]
    fn deep_merge_objects() {
        let mut base = json!({"a": 1, "b": {"x": 10, "y": 20}});
        deep_merge_value(&mut base, &json!({"b": {"y": 25, "z": 30}, "c": 3}));
        assert_eq!(base, json!({"a": 1, "b": {"x": 10, "y": 25, "z": 30}, "c": 3}));
    }
}
