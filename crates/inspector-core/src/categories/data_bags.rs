//! Data bags and the items stored in them

use std::collections::BTreeSet;

use inspector_fs::subdirectories;
use serde_json::json;

use super::CategoryContext;
use crate::validator::{Cancellation, Validator};
use crate::{Item, Result};

const COLLECTION: &str = "data_bags";

/// Checks that every data bag exists on both sides.
pub struct DataBagValidator {
    context: CategoryContext,
}

impl DataBagValidator {
    pub fn new(context: CategoryContext) -> Self {
        Self { context }
    }
}

impl Validator for DataBagValidator {
    fn title(&self) -> &str {
        "Data Bags"
    }

    fn remote_names(&self) -> Result<BTreeSet<String>> {
        self.context.remote.collections(COLLECTION)
    }

    fn local_names(&self) -> Result<BTreeSet<String>> {
        Ok(subdirectories(&self.context.paths.data_bags)?)
    }

    fn validate_cancellable(&self, name: &str, cancel: &Cancellation) -> Result<Item> {
        let presence = || json!({ "name": name });
        let server = self
            .context
            .remote
            .collections(COLLECTION)?
            .contains(name)
            .then(presence);
        cancel.check(name)?;
        let local = self.context.paths.data_bags.join(name).is_dir().then(presence);
        Ok(Item::compared(name, server, local))
    }
}

/// Compares data bag items, named `<bag>/<item>`.
pub struct DataBagItemValidator {
    context: CategoryContext,
}

impl DataBagItemValidator {
    pub fn new(context: CategoryContext) -> Self {
        Self { context }
    }
}

impl Validator for DataBagItemValidator {
    fn title(&self) -> &str {
        "Data Bag Items"
    }

    fn remote_names(&self) -> Result<BTreeSet<String>> {
        let remote = &self.context.remote;
        let mut names = BTreeSet::new();
        for bag in remote.collections(COLLECTION)? {
            for item in remote.documents(&format!("{COLLECTION}/{bag}"))? {
                names.insert(format!("{bag}/{item}"));
            }
        }
        Ok(names)
    }

    fn local_names(&self) -> Result<BTreeSet<String>> {
        let root = &self.context.paths.data_bags;
        let mut names = BTreeSet::new();
        for bag in subdirectories(root)? {
            for item in self.context.loader.names(&root.join(&bag))? {
                names.insert(format!("{bag}/{item}"));
            }
        }
        Ok(names)
    }

    fn validate_cancellable(&self, name: &str, cancel: &Cancellation) -> Result<Item> {
        let Some((bag, item)) = name.split_once('/') else {
            let mut invalid = Item::new(name, None, None);
            invalid.push_message("is not a <bag>/<item> name");
            return Ok(invalid);
        };

        let server = self
            .context
            .remote
            .document(&format!("{COLLECTION}/{bag}"), item)?;
        cancel.check(name)?;
        let local = self
            .context
            .loader
            .load(&self.context.paths.data_bags.join(bag), item);
        Ok(Item::compared(name, server, local))
    }
}
