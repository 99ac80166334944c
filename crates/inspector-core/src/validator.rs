//! Validator trait implemented once per item category

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Error, Item, Result};

/// Flag raised by the runner when a run is aborted.
///
/// Validations already running on the blocking pool cannot be aborted by
/// tokio, so long validations poll this between steps and bail out.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Error::Cancelled)` once the run has been aborted.
    pub fn check(&self, name: &str) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Loads and compares the items of one category.
///
/// Validation must return a fully populated [`Item`]: local read and
/// parse problems become absent representations, while any returned
/// error aborts the whole checklist run.
pub trait Validator: Send + Sync {
    /// Banner title for this category's checklist.
    fn title(&self) -> &str;

    /// Names of the items stored on the server.
    fn remote_names(&self) -> Result<BTreeSet<String>>;

    /// Names of the items defined in the local repository.
    fn local_names(&self) -> Result<BTreeSet<String>>;

    /// Load both representations of `name` and record its discrepancies,
    /// returning early with [`Error::Cancelled`] once `cancel` is raised.
    fn validate_cancellable(&self, name: &str, cancel: &Cancellation) -> Result<Item>;

    /// Validate `name` outside of a run.
    fn validate(&self, name: &str) -> Result<Item> {
        self.validate_cancellable(name, &Cancellation::new())
    }
}
