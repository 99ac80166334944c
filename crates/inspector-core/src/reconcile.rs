//! Name reconciliation between the server and the local repository

use std::collections::BTreeSet;

/// Deduplicated, ascending union of server and local names.
///
/// This is the canonical iteration order for a checklist run.
pub fn reconcile(remote_names: &BTreeSet<String>, local_names: &BTreeSet<String>) -> Vec<String> {
    remote_names.union(local_names).cloned().collect()
}
