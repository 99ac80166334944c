//! Checklist driver
//!
//! One run per category: reconcile the names known to either side, run
//! the category's validator over them, stream each finished item to the
//! reporter and fold the overall result.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use crate::reconcile::reconcile;
use crate::report::{HumanReporter, OutputMode, write_json};
use crate::runner::Runner;
use crate::validator::Validator;
use crate::{Item, Result};

/// Progress of a single checklist run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Reconciling,
    Validating,
    Reporting,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Reconciling => "reconciling",
            Self::Validating => "validating",
            Self::Reporting => "reporting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed run.
///
/// `items` is only populated in JSON mode, in reconciled name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    pub items: Vec<Item>,
    pub all_passed: bool,
}

/// Drives one category's validator through a full run.
pub struct Checklist {
    validator: Arc<dyn Validator>,
    runner: Runner,
    mode: OutputMode,
}

impl Checklist {
    pub fn new(validator: Arc<dyn Validator>, runner: Runner, mode: OutputMode) -> Self {
        Self {
            validator,
            runner,
            mode,
        }
    }

    pub fn title(&self) -> &str {
        self.validator.title()
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Validate every reconciled name, streaming human output to `out`.
    ///
    /// Nothing is written in JSON mode; the caller decides how to emit
    /// `RunResult::items`.
    pub async fn execute<W: Write>(&self, out: &mut W) -> Result<RunResult> {
        let title = self.title();
        self.enter(Phase::Init);

        let reporter = match self.mode {
            OutputMode::Human(style) => {
                let reporter = HumanReporter::new(style);
                reporter.banner(out, title)?;
                Some(reporter)
            }
            OutputMode::Json => None,
        };

        self.enter(Phase::Reconciling);
        let remote = self.validator.remote_names()?;
        let local = self.validator.local_names()?;
        let names = reconcile(&remote, &local);
        tracing::debug!(
            checklist = %title,
            remote = remote.len(),
            local = local.len(),
            total = names.len(),
            "Reconciled names"
        );

        self.enter(Phase::Validating);
        let mut all_passed = true;
        let items = self
            .runner
            .run_all(&names, Arc::clone(&self.validator), |item| {
                all_passed &= item.passed();
                match reporter {
                    Some(reporter) => reporter.report_item(out, item),
                    None => Ok(()),
                }
            })
            .await?;

        self.enter(Phase::Reporting);
        let failed = items.iter().filter(|item| !item.passed()).count();
        tracing::info!(checklist = %title, checked = items.len(), failed, "Checklist finished");

        let result = RunResult {
            items: if self.mode.is_json() { items } else { Vec::new() },
            all_passed,
        };
        self.enter(Phase::Done);
        Ok(result)
    }

    /// Execute the checklist and, in JSON mode, print the item array.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<bool> {
        let result = self.execute(out).await?;
        if self.mode.is_json() {
            write_json(out, &result.items)?;
        }
        Ok(result.all_passed)
    }

    fn enter(&self, phase: Phase) {
        tracing::debug!(checklist = %self.title(), %phase, "Checklist phase");
    }
}
