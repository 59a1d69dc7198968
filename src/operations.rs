/// Tab operations: planning closes, issuing them, and accounting for what closed
use std::collections::{BTreeMap, HashSet};

use futures::future::join_all;

use crate::error::TabError;
use crate::source::TabSource;
use crate::tab_data::{TabHandle, TabSnapshot};

/// One tab scheduled for closing, with what it contributes to a delta
#[derive(Debug, Clone, PartialEq)]
pub struct CloseTarget {
    pub handle: TabHandle,
    pub scheme: Option<String>,
    pub loaded: bool,
}

/// Ordered set of tabs to close; closes are issued in this order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClosePlan {
    targets: Vec<CloseTarget>,
}

impl ClosePlan {
    /// Plan closing every still-open tab, each handle at most once
    pub fn from_tabs<'a>(tabs: impl IntoIterator<Item = &'a TabSnapshot>) -> ClosePlan {
        let mut plan = ClosePlan::default();
        plan.extend_tabs(tabs);
        plan
    }

    pub fn extend(&mut self, other: ClosePlan) {
        for target in other.targets {
            if !self.contains(target.handle) {
                self.targets.push(target);
            }
        }
    }

    fn extend_tabs<'a>(&mut self, tabs: impl IntoIterator<Item = &'a TabSnapshot>) {
        for tab in tabs {
            let Some(handle) = tab.handle() else { continue };
            if self.contains(handle) {
                continue;
            }
            self.targets.push(CloseTarget {
                handle,
                scheme: tab.scheme(),
                loaded: tab.loaded,
            });
        }
    }

    /// Drop every target whose handle is in `handles`
    pub fn exclude(&mut self, handles: &HashSet<TabHandle>) {
        self.targets.retain(|t| !handles.contains(&t.handle));
    }

    fn contains(&self, handle: TabHandle) -> bool {
        self.targets.iter().any(|t| t.handle == handle)
    }

    pub fn targets(&self) -> &[CloseTarget] {
        &self.targets
    }

    pub fn handles(&self) -> Vec<TabHandle> {
        self.targets.iter().map(|t| t.handle).collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// What a batch of confirmed closes removed from the displayed totals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseDelta {
    pub closed: usize,
    pub loaded: usize,
    pub schemes: BTreeMap<String, usize>,
}

impl CloseDelta {
    pub fn record(&mut self, target: &CloseTarget) {
        self.closed += 1;
        if target.loaded {
            self.loaded += 1;
        }
        if let Some(scheme) = &target.scheme {
            *self.schemes.entry(scheme.clone()).or_insert(0) += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.closed == 0
    }
}

/// Settled result of a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloseOutcome {
    pub delta: CloseDelta,
    pub closed: Vec<TabHandle>,
    pub failures: Vec<TabError>,
}

impl CloseOutcome {
    pub fn closed_set(&self) -> HashSet<TabHandle> {
        self.closed.iter().copied().collect()
    }

    /// Some closes went through and some did not
    pub fn is_partial(&self) -> bool {
        !self.closed.is_empty() && !self.failures.is_empty()
    }
}

/// Issue every close in the plan and wait for all of them to settle
///
/// A tab enters the delta only once its close resolved successfully. A failed
/// close is logged and recorded; it never stops the rest of the batch.
pub async fn execute<S: TabSource + ?Sized>(source: &S, plan: &ClosePlan) -> CloseOutcome {
    let results = join_all(plan.targets.iter().map(|t| source.close(t.handle))).await;

    let mut outcome = CloseOutcome::default();
    for (target, result) in plan.targets.iter().zip(results) {
        match result {
            Ok(()) => {
                outcome.delta.record(target);
                outcome.closed.push(target.handle);
            }
            Err(e) => {
                log::warn!("{}", e);
                outcome.failures.push(e);
            }
        }
    }

    log::debug!(
        "closed {} of {} tabs ({} loaded, schemes {:?})",
        outcome.delta.closed,
        plan.len(),
        outcome.delta.loaded,
        outcome.delta.schemes
    );
    outcome
}
