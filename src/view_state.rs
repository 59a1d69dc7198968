/// State behind one open About Tabs page
///
/// Holds the tab source and the current summary. Event handlers resolve a
/// selection against the summary, run the closes, and then either patch the
/// rendered view or ask for a refresh.
use std::cell::{Ref, RefCell};
use std::collections::HashSet;

use crate::config::ViewConfig;
use crate::error::{Result, TabError};
use crate::operations::{ClosePlan, execute};
use crate::snapshot::{Selection, TabSummary};
use crate::source::TabSource;
use crate::tab_data::TabHandle;
use crate::update::{RenderedView, ViewUpdate, apply_delta};

pub struct ViewState<S> {
    source: S,
    config: ViewConfig,
    summary: RefCell<TabSummary>,
    /// Handles with a close in flight
    pending: RefCell<HashSet<TabHandle>>,
}

impl<S: TabSource> ViewState<S> {
    /// Query the browser and build the first summary
    pub async fn load(source: S, config: ViewConfig, now: f64) -> Result<ViewState<S>> {
        let windows = source.windows().await?;
        let summary = TabSummary::build(&windows, &config.blank_url, now);

        Ok(ViewState {
            source,
            config,
            summary: RefCell::new(summary),
            pending: RefCell::new(HashSet::new()),
        })
    }

    /// Rebuild the summary from a fresh query
    pub async fn refresh(&self, now: f64) -> Result<()> {
        let windows = self.source.windows().await?;
        *self.summary.borrow_mut() = TabSummary::build(&windows, &self.config.blank_url, now);
        Ok(())
    }

    pub fn summary(&self) -> Ref<'_, TabSummary> {
        self.summary.borrow()
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Close every open tab of a selection
    pub async fn close<V: RenderedView>(
        &self,
        selection: &Selection,
        view: &mut V,
        anchor: Option<&V::Node>,
    ) -> ViewUpdate {
        let plan = self.summary.borrow().close_plan(selection);
        match plan {
            Ok(plan) => self.run(plan, view, anchor).await,
            Err(e) => {
                log::warn!("{}", e);
                ViewUpdate::RefreshNeeded
            }
        }
    }

    /// Close all but the most recently accessed tab of each address
    pub async fn dedup<V: RenderedView>(
        &self,
        selection: &Selection,
        view: &mut V,
        anchor: Option<&V::Node>,
    ) -> ViewUpdate {
        let plan = self.summary.borrow().dedup_plan(selection);
        match plan {
            Ok(plan) => self.run(plan, view, anchor).await,
            Err(e @ TabError::DedupUnsupported(_)) => {
                log::warn!("{}", e);
                ViewUpdate::Unchanged
            }
            Err(e) => {
                log::warn!("{}", e);
                ViewUpdate::RefreshNeeded
            }
        }
    }

    /// Bring a single tab to the front
    pub async fn switch_to(&self, selection: &Selection) -> Result<()> {
        let handle = {
            let summary = self.summary.borrow();
            summary
                .tab(selection)?
                .handle()
                .ok_or_else(|| TabError::AlreadyClosed(format!("{:?}", selection)))?
        };

        self.source.activate(handle).await.inspect_err(|e| log::warn!("{}", e))
    }

    /// Close a plan and account for it
    ///
    /// Tabs whose close is still in flight from an earlier action are left out,
    /// so overlapping clicks never close or count a tab twice. A partial batch
    /// only has its confirmed closes marked in the model; the header, loaded and
    /// scheme lines could take that delta in place, but the clicked row still
    /// holds tabs that failed to close, so the page is rebuilt instead.
    async fn run<V: RenderedView>(
        &self,
        mut plan: ClosePlan,
        view: &mut V,
        anchor: Option<&V::Node>,
    ) -> ViewUpdate {
        plan.exclude(&self.pending.borrow());
        if plan.is_empty() {
            log::debug!("nothing left to close");
            return ViewUpdate::Unchanged;
        }

        self.pending.borrow_mut().extend(plan.handles());
        let outcome = execute(&self.source, &plan).await;
        {
            let mut pending = self.pending.borrow_mut();
            for handle in plan.handles() {
                pending.remove(&handle);
            }
        }
        self.summary.borrow_mut().mark_closed(&outcome.closed_set());

        if outcome.closed.is_empty() {
            return ViewUpdate::Unchanged;
        }
        if outcome.is_partial() {
            log::debug!(
                "{} of {} closes failed, refreshing",
                outcome.failures.len(),
                plan.len()
            );
            return ViewUpdate::RefreshNeeded;
        }
        apply_delta(view, anchor, &outcome.delta)
    }
}
