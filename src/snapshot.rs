/// Snapshot pass over every window: aggregate data for the rendered view
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::aggregate::{AggregationMode, TabCollection, TabContainer};
use crate::error::{Result, TabError};
use crate::operations::ClosePlan;
use crate::tab_data::{RawWindow, TabHandle, TabSnapshot};
use crate::time_ago::RefreshTime;
use crate::url_parts::{host_of, scheme_of};

/// One line of the scheme breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeCount {
    pub scheme: String,
    pub count: usize,
}

/// A row or section of the rendered view that an action applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    /// A unique tab
    Tab { mode: AggregationMode, key: String },
    /// One tab of a duplicate group
    Member { mode: AggregationMode, key: String, index: usize },
    /// A whole duplicate group
    Group { mode: AggregationMode, key: String },
    /// Every unique tab of a collection
    Uniques { mode: AggregationMode },
    /// Every duplicate group of a collection
    Duplicates { mode: AggregationMode },
}

impl Selection {
    pub fn mode(&self) -> AggregationMode {
        match self {
            Selection::Tab { mode, .. }
            | Selection::Member { mode, .. }
            | Selection::Group { mode, .. }
            | Selection::Uniques { mode }
            | Selection::Duplicates { mode } => *mode,
        }
    }
}

/// Everything the view shows, built from one query of the browser
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSummary {
    pub tab_count: usize,
    pub windows_count: usize,
    pub blank_tabs: usize,
    pub loaded_tabs: usize,
    #[serde(serialize_with = "serialize_schemes")]
    schemes: BTreeMap<String, usize>,
    #[serde(skip)]
    uris: TabCollection,
    #[serde(skip)]
    hosts: TabCollection,
    #[serde(skip)]
    refreshed_at: RefreshTime,
}

fn serialize_schemes<S: serde::Serializer>(
    schemes: &BTreeMap<String, usize>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(schemes.iter().map(|(scheme, &count)| SchemeCount {
        scheme: scheme.clone(),
        count,
    }))
}

impl TabSummary {
    /// Walk every window once and aggregate its tabs by address and by host
    ///
    /// Blank tabs only count toward `tab_count` and `blank_tabs`. A URL without a
    /// scheme or host simply stays out of the scheme tally or the host listing.
    pub fn build(windows: &[RawWindow], blank_url: &str, now: f64) -> TabSummary {
        let mut summary = TabSummary {
            tab_count: 0,
            windows_count: windows.len(),
            blank_tabs: 0,
            loaded_tabs: 0,
            schemes: BTreeMap::new(),
            uris: TabCollection::new(AggregationMode::Address),
            hosts: TabCollection::new(AggregationMode::Host),
            refreshed_at: RefreshTime::new(now),
        };

        for window in windows {
            summary.tab_count += window.tabs.len();
            for raw in &window.tabs {
                let url = raw.url.as_deref().unwrap_or_default();
                if url == blank_url {
                    summary.blank_tabs += 1;
                    continue;
                }

                let tab = TabSnapshot::new(raw);
                if tab.loaded {
                    summary.loaded_tabs += 1;
                }
                summary.uris.insert(url, tab);

                if let Some(host) = host_of(url) {
                    summary.hosts.insert(&host, TabSnapshot::for_host(raw, &host));
                }

                if let Some(scheme) = scheme_of(Some(url)) {
                    *summary.schemes.entry(scheme).or_insert(0) += 1;
                }
            }
        }

        log::info!(
            "{} tabs in {} windows: {} unique / {} duplicated addresses, {} unique / {} duplicated hosts",
            summary.tab_count,
            summary.windows_count,
            summary.uris.unique_count(),
            summary.uris.duplicate_group_count(),
            summary.hosts.unique_count(),
            summary.hosts.duplicate_group_count()
        );
        summary
    }

    /// Scheme counts in scheme order
    pub fn schemes(&self) -> impl Iterator<Item = SchemeCount> + '_ {
        self.schemes.iter().map(|(scheme, &count)| SchemeCount {
            scheme: scheme.clone(),
            count,
        })
    }

    pub fn uris(&self) -> &TabCollection {
        &self.uris
    }

    pub fn hosts(&self) -> &TabCollection {
        &self.hosts
    }

    /// Both collections, addresses first
    pub fn groups(&self) -> [&TabCollection; 2] {
        [&self.uris, &self.hosts]
    }

    pub fn collection(&self, mode: AggregationMode) -> &TabCollection {
        match mode {
            AggregationMode::Address => &self.uris,
            AggregationMode::Host => &self.hosts,
        }
    }

    pub fn refreshed_at(&self) -> &RefreshTime {
        &self.refreshed_at
    }

    /// The single tab a selection points at
    pub fn tab(&self, selection: &Selection) -> Result<&TabSnapshot> {
        let collection = self.collection(selection.mode());
        let tab = match selection {
            Selection::Tab { key, .. } => collection.unique().get(key),
            Selection::Member { key, index, .. } => {
                collection.dupes().get(key).and_then(|group| group.get(*index))
            }
            _ => None,
        };
        tab.ok_or_else(|| not_found(selection))
    }

    /// Tabs to close for a selection
    pub fn close_plan(&self, selection: &Selection) -> Result<ClosePlan> {
        let collection = self.collection(selection.mode());
        match selection {
            Selection::Tab { .. } | Selection::Member { .. } => {
                Ok(ClosePlan::from_tabs([self.tab(selection)?]))
            }
            Selection::Group { key, .. } => collection
                .dupes()
                .get(key)
                .map(|group| group.close_plan())
                .ok_or_else(|| not_found(selection)),
            Selection::Uniques { .. } => Ok(collection.unique().close_plan()),
            Selection::Duplicates { .. } => Ok(collection.dupes().close_plan()),
        }
    }

    /// Tabs to close so that one tab per address remains
    pub fn dedup_plan(&self, selection: &Selection) -> Result<ClosePlan> {
        let mode = selection.mode();
        if !mode.dedupable() {
            return Err(TabError::DedupUnsupported(format!("tabs grouped by {}", mode)));
        }

        let collection = self.collection(mode);
        match selection {
            Selection::Group { key, .. } => collection
                .dupes()
                .get(key)
                .map(|group| group.dedup_plan())
                .ok_or_else(|| not_found(selection)),
            Selection::Duplicates { .. } => Ok(collection.dupes().dedup_plan()),
            _ => Err(TabError::DedupUnsupported(format!("{:?}", selection))),
        }
    }

    /// Clear the handles of confirmed closes in both collections
    ///
    /// Every tab appears once by address and once by host, so both have to
    /// forget it.
    pub fn mark_closed(&mut self, handles: &HashSet<TabHandle>) {
        self.uris.mark_closed(handles);
        self.hosts.mark_closed(handles);
    }
}

fn not_found(selection: &Selection) -> TabError {
    TabError::NotFound(format!("{:?}", selection))
}
