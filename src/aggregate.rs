/// Duplicate aggregation of tab snapshots
///
/// A `TabCollection` splits snapshots by a dedup key into unique tabs and
/// duplicate groups. A key lives in exactly one of the two at any time; a second
/// snapshot under a unique key promotes it into a group. Nothing is ever removed
/// from a collection: closing a tab only clears its handle, and the next snapshot
/// pass builds fresh collections.
use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::operations::ClosePlan;
use crate::tab_data::{TabHandle, TabSnapshot};

/// What makes two tabs duplicates of each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// Same URL, exactly
    Address,
    /// Same host
    Host,
}

impl AggregationMode {
    /// Counted noun used in section headers
    pub fn noun(&self) -> &'static str {
        match self {
            AggregationMode::Address => "address",
            AggregationMode::Host => "host",
        }
    }

    /// Only identical addresses can be collapsed to a single tab
    pub fn dedupable(&self) -> bool {
        matches!(self, AggregationMode::Address)
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Close and dedup behaviour shared by every holder of snapshots
pub trait TabContainer {
    /// All snapshots, closed ones included, in insertion order
    fn members(&self) -> Vec<&TabSnapshot>;

    fn members_mut(&mut self) -> Vec<&mut TabSnapshot>;

    fn open_members(&self) -> Vec<&TabSnapshot> {
        self.members().into_iter().filter(|t| t.is_open()).collect()
    }

    /// Open snapshots, most recently accessed first
    ///
    /// Ties keep insertion order; a missing timestamp sorts last.
    fn by_last_accessed(&self) -> Vec<&TabSnapshot> {
        let mut tabs = self.open_members();
        tabs.sort_by(|a, b| recency(b).total_cmp(&recency(a)));
        tabs
    }

    fn close_plan(&self) -> ClosePlan {
        ClosePlan::from_tabs(self.open_members())
    }

    /// Keep the most recently accessed tab, close the rest
    fn dedup_plan(&self) -> ClosePlan {
        ClosePlan::from_tabs(self.by_last_accessed().into_iter().skip(1))
    }

    /// Clear the handles of confirmed closes, returning how many matched
    fn mark_closed(&mut self, handles: &HashSet<TabHandle>) -> usize {
        let mut count = 0;
        for tab in self.members_mut() {
            if tab.handle().is_some_and(|h| handles.contains(&h)) {
                tab.mark_closed();
                count += 1;
            }
        }
        count
    }
}

fn recency(tab: &TabSnapshot) -> f64 {
    tab.last_accessed.unwrap_or(f64::NEG_INFINITY)
}

/// Two or more snapshots sharing a key
///
/// `title` and `favicon` hold a value only while every member agrees on it.
/// Once a member disagrees the field stays absent for good.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub title: Option<String>,
    pub favicon: Option<String>,
    pub url: Option<String>,
    tabs: Vec<TabSnapshot>,
}

impl DuplicateGroup {
    fn new(first: TabSnapshot, second: TabSnapshot) -> DuplicateGroup {
        let title = if first.title == second.title { second.title.clone() } else { None };
        let favicon = if first.favicon == second.favicon { second.favicon.clone() } else { None };

        DuplicateGroup {
            title,
            favicon,
            url: second.url.clone(),
            tabs: vec![first, second],
        }
    }

    fn push(&mut self, tab: TabSnapshot) {
        if self.title != tab.title {
            self.title = None;
        }
        if self.favicon != tab.favicon {
            self.favicon = None;
        }
        self.tabs.push(tab);
    }

    pub fn tabs(&self) -> &[TabSnapshot] {
        &self.tabs
    }

    pub fn get(&self, index: usize) -> Option<&TabSnapshot> {
        self.tabs.get(index)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

impl TabContainer for DuplicateGroup {
    fn members(&self) -> Vec<&TabSnapshot> {
        self.tabs.iter().collect()
    }

    fn members_mut(&mut self) -> Vec<&mut TabSnapshot> {
        self.tabs.iter_mut().collect()
    }
}

/// Insertion-ordered map from key to value
#[derive(Debug, Clone, PartialEq)]
struct Keyed<T> {
    order: Vec<String>,
    entries: HashMap<String, T>,
}

impl<T> Default for Keyed<T> {
    fn default() -> Self {
        Keyed {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<T> Keyed<T> {
    fn insert(&mut self, key: String, value: T) {
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push(key);
        }
    }

    fn remove(&mut self, key: &str) -> Option<T> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|v| (k.as_str(), v)))
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }
}

/// Unique tabs, one per key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabList {
    tabs: Keyed<TabSnapshot>,
}

impl TabList {
    pub fn get(&self, key: &str) -> Option<&TabSnapshot> {
        self.tabs.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tabs.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TabSnapshot)> {
        self.tabs.iter()
    }

    pub fn len(&self) -> usize {
        self.tabs.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.order.is_empty()
    }
}

impl TabContainer for TabList {
    fn members(&self) -> Vec<&TabSnapshot> {
        self.iter().map(|(_, tab)| tab).collect()
    }

    fn members_mut(&mut self) -> Vec<&mut TabSnapshot> {
        self.tabs.values_mut().collect()
    }
}

/// Duplicate groups, one per key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabGroup {
    groups: Keyed<DuplicateGroup>,
}

impl TabGroup {
    pub fn get(&self, key: &str) -> Option<&DuplicateGroup> {
        self.groups.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.groups.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DuplicateGroup)> {
        self.groups.iter()
    }

    /// Groups with the most members first
    pub fn by_length(&self) -> Vec<(&str, &DuplicateGroup)> {
        let mut groups: Vec<_> = self.iter().collect();
        groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        groups
    }

    pub fn len(&self) -> usize {
        self.groups.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.order.is_empty()
    }
}

impl TabContainer for TabGroup {
    fn members(&self) -> Vec<&TabSnapshot> {
        self.iter().flat_map(|(_, group)| group.tabs.iter()).collect()
    }

    fn members_mut(&mut self) -> Vec<&mut TabSnapshot> {
        self.groups
            .values_mut()
            .flat_map(|group| group.tabs.iter_mut())
            .collect()
    }

    /// Keep one tab per group
    fn dedup_plan(&self) -> ClosePlan {
        let mut plan = ClosePlan::default();
        for (_, group) in self.iter() {
            plan.extend(group.dedup_plan());
        }
        plan
    }
}

/// Snapshots aggregated by one dedup key
#[derive(Debug, Clone, PartialEq)]
pub struct TabCollection {
    mode: AggregationMode,
    unique: TabList,
    dupes: TabGroup,
}

impl TabCollection {
    pub fn new(mode: AggregationMode) -> TabCollection {
        TabCollection {
            mode,
            unique: TabList::default(),
            dupes: TabGroup::default(),
        }
    }

    pub fn insert(&mut self, key: &str, tab: TabSnapshot) {
        if let Some(group) = self.dupes.groups.entries.get_mut(key) {
            group.push(tab);
        } else if let Some(other) = self.unique.tabs.remove(key) {
            self.dupes
                .groups
                .insert(key.to_string(), DuplicateGroup::new(other, tab));
        } else {
            self.unique.tabs.insert(key.to_string(), tab);
        }
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    pub fn unique(&self) -> &TabList {
        &self.unique
    }

    pub fn dupes(&self) -> &TabGroup {
        &self.dupes
    }

    pub fn unique_count(&self) -> usize {
        self.unique.len()
    }

    pub fn duplicate_group_count(&self) -> usize {
        self.dupes.len()
    }

    /// Number of displayed rows, not tabs
    pub fn len(&self) -> usize {
        self.unique_count() + self.duplicate_group_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mark_closed(&mut self, handles: &HashSet<TabHandle>) -> usize {
        self.unique.mark_closed(handles) + self.dupes.mark_closed(handles)
    }
}
