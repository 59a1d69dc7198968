/// Test doubles: a scripted tab source and an in-memory rendered view
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;

use crate::aggregate::AggregationMode;
use crate::error::{Result, TabError};
use crate::format::{
    blank_label, duplicates_label, loaded_label, scheme_label, tab_count_label, unique_label,
    windows_label,
};
use crate::snapshot::{Selection, TabSummary};
use crate::source::TabSource;
use crate::tab_data::{RawTab, RawWindow, TabHandle};
use crate::update::{RenderedView, RowLevel, prune_empty_groups};

pub fn raw_tab(id: i32, url: &str, title: &str, last_accessed: f64) -> RawTab {
    RawTab {
        id,
        url: Some(url.to_string()),
        title: Some(title.to_string()),
        fav_icon_url: None,
        last_accessed: Some(last_accessed),
        discarded: false,
    }
}

pub fn window(tabs: Vec<RawTab>) -> RawWindow {
    RawWindow { tabs }
}

/// Tab source over a fixed set of windows
///
/// Closed tabs disappear from later `windows` calls. Handles registered with
/// `failing_close` reject every close. A `yielding` source suspends once
/// inside every close, so concurrent callers interleave.
#[derive(Default)]
pub struct FakeTabs {
    windows: RefCell<Vec<RawWindow>>,
    failing: HashSet<TabHandle>,
    yielding: bool,
    closes: RefCell<Vec<TabHandle>>,
    activations: RefCell<Vec<TabHandle>>,
}

impl FakeTabs {
    pub fn new(windows: Vec<RawWindow>) -> FakeTabs {
        FakeTabs {
            windows: RefCell::new(windows),
            ..FakeTabs::default()
        }
    }

    pub fn failing_close(mut self, handle: TabHandle) -> FakeTabs {
        self.failing.insert(handle);
        self
    }

    pub fn yielding(mut self) -> FakeTabs {
        self.yielding = true;
        self
    }

    /// Every close call received, in call order
    pub fn close_order(&self) -> Vec<TabHandle> {
        self.closes.borrow().clone()
    }

    pub fn activations(&self) -> Vec<TabHandle> {
        self.activations.borrow().clone()
    }

    pub fn remaining(&self) -> Vec<RawWindow> {
        self.windows.borrow().clone()
    }
}

#[async_trait(?Send)]
impl TabSource for FakeTabs {
    async fn windows(&self) -> Result<Vec<RawWindow>> {
        Ok(self.remaining())
    }

    async fn close(&self, handle: TabHandle) -> Result<()> {
        self.closes.borrow_mut().push(handle);
        if self.yielding {
            YieldOnce(false).await;
        }
        if self.failing.contains(&handle) {
            return Err(TabError::Close {
                handle,
                reason: "rejected".to_string(),
            });
        }
        for window in self.windows.borrow_mut().iter_mut() {
            window.tabs.retain(|tab| tab.id != handle.0);
        }
        Ok(())
    }

    async fn activate(&self, handle: TabHandle) -> Result<()> {
        self.activations.borrow_mut().push(handle);
        Ok(())
    }
}

/// Pending on the first poll, ready on the second
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }
        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[derive(Debug, Clone, Default)]
struct MockNode {
    tag: &'static str,
    id: Option<&'static str>,
    classes: Vec<&'static str>,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
    lazy: bool,
}

/// Arena-backed rendered tree laid out like the page markup
///
/// Retiring a row detaches it immediately and then prunes empty groups.
pub struct MockView {
    nodes: Vec<MockNode>,
    header: usize,
    stats: usize,
    anchors: HashMap<Selection, usize>,
    sections: HashMap<(AggregationMode, bool), usize>,
}

const ROOT: usize = 0;

impl MockView {
    /// Render a summary the way the page does, with every group instantiated
    pub fn render(summary: &TabSummary) -> MockView {
        let mut view = MockView {
            nodes: vec![MockNode {
                tag: "body",
                ..MockNode::default()
            }],
            header: 0,
            stats: 0,
            anchors: HashMap::new(),
            sections: HashMap::new(),
        };

        view.header = view.add(ROOT, "h1", &[], &tab_count_label(summary.tab_count));
        view.add(ROOT, "p", &["windows"], &windows_label(summary.windows_count));
        view.stats = view.add(ROOT, "ul", &[], "");
        view.nodes[view.stats].id = Some("stats");

        let stats = view.stats;
        view.add(stats, "li", &[], &loaded_label(summary.loaded_tabs));
        if summary.blank_tabs > 0 {
            view.add(stats, "li", &["blank"], &blank_label(summary.blank_tabs));
        }
        let schemes = view.add(stats, "li", &["schemes"], "");
        for line in summary.schemes() {
            view.add(schemes, "span", &[], &scheme_label(line.count, &line.scheme));
        }

        for collection in summary.groups() {
            let mode = collection.mode();
            let noun = mode.noun();

            if !collection.dupes().is_empty() {
                let label = duplicates_label(collection.duplicate_group_count(), noun);
                let list = view.section(mode, true, &label, Selection::Duplicates { mode });
                for (key, group) in collection.dupes().by_length() {
                    let title = group.title.clone().unwrap_or_else(|| key.to_string());
                    let row = view.add(list, "li", &["group"], "");
                    view.add(row, "span", &[], &title);
                    let button = view.add(row, "button", &[], "close");
                    view.anchors.insert(
                        Selection::Group { mode, key: key.to_string() },
                        button,
                    );
                    let members = view.add(row, "ul", &["members"], "");
                    for (index, tab) in group.tabs().iter().enumerate() {
                        if !tab.is_open() {
                            continue;
                        }
                        let member = view.add(members, "li", &[], "");
                        view.add(member, "span", &[], tab.title.as_deref().unwrap_or_default());
                        let button = view.add(member, "button", &[], "close");
                        view.anchors.insert(
                            Selection::Member { mode, key: key.to_string(), index },
                            button,
                        );
                    }
                }
            }

            if !collection.unique().is_empty() {
                let label = unique_label(collection.unique_count(), noun);
                let list = view.section(mode, false, &label, Selection::Uniques { mode });
                for (key, tab) in collection.unique().iter() {
                    if !tab.is_open() {
                        continue;
                    }
                    let row = view.add(list, "li", &[], "");
                    view.add(row, "span", &[], tab.title.as_deref().unwrap_or_default());
                    let button = view.add(row, "button", &[], "close");
                    view.anchors.insert(Selection::Tab { mode, key: key.to_string() }, button);
                }
            }
        }

        view
    }

    fn add(&mut self, parent: usize, tag: &'static str, classes: &[&'static str], text: &str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(MockNode {
            tag,
            classes: classes.to_vec(),
            text: text.to_string(),
            parent: Some(parent),
            ..MockNode::default()
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn section(&mut self, mode: AggregationMode, dupes: bool, label: &str, selection: Selection) -> usize {
        let stats = self.stats;
        let section = self.add(stats, "li", &["group"], "");
        self.add(section, "span", &[], label);
        let button = self.add(section, "button", &[], "close all");
        self.anchors.insert(selection, button);
        self.sections.insert((mode, dupes), section);
        self.add(section, "ul", &[if dupes { "dupes" } else { "unique" }], "")
    }

    /// Append a section whose list was never instantiated
    pub fn add_lazy_group(&mut self, label: &str) -> usize {
        let stats = self.stats;
        let section = self.add(stats, "li", &["group"], "");
        self.add(section, "span", &[], label);
        let list = self.add(section, "ul", &[], "");
        self.nodes[list].lazy = true;
        section
    }

    /// Close button rendered for a selection
    pub fn anchor(&self, selection: &Selection) -> usize {
        self.anchors[selection]
    }

    pub fn is_attached(&self, node: &usize) -> bool {
        let mut current = *node;
        while let Some(parent) = self.nodes[current].parent {
            current = parent;
        }
        current == ROOT
    }

    pub fn header_text(&self) -> String {
        self.nodes[self.header].text.clone()
    }

    pub fn loaded_text(&self) -> String {
        self.loaded_line().map(|n| self.nodes[n].text.clone()).unwrap_or_default()
    }

    pub fn scheme_texts(&self) -> Vec<String> {
        self.scheme_lines().iter().map(|&n| self.nodes[n].text.clone()).collect()
    }

    /// Header text of a collection's duplicate or unique section, if shown
    pub fn section_text(&self, mode: AggregationMode, dupes: bool) -> Option<String> {
        let section = *self.sections.get(&(mode, dupes))?;
        if !self.is_attached(&section) {
            return None;
        }
        self.label_of(section).map(|n| self.nodes[n].text.clone())
    }

    fn has_class(&self, node: usize, class: &str) -> bool {
        self.nodes[node].classes.contains(&class)
    }

    fn label_of(&self, row: usize) -> Option<usize> {
        self.nodes[row].children.iter().copied().find(|&c| self.nodes[c].tag == "span")
    }

    fn list_of(&self, row: usize) -> Option<usize> {
        self.nodes[row].children.iter().copied().find(|&c| self.nodes[c].tag == "ul")
    }

    fn detach(&mut self, node: usize) {
        if let Some(parent) = self.nodes[node].parent.take() {
            self.nodes[parent].children.retain(|&c| c != node);
        }
    }
}

impl RenderedView for MockView {
    type Node = usize;

    fn enclosing_row(&self, target: &usize) -> Option<usize> {
        let mut current = Some(*target);
        while let Some(node) = current {
            if self.nodes[node].tag == "li" {
                return Some(node);
            }
            current = self.nodes[node].parent;
        }
        None
    }

    fn row_level(&self, row: &usize) -> RowLevel {
        let parent = self.nodes[*row].parent;
        if self.has_class(*row, "group") && parent.is_some_and(|p| self.nodes[p].id == Some("stats")) {
            RowLevel::Section
        } else if parent.is_some_and(|p| self.has_class(p, "members")) {
            RowLevel::Member
        } else {
            RowLevel::Entry
        }
    }

    fn header(&self) -> Option<usize> {
        Some(self.header)
    }

    fn loaded_line(&self) -> Option<usize> {
        self.nodes[self.stats].children.first().copied()
    }

    fn scheme_lines(&self) -> Vec<usize> {
        self.nodes[self.stats]
            .children
            .iter()
            .find(|&&c| self.has_class(c, "schemes"))
            .map(|&schemes| self.nodes[schemes].children.clone())
            .unwrap_or_default()
    }

    fn ancestor_labels(&self, row: &usize) -> Vec<usize> {
        let mut labels = Vec::new();
        let mut current = self.nodes[*row].parent;
        while let Some(node) = current {
            if self.nodes[node].tag == "li" && self.has_class(node, "group") {
                labels.extend(self.label_of(node));
            }
            current = self.nodes[node].parent;
        }
        labels
    }

    fn text(&self, node: &usize) -> String {
        self.nodes[*node].text.clone()
    }

    fn set_text(&mut self, node: &usize, text: &str) {
        self.nodes[*node].text = text.to_string();
    }

    fn remove_line(&mut self, node: &usize) {
        self.detach(*node);
    }

    fn empty_groups(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&n| self.nodes[n].tag == "li" && self.has_class(n, "group"))
            .filter(|n| self.is_attached(n))
            .filter(|&n| {
                self.list_of(n)
                    .is_some_and(|list| self.nodes[list].children.is_empty() && !self.nodes[list].lazy)
            })
            .collect()
    }

    fn retire(&mut self, row: &usize) {
        if !self.is_attached(row) {
            return;
        }
        self.detach(*row);
        prune_empty_groups(self);
    }
}
