/// In-place count updates for an already rendered view
///
/// After a batch of closes settles, the displayed totals are patched from the
/// close delta instead of querying the browser again: the tab header, the loaded
/// line, the scheme breakdown and the headers of the enclosing groups. The closed
/// row is then retired, and any group left without rows goes with it.
use crate::format::{loaded_label, parse_count, relabel, scheme_label, tab_count_label};
use crate::operations::CloseDelta;

/// Where a row sits in the rendered tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLevel {
    /// A top-level section of the statistics list
    Section,
    /// One tab inside a duplicate group
    Member,
    /// Any other row counted by the groups around it
    Entry,
}

/// What the caller has to do after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewUpdate {
    /// The rendered view was patched in place
    Patched,
    /// The view cannot be patched; rebuild it from a fresh snapshot
    RefreshNeeded,
    /// Nothing changed
    Unchanged,
}

/// A rendered tree the updater can read and patch
///
/// Implementations bind to a concrete UI; the updater never touches one
/// directly.
pub trait RenderedView {
    type Node: Clone;

    /// Nearest list row enclosing an event target
    fn enclosing_row(&self, target: &Self::Node) -> Option<Self::Node>;

    fn row_level(&self, row: &Self::Node) -> RowLevel;

    /// Node holding the total tab count
    fn header(&self) -> Option<Self::Node>;

    /// Node holding the loaded tab count
    fn loaded_line(&self) -> Option<Self::Node>;

    /// One node per displayed scheme count
    fn scheme_lines(&self) -> Vec<Self::Node>;

    /// Count headers of the groups enclosing `row`, nearest first
    fn ancestor_labels(&self, row: &Self::Node) -> Vec<Self::Node>;

    fn text(&self, node: &Self::Node) -> String;

    fn set_text(&mut self, node: &Self::Node, text: &str);

    /// Drop a line without animation
    fn remove_line(&mut self, node: &Self::Node);

    /// Rendered groups with no rows left
    ///
    /// Groups whose content has never been instantiated are not empty, just
    /// unrendered, and must not be listed. A group that has been retired is
    /// never listed again.
    fn empty_groups(&self) -> Vec<Self::Node>;

    /// Animate a row out and detach it
    ///
    /// Once the row is gone the implementation calls [`prune_empty_groups`].
    /// Retiring a row that is already detached or on its way out does nothing.
    fn retire(&mut self, row: &Self::Node);
}

/// Apply a close delta to the rendered view
///
/// `anchor` is the target of the event that triggered the close. Without one,
/// or when no row encloses it, the view cannot be patched and a refresh is
/// requested instead of leaving stale counts on screen.
pub fn apply_delta<V: RenderedView>(
    view: &mut V,
    anchor: Option<&V::Node>,
    delta: &CloseDelta,
) -> ViewUpdate {
    let Some(anchor) = anchor else {
        log::debug!("no event anchor, refreshing");
        return ViewUpdate::RefreshNeeded;
    };
    let Some(row) = view.enclosing_row(anchor) else {
        log::debug!("event target is outside any row, refreshing");
        return ViewUpdate::RefreshNeeded;
    };

    if delta.closed > 0 {
        if let Some(header) = view.header() {
            let count = parse_count(&view.text(&header)).map_or(0, |(n, _)| n);
            view.set_text(&header, &tab_count_label(count.saturating_sub(delta.closed)));
        }
    }

    if delta.loaded > 0 {
        if let Some(line) = view.loaded_line() {
            if let Some((count, _)) = parse_count(&view.text(&line)) {
                view.set_text(&line, &loaded_label(count.saturating_sub(delta.loaded)));
            }
        }
    }

    update_schemes(view, delta);

    if view.row_level(&row) == RowLevel::Entry {
        count_out(view, &row);
    }

    log::debug!(
        "patched view: -{} tabs, -{} loaded, schemes {:?}",
        delta.closed,
        delta.loaded,
        delta.schemes
    );
    view.retire(&row);
    ViewUpdate::Patched
}

fn update_schemes<V: RenderedView>(view: &mut V, delta: &CloseDelta) {
    if delta.schemes.is_empty() {
        return;
    }

    for line in view.scheme_lines() {
        let text = view.text(&line);
        let Some((count, scheme)) = parse_count(&text) else { continue };
        let Some(&closed) = delta.schemes.get(scheme) else { continue };

        let remaining = count.saturating_sub(closed);
        if remaining > 0 {
            view.set_text(&line, &scheme_label(remaining, scheme));
        } else {
            view.remove_line(&line);
        }
    }
}

/// Take one row off the count headers of the groups around it
fn count_out<V: RenderedView>(view: &mut V, row: &V::Node) {
    for label in view.ancestor_labels(row) {
        let Some((count, rest)) = parse_count(&view.text(&label)).map(|(n, r)| (n, r.to_string())) else {
            continue;
        };
        let remaining = count.saturating_sub(1);
        if remaining > 0 {
            view.set_text(&label, &relabel(&rest, remaining));
        }
    }
}

/// Retire every rendered group that has run out of rows
///
/// A pruned group that is itself counted by the groups around it leaves their
/// headers one lower, same as a closed row would.
pub fn prune_empty_groups<V: RenderedView>(view: &mut V) {
    while let Some(group) = view.empty_groups().into_iter().next() {
        if view.row_level(&group) == RowLevel::Entry {
            count_out(view, &group);
        }
        view.retire(&group);
    }
}
