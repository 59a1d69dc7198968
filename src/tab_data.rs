/// Data structures for About Tabs
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time_ago::RefreshTime;
use crate::url_parts::scheme_of;

/// Opaque reference to a tab owned by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabHandle(pub i32);

impl fmt::Display for TabHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tab as reported by the browser's window query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTab {
    pub id: i32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub last_accessed: Option<f64>,
    #[serde(default)]
    pub discarded: bool,
}

/// A browser window and its tabs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawWindow {
    #[serde(default)]
    pub tabs: Vec<RawTab>,
}

/// Point-in-time record of one tab's displayable attributes
///
/// `handle` is cleared once a close has been confirmed, which makes a second
/// close of the same snapshot impossible.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    pub title: Option<String>,
    pub url: Option<String>,
    pub favicon: Option<String>,
    pub last_accessed: Option<f64>,
    pub loaded: bool,
    #[serde(skip)]
    live_url: Option<String>,
    #[serde(skip)]
    handle: Option<TabHandle>,
}

impl TabSnapshot {
    pub fn new(tab: &RawTab) -> TabSnapshot {
        TabSnapshot {
            title: tab.title.clone(),
            url: tab.url.clone(),
            favicon: tab.fav_icon_url.clone(),
            last_accessed: tab.last_accessed,
            loaded: !tab.discarded,
            live_url: tab.url.clone(),
            handle: Some(TabHandle(tab.id)),
        }
    }

    /// Snapshot shown in the host listing: titled by its host, no address
    pub fn for_host(tab: &RawTab, host: &str) -> TabSnapshot {
        TabSnapshot {
            title: Some(host.to_string()),
            url: None,
            ..TabSnapshot::new(tab)
        }
    }

    pub fn handle(&self) -> Option<TabHandle> {
        self.handle
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Release the back-reference after a confirmed close
    pub fn mark_closed(&mut self) {
        self.handle = None;
    }

    /// Scheme of the underlying tab, even when the displayed url is absent
    pub fn scheme(&self) -> Option<String> {
        scheme_of(self.url.as_deref().or(self.live_url.as_deref()))
    }

    pub fn last_accessed_ago(&self, now: &RefreshTime) -> Option<String> {
        self.last_accessed.map(|ts| now.time_ago(ts))
    }
}
