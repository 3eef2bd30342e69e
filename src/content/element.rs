// src/content/element.rs
// =============================================================================
// Content elements of the host CMS, as far as the panel cares about them.
//
// The host has many element kinds (entries, global sets, assets, categories,
// users, ...). Only entries and global sets are edited through the admin UI
// in the way the dashboard links to, so those are the two kinds we project
// into an ElementRef. Every other kind is carried as Element::Other and
// projects to None.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ISO-8601 with a numeric offset and no colon, e.g. 2019-05-01T10:00:00+0000
const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// A structured content item with a title
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: u64,
    pub title: String,
    /// live, pending, expired, disabled, ...
    pub status: String,
    pub cp_edit_url: String,
    pub date_updated: DateTime<Utc>,
}

/// A singleton content container, named rather than titled
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSet {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub cp_edit_url: String,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Entry(Entry),
    GlobalSet(GlobalSet),
    /// Any kind we don't link to (asset, category, user, ...)
    Other { id: u64, kind: String },
}

/// Read-only view of an element, shown next to a report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub id: u64,
    pub title: String,
    pub status: String,
    pub edit_url: String,
    pub last_updated: String,
}

impl Element {
    pub fn id(&self) -> u64 {
        match self {
            Element::Entry(entry) => entry.id,
            Element::GlobalSet(set) => set.id,
            Element::Other { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Element::Entry(_) => "entry",
            Element::GlobalSet(_) => "global_set",
            Element::Other { kind, .. } => kind,
        }
    }

    // Projects the element for display; None for kinds we don't link to
    pub fn to_element_ref(&self) -> Option<ElementRef> {
        match self {
            Element::Entry(entry) => Some(ElementRef {
                id: entry.id,
                title: entry.title.clone(),
                status: entry.status.clone(),
                edit_url: entry.cp_edit_url.clone(),
                last_updated: format_iso8601(&entry.date_updated),
            }),
            Element::GlobalSet(set) => Some(ElementRef {
                id: set.id,
                title: set.name.clone(),
                status: set.status.clone(),
                edit_url: set.cp_edit_url.clone(),
                last_updated: format_iso8601(&set.date_updated),
            }),
            Element::Other { .. } => None,
        }
    }
}

fn format_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(ISO8601_FORMAT).to_string()
}

/// The one thing we need from the host: find an element by its URI.
///
/// `uri` is the element's canonical path without a leading slash
/// (`blog/my-post`). Returning None is normal: plenty of crawled pages
/// (assets, archives, external pages) have no element behind them.
pub trait ElementLookup: Send + Sync {
    fn element_by_uri(&self, uri: &str) -> Option<Element>;
}
