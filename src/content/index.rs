// src/content/index.rs
// =============================================================================
// ContentIndex: an in-memory ElementLookup keyed by URI.
//
// The CLI has no CMS database behind it, so it reads an export of the site's
// elements from a JSON file instead:
//
//   {
//     "elements": [
//       { "kind": "entry", "id": 12, "uri": "blog/my-post", "title": "My post",
//         "status": "live", "cp_edit_url": "https://example.com/admin/entries/blog/12",
//         "date_updated": "2019-05-01T10:00:00Z" },
//       { "kind": "global_set", "id": 3, "uri": "footer", "name": "Footer", ... }
//     ]
//   }
//
// Elements without a "uri" can't be reached by a crawled URL and are skipped.
// When two elements share a URI the first one wins.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use super::element::{Element, ElementLookup, Entry, GlobalSet};
use crate::error::GatewayError;

/// URI the host stores for the site's homepage
pub const HOMEPAGE_URI: &str = "__home__";

#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(default)]
    elements: Vec<ElementRecord>,
}

#[derive(Debug, Deserialize)]
struct ElementRecord {
    kind: String,
    id: u64,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    cp_edit_url: String,
    date_updated: DateTime<Utc>,
}

impl ElementRecord {
    fn into_element(self) -> Element {
        match self.kind.to_ascii_lowercase().as_str() {
            "entry" => Element::Entry(Entry {
                id: self.id,
                title: self.title.unwrap_or_default(),
                status: self.status,
                cp_edit_url: self.cp_edit_url,
                date_updated: self.date_updated,
            }),
            "global_set" | "globalset" | "global-set" => Element::GlobalSet(GlobalSet {
                id: self.id,
                name: self.name.or(self.title).unwrap_or_default(),
                status: self.status,
                cp_edit_url: self.cp_edit_url,
                date_updated: self.date_updated,
            }),
            _ => Element::Other {
                id: self.id,
                kind: self.kind,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    by_uri: HashMap<String, Element>,
}

impl ContentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds an element under `uri` unless that URI is already taken.
    // Stored URIs get the same treatment as resolved ones: one leading
    // slash dropped, and "" means the homepage.
    pub fn insert(&mut self, uri: impl Into<String>, element: Element) {
        let uri = normalize_uri(uri.into());
        if self.by_uri.contains_key(&uri) {
            debug!(%uri, id = element.id(), "duplicate URI in content index, keeping the first element");
            return;
        }
        self.by_uri.insert(uri, element);
    }

    pub fn len(&self) -> usize {
        self.by_uri.len()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: IndexFile = serde_json::from_str(json)?;
        let mut index = Self::new();

        for record in file.elements {
            match record.uri.clone() {
                Some(uri) => index.insert(uri, record.into_element()),
                None => debug!(id = record.id, kind = %record.kind, "element has no URI, skipping"),
            }
        }

        Ok(index)
    }

    pub fn load(path: &Path) -> Result<Self, GatewayError> {
        let json = std::fs::read_to_string(path).map_err(|source| GatewayError::ContentIndexIo {
            path: path.to_path_buf(),
            source,
        })?;

        let index = Self::from_json(&json).map_err(|source| GatewayError::ContentIndexFormat {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), elements = index.len(), "loaded content index");
        Ok(index)
    }
}

fn normalize_uri(uri: String) -> String {
    let uri = match uri.strip_prefix('/') {
        Some(rest) => rest.to_string(),
        None => uri,
    };
    if uri.is_empty() {
        HOMEPAGE_URI.to_string()
    } else {
        uri
    }
}

impl ElementLookup for ContentIndex {
    fn element_by_uri(&self, uri: &str) -> Option<Element> {
        // The homepage is stored under a placeholder, not under ""
        let uri = if uri.is_empty() { HOMEPAGE_URI } else { uri };
        self.by_uri.get(uri).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const INDEX_JSON: &str = r#"{
        "elements": [
            {"kind": "entry", "id": 12, "uri": "blog/my-post", "title": "My post",
             "status": "live", "cp_edit_url": "https://example.com/admin/entries/blog/12",
             "date_updated": "2019-05-01T10:00:00Z"},
            {"kind": "entry", "id": 1, "uri": "__home__", "title": "Home",
             "status": "live", "cp_edit_url": "https://example.com/admin/entries/pages/1",
             "date_updated": "2019-05-01T10:00:00Z"},
            {"kind": "GlobalSet", "id": 3, "uri": "footer", "name": "Footer",
             "status": "enabled", "cp_edit_url": "https://example.com/admin/globals/footer",
             "date_updated": "2019-05-02T08:30:00Z"},
            {"kind": "category", "id": 40, "uri": "news", "title": "News",
             "date_updated": "2019-05-02T08:30:00Z"},
            {"kind": "entry", "id": 50, "title": "No uri",
             "date_updated": "2019-05-02T08:30:00Z"},
            {"kind": "entry", "id": 51, "uri": "blog/my-post", "title": "Duplicate",
             "date_updated": "2019-05-02T08:30:00Z"}
        ]
    }"#;

    #[test]
    fn test_from_json_maps_kinds() {
        let index = ContentIndex::from_json(INDEX_JSON).unwrap();
        assert_eq!(index.len(), 4);

        assert!(matches!(index.element_by_uri("blog/my-post"), Some(Element::Entry(e)) if e.id == 12));
        assert!(matches!(index.element_by_uri("footer"), Some(Element::GlobalSet(g)) if g.name == "Footer"));
        assert!(matches!(
            index.element_by_uri("news"),
            Some(Element::Other { id: 40, .. })
        ));
    }

    #[test]
    fn test_missing_uri_is_a_miss() {
        let index = ContentIndex::from_json(INDEX_JSON).unwrap();
        assert_eq!(index.element_by_uri("does/not/exist"), None);
    }

    #[test]
    fn test_empty_uri_finds_homepage() {
        let index = ContentIndex::from_json(INDEX_JSON).unwrap();
        assert_eq!(index.element_by_uri("").map(|e| e.id()), Some(1));
    }

    #[test]
    fn test_stored_uris_are_normalized_like_resolved_ones() {
        let index = ContentIndex::from_json(
            r#"{"elements": [
                {"kind": "entry", "id": 2, "uri": "", "title": "Home",
                 "date_updated": "2019-05-01T10:00:00Z"},
                {"kind": "entry", "id": 3, "uri": "/about", "title": "About",
                 "date_updated": "2019-05-01T10:00:00Z"},
                {"kind": "entry", "id": 4, "uri": "//legacy", "title": "Legacy",
                 "date_updated": "2019-05-01T10:00:00Z"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(index.element_by_uri("").map(|e| e.id()), Some(2));
        assert_eq!(index.element_by_uri("about").map(|e| e.id()), Some(3));
        // "https://example.com//legacy" resolves to "/legacy"
        assert_eq!(index.element_by_uri("/legacy").map(|e| e.id()), Some(4));
        assert_eq!(index.element_by_uri("legacy"), None);
    }

    #[test]
    fn test_empty_index_always_misses() {
        let index = ContentIndex::new();
        assert_eq!(index.element_by_uri("blog/my-post"), None);
        assert_eq!(ContentIndex::from_json("{}").unwrap().len(), 0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(INDEX_JSON.as_bytes()).unwrap();

        let index = ContentIndex::load(file.path()).unwrap();
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_load_reports_bad_files() {
        let missing = ContentIndex::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(missing, Err(GatewayError::ContentIndexIo { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let invalid = ContentIndex::load(file.path());
        assert!(matches!(invalid, Err(GatewayError::ContentIndexFormat { .. })));
    }
}
