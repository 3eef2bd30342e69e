// src/gateway/resolve.rs
// =============================================================================
// Maps a URL reported by Oh Dear back to the content element that renders it.
//
// How it works:
// 1. Take the "found on" URL of a broken link / mixed content item
// 2. Parse it and keep only the path ("https://example.com/blog/post?x=1"
//    becomes "/blog/post")
// 3. Drop one leading slash ("blog/post"), that's how the host stores URIs
// 4. Ask the host for the element with exactly that URI
// 5. Project it to an ElementRef if it's an entry or a global set
//
// Every "no" along the way (unparseable URL, no element, unsupported kind)
// ends in None. A report row without an element is still a useful row.
//
// We deliberately do not fall back to a full-text search of global set
// fields: exact URI match only.
// =============================================================================

use tracing::debug;
use url::Url;

use crate::content::{ElementLookup, ElementRef};

// Extracts the host-style URI from an absolute URL.
//
// Returns None when the URL can't be parsed (Oh Dear only reports absolute
// URLs, so this means garbage in the report).
pub fn uri_from_url(found_on_url: &str) -> Option<String> {
    let url = match Url::parse(found_on_url) {
        Ok(url) => url,
        Err(e) => {
            debug!(url = %found_on_url, error = %e, "could not parse found-on URL");
            return None;
        }
    };

    let path = url.path();
    Some(path.strip_prefix('/').unwrap_or(path).to_string())
}

// Finds and projects the element behind `found_on_url`
pub fn resolve_element(lookup: &dyn ElementLookup, found_on_url: &str) -> Option<ElementRef> {
    let uri = uri_from_url(found_on_url)?;

    let Some(element) = lookup.element_by_uri(&uri) else {
        debug!(%uri, "no element for URI");
        return None;
    };

    let projected = element.to_element_ref();
    if projected.is_none() {
        debug!(%uri, kind = element.kind(), id = element.id(), "element kind is not linked");
    }
    projected
}
