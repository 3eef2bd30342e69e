// src/content/mod.rs
// =============================================================================
// The host side of the integration: content elements and how to find them.
//
// Submodules:
// - element: Element kinds, the ElementRef projection, the ElementLookup trait
// - index: ContentIndex, a JSON-backed ElementLookup used by the CLI
// =============================================================================

mod element;
mod index;

pub use element::{ElementLookup, ElementRef};
#[cfg(test)]
pub use element::{Element, Entry, GlobalSet};
pub use index::ContentIndex;
