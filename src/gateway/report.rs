// src/gateway/report.rs
// =============================================================================
// ReportRow: one line of the broken links or mixed content report, with the
// content element (if any) the panel can link to.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::content::ElementRef;
use crate::ohdear::{BrokenLink, MixedContentItem};

/// What Oh Dear found on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum Finding {
    /// A link that doesn't work; status_code is None if nothing answered
    BrokenLink { status_code: Option<u16> },
    /// An http:// resource on an https:// page, pulled in by `element_name`
    MixedContent { element_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// The broken link target, or the insecure resource URL
    pub source_url: String,
    /// The page the problem was found on
    pub found_on_url: String,
    #[serde(flatten)]
    pub finding: Finding,
    /// The element rendering `found_on_url`, if we could find one
    pub element: Option<ElementRef>,
}

impl ReportRow {
    pub fn from_broken_link(link: BrokenLink, element: Option<ElementRef>) -> Self {
        Self {
            source_url: link.crawled_url,
            found_on_url: link.found_on_url,
            finding: Finding::BrokenLink {
                status_code: link.status_code,
            },
            element,
        }
    }

    pub fn from_mixed_content(item: MixedContentItem, element: Option<ElementRef>) -> Self {
        Self {
            source_url: item.mixed_content_url,
            found_on_url: item.found_on_url,
            finding: Finding::MixedContent {
                element_name: item.element_name,
            },
            element,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.element.is_some()
    }
}
