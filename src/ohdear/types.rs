// src/ohdear/types.rs
// =============================================================================
// Resources returned by the Oh Dear API.
//
// Field names follow the API's snake_case JSON. Optional fields are
// Option<T> or #[serde(default)] because Oh Dear omits or nulls them
// depending on the state of the site (e.g. a check that never ran has no
// latest_run_result yet).
// =============================================================================

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A monitored site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub sort_url: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub team_id: Option<u64>,
    #[serde(default)]
    pub latest_run_date: Option<String>,
    /// "succeeded", "warning" or "failed"
    #[serde(default)]
    pub summarized_check_result: Option<String>,
    #[serde(default)]
    pub checks: Vec<Check>,
}

/// One check (uptime, broken_links, certificate_health, ...) of a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub id: u64,
    #[serde(rename = "type")]
    pub check_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub latest_run_ended_at: Option<String>,
    #[serde(default)]
    pub latest_run_result: Option<String>,
}

/// A window in which Oh Dear does not send notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePeriod {
    pub id: u64,
    #[serde(default)]
    pub site_id: Option<u64>,
    pub starts_at: String,
    #[serde(default)]
    pub ends_at: Option<String>,
}

/// Uptime for one bucket of the requested split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uptime {
    pub datetime: String,
    pub uptime_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimePeriod {
    pub started_at: String,
    /// None while the site is still down
    #[serde(default)]
    pub ended_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokenLink {
    pub crawled_url: String,
    pub found_on_url: String,
    /// Missing when the crawler got no HTTP response at all
    #[serde(default)]
    pub status_code: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixedContentItem {
    pub mixed_content_url: String,
    pub found_on_url: String,
    /// The HTML element that pulls in the insecure resource (img, script, ...)
    pub element_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CertificateHealth {
    #[serde(default)]
    pub certificate_details: CertificateDetails,
    #[serde(default)]
    pub certificate_checks: Vec<CertificateCheck>,
    #[serde(default)]
    pub certificate_chain_issuers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CertificateDetails {
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub valid_from: String,
    #[serde(default)]
    pub valid_until: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateCheck {
    #[serde(rename = "type")]
    pub check_type: String,
    #[serde(default)]
    pub label: String,
    pub passed: bool,
}

impl CertificateHealth {
    pub fn all_checks_passed(&self) -> bool {
        self.certificate_checks.iter().all(|c| c.passed)
    }
}

/// Bucket size for uptime reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UptimeSplit {
    Hour,
    Day,
    #[default]
    Month,
}

impl UptimeSplit {
    pub fn as_str(&self) -> &'static str {
        match self {
            UptimeSplit::Hour => "hour",
            UptimeSplit::Day => "day",
            UptimeSplit::Month => "month",
        }
    }
}

impl fmt::Display for UptimeSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
