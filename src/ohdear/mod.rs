// src/ohdear/mod.rs
// =============================================================================
// Typed access to the Oh Dear monitoring API.
//
// Submodules:
// - api: the MonitoringApi trait (what the gateway depends on)
// - client: OhDearClient, the reqwest-backed implementation
// - types: the resources the API returns
// =============================================================================

mod api;
mod client;
mod types;

pub use api::{ApiResult, MonitoringApi};
pub use client::OhDearClient;
pub use types::{
    BrokenLink, CertificateHealth, Check, DowntimePeriod, MaintenancePeriod, MixedContentItem,
    Site, Uptime, UptimeSplit,
};
