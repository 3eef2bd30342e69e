// src/gateway/mod.rs
// =============================================================================
// The gateway between the admin panel and Oh Dear.
//
// Submodules:
// - service: MonitoringGateway, one method per panel action
// - report: ReportRow, the rows of the broken link / mixed content reports
// - resolve: maps a reported URL back to a content element
// =============================================================================

mod report;
mod resolve;
mod service;

pub use report::{Finding, ReportRow};
pub use service::{MonitoringGateway, DEFAULT_MAINTENANCE_SECONDS};
