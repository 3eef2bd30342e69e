// src/settings/mod.rs
// =============================================================================
// Plugin settings: the API token and the selected Oh Dear site.
//
// The host (admin panel, or our CLI) fills a Settings value, validates it,
// and only then builds a MonitoringGateway from it.
// =============================================================================

mod model;

pub use model::Settings;
