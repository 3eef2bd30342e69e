// src/ohdear/api.rs
// =============================================================================
// The MonitoringApi trait: every Oh Dear call the panel makes, one method each.
//
// The gateway only talks to this trait, never to reqwest directly. OhDearClient
// (client.rs) is the real implementation; tests plug in a fake that returns
// canned data, so nothing in the test suite needs the network.
// =============================================================================

use async_trait::async_trait;

use super::types::{
    BrokenLink, CertificateHealth, Check, DowntimePeriod, MaintenancePeriod, MixedContentItem,
    Site, Uptime, UptimeSplit,
};
use crate::error::RemoteApiError;

pub type ApiResult<T> = Result<T, RemoteApiError>;

#[async_trait]
pub trait MonitoringApi: Send + Sync {
    async fn sites(&self) -> ApiResult<Vec<Site>>;

    async fn site(&self, site_id: u64) -> ApiResult<Site>;

    async fn maintenance_periods(&self, site_id: u64) -> ApiResult<Vec<MaintenancePeriod>>;

    /// `starts_at` / `ends_at` are `YYYY-MM-DD HH:MM`, passed through untouched
    async fn create_site_maintenance(
        &self,
        site_id: u64,
        starts_at: &str,
        ends_at: &str,
    ) -> ApiResult<MaintenancePeriod>;

    async fn delete_site_maintenance(&self, maintenance_period_id: u64) -> ApiResult<()>;

    async fn start_site_maintenance(
        &self,
        site_id: u64,
        stop_maintenance_after_seconds: u64,
    ) -> ApiResult<MaintenancePeriod>;

    async fn stop_site_maintenance(&self, site_id: u64) -> ApiResult<()>;

    /// `started_at` / `ended_at` are `YYYYMMDDHHmmss`
    async fn uptime(
        &self,
        site_id: u64,
        started_at: &str,
        ended_at: &str,
        split: UptimeSplit,
    ) -> ApiResult<Vec<Uptime>>;

    async fn downtime(
        &self,
        site_id: u64,
        started_at: &str,
        ended_at: &str,
    ) -> ApiResult<Vec<DowntimePeriod>>;

    async fn broken_links(&self, site_id: u64) -> ApiResult<Vec<BrokenLink>>;

    async fn mixed_content(&self, site_id: u64) -> ApiResult<Vec<MixedContentItem>>;

    async fn certificate_health(&self, site_id: u64) -> ApiResult<CertificateHealth>;

    async fn enable_check(&self, check_id: u64) -> ApiResult<Check>;

    async fn disable_check(&self, check_id: u64) -> ApiResult<Check>;

    async fn request_run(&self, check_id: u64) -> ApiResult<Check>;
}
