// src/gateway/service.rs
// =============================================================================
// MonitoringGateway: everything the panel can do with Oh Dear, for one site.
//
// The gateway holds three things, all fixed at construction:
// - the API (an OhDearClient in production, a fake in tests)
// - the host's element lookup
// - the Oh Dear site id the settings point at
//
// Each operation is one awaited API call. Nothing is retried or cached, and
// API errors come back to the caller exactly as the client produced them.
// The two report operations then resolve every row's page to a content
// element, one lookup per row.
// =============================================================================

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::report::ReportRow;
use super::resolve::resolve_element;
use crate::content::ElementLookup;
use crate::error::{GatewayError, RemoteApiError};
use crate::ohdear::{
    ApiResult, CertificateHealth, Check, DowntimePeriod, MaintenancePeriod, MonitoringApi,
    OhDearClient, Site, Uptime, UptimeSplit,
};
use crate::settings::Settings;

/// How long `start_maintenance_period` keeps maintenance on by default
pub const DEFAULT_MAINTENANCE_SECONDS: u64 = 60 * 60;

pub struct MonitoringGateway {
    api: Arc<dyn MonitoringApi>,
    elements: Arc<dyn ElementLookup>,
    site_id: u64,
}

impl MonitoringGateway {
    // Builds a gateway backed by the real Oh Dear API.
    // An empty token fails here instead of on the first request.
    pub fn new(
        api_token: &str,
        site_id: u64,
        elements: Arc<dyn ElementLookup>,
    ) -> Result<Self, GatewayError> {
        let api_token = require_token(api_token)?;
        let client = OhDearClient::new(api_token)?;
        Ok(Self::with_api(Arc::new(client), site_id, elements))
    }

    // Same as new(), against a different API root
    pub fn connect(
        api_token: &str,
        api_url: &str,
        site_id: u64,
        elements: Arc<dyn ElementLookup>,
    ) -> Result<Self, GatewayError> {
        let api_token = require_token(api_token)?;
        let client = OhDearClient::with_base_url(api_token, api_url)?;
        Ok(Self::with_api(Arc::new(client), site_id, elements))
    }

    // Validates the settings and builds a gateway from them
    pub fn from_settings(
        settings: &Settings,
        api_url: Option<&str>,
        elements: Arc<dyn ElementLookup>,
    ) -> Result<Self, GatewayError> {
        require_token(&settings.api_token)?;
        settings.validate()?;
        let site_id = settings.site_id()?;

        match api_url {
            Some(api_url) => Self::connect(&settings.api_token, api_url, site_id, elements),
            None => Self::new(&settings.api_token, site_id, elements),
        }
    }

    pub fn with_api(
        api: Arc<dyn MonitoringApi>,
        site_id: u64,
        elements: Arc<dyn ElementLookup>,
    ) -> Self {
        Self {
            api,
            elements,
            site_id,
        }
    }

    pub fn site_id(&self) -> u64 {
        self.site_id
    }

    #[instrument(skip(self), fields(site_id = self.site_id))]
    pub async fn create_maintenance_period(
        &self,
        starts_at: &str,
        ends_at: &str,
    ) -> ApiResult<MaintenancePeriod> {
        remote(
            "create_maintenance_period",
            self.api
                .create_site_maintenance(self.site_id, starts_at, ends_at),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_maintenance_period(&self, maintenance_period_id: u64) -> ApiResult<()> {
        remote(
            "delete_maintenance_period",
            self.api.delete_site_maintenance(maintenance_period_id),
        )
        .await
    }

    #[instrument(skip(self), fields(site_id = self.site_id))]
    pub async fn start_maintenance_period(
        &self,
        stop_maintenance_after_seconds: u64,
    ) -> ApiResult<MaintenancePeriod> {
        remote(
            "start_maintenance_period",
            self.api
                .start_site_maintenance(self.site_id, stop_maintenance_after_seconds),
        )
        .await
    }

    #[instrument(skip(self), fields(site_id = self.site_id))]
    pub async fn stop_maintenance_period(&self) -> ApiResult<()> {
        remote(
            "stop_maintenance_period",
            self.api.stop_site_maintenance(self.site_id),
        )
        .await
    }

    #[instrument(skip(self), fields(site_id = self.site_id))]
    pub async fn list_maintenance_periods(&self) -> ApiResult<Vec<MaintenancePeriod>> {
        remote(
            "list_maintenance_periods",
            self.api.maintenance_periods(self.site_id),
        )
        .await
    }

    // All sites the token can see, not just the configured one
    #[instrument(skip(self))]
    pub async fn list_sites(&self) -> ApiResult<Vec<Site>> {
        remote("list_sites", self.api.sites()).await
    }

    #[instrument(skip(self), fields(site_id = self.site_id))]
    pub async fn get_site(&self) -> ApiResult<Site> {
        remote("get_site", self.api.site(self.site_id)).await
    }

    // Timestamps are YYYYMMDDHHmmss and go to the API as given;
    // a malformed one comes back as the API's own error.
    #[instrument(skip(self), fields(site_id = self.site_id))]
    pub async fn get_uptime(
        &self,
        started_at: &str,
        ended_at: &str,
        split: UptimeSplit,
    ) -> ApiResult<Vec<Uptime>> {
        remote(
            "get_uptime",
            self.api.uptime(self.site_id, started_at, ended_at, split),
        )
        .await
    }

    #[instrument(skip(self), fields(site_id = self.site_id))]
    pub async fn get_downtime(
        &self,
        started_at: &str,
        ended_at: &str,
    ) -> ApiResult<Vec<DowntimePeriod>> {
        remote(
            "get_downtime",
            self.api.downtime(self.site_id, started_at, ended_at),
        )
        .await
    }

    #[instrument(skip(self), fields(site_id = self.site_id))]
    pub async fn get_broken_links(&self) -> ApiResult<Vec<ReportRow>> {
        let links = remote("get_broken_links", self.api.broken_links(self.site_id)).await?;
        debug!(count = links.len(), "resolving broken links");

        Ok(links
            .into_iter()
            .map(|link| {
                let element = resolve_element(self.elements.as_ref(), &link.found_on_url);
                ReportRow::from_broken_link(link, element)
            })
            .collect())
    }

    #[instrument(skip(self), fields(site_id = self.site_id))]
    pub async fn get_mixed_content(&self) -> ApiResult<Vec<ReportRow>> {
        let items = remote("get_mixed_content", self.api.mixed_content(self.site_id)).await?;
        debug!(count = items.len(), "resolving mixed content");

        Ok(items
            .into_iter()
            .map(|item| {
                let element = resolve_element(self.elements.as_ref(), &item.found_on_url);
                ReportRow::from_mixed_content(item, element)
            })
            .collect())
    }

    #[instrument(skip(self), fields(site_id = self.site_id))]
    pub async fn get_certificate_health(&self) -> ApiResult<CertificateHealth> {
        remote(
            "get_certificate_health",
            self.api.certificate_health(self.site_id),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn disable_check(&self, check_id: u64) -> ApiResult<Check> {
        remote("disable_check", self.api.disable_check(check_id)).await
    }

    #[instrument(skip(self))]
    pub async fn enable_check(&self, check_id: u64) -> ApiResult<Check> {
        remote("enable_check", self.api.enable_check(check_id)).await
    }

    #[instrument(skip(self))]
    pub async fn request_run(&self, check_id: u64) -> ApiResult<Check> {
        remote("request_run", self.api.request_run(check_id)).await
    }
}

fn require_token(api_token: &str) -> Result<&str, GatewayError> {
    let api_token = api_token.trim();
    if api_token.is_empty() {
        return Err(GatewayError::MissingApiToken);
    }
    Ok(api_token)
}

// Awaits an API call and logs a failure before passing it on unchanged
async fn remote<T>(
    operation: &'static str,
    call: impl Future<Output = Result<T, RemoteApiError>>,
) -> Result<T, RemoteApiError> {
    call.await.map_err(|e| {
        warn!(operation, status = ?e.status_code, error = %e.message, "Oh Dear request failed");
        e
    })
}
