// src/ohdear/client.rs
// =============================================================================
// OhDearClient: the MonitoringApi implementation that talks HTTPS to
// https://ohdear.app/api/.
//
// Every request:
// - carries the API token as a bearer token
// - asks for JSON (Accept: application/json)
// - times out after 30 seconds (no retries, the user just clicks again)
//
// Responses:
// - 2xx: body decoded into the resource type. Collection endpoints wrap
//   their items in {"data": [...]}, single resources come back bare.
// - anything else: RemoteApiError with the status code and the "message"
//   Oh Dear puts in its error bodies.
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::api::{ApiResult, MonitoringApi};
use super::types::{
    BrokenLink, CertificateHealth, Check, DowntimePeriod, MaintenancePeriod, MixedContentItem,
    Site, Uptime, UptimeSplit,
};
use crate::error::RemoteApiError;

const DEFAULT_BASE_URL: &str = "https://ohdear.app/api/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("ohdear-panel/", env!("CARGO_PKG_VERSION"));

// Collection endpoints answer with {"data": [...]}
#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

// Error bodies look like {"message": "...", "errors": {...}}
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OhDearClient {
    http: Client,
    api_token: String,
    base_url: String,
}

impl OhDearClient {
    pub fn new(api_token: &str) -> Result<Self, reqwest::Error> {
        Self::with_base_url(api_token, DEFAULT_BASE_URL)
    }

    // Same client against another API root (a staging host, a local mock)
    pub fn with_base_url(api_token: &str, base_url: &str) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            api_token: api_token.to_string(),
            base_url: normalize_base_url(base_url),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = self.endpoint(path);
        debug!(%method, %url, "Oh Dear request");

        self.http
            .request(method, url)
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json")
    }

    // Sends the request and hands back the body of a 2xx response
    async fn send(&self, request: RequestBuilder) -> ApiResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RemoteApiError::new(
                status.as_u16(),
                error_message(status, &body),
            ));
        }

        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<T> {
        let body = self
            .send(self.request(reqwest::Method::GET, path).query(query))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_collection<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<Vec<T>> {
        let envelope: DataEnvelope<T> = self.get(path, query).await?;
        Ok(envelope.data)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: Option<serde_json::Value>,
    ) -> ApiResult<T> {
        let body = self.send(self.post_request(path, payload)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    // POST whose response body we don't need (stop-maintenance answers 204)
    async fn post_ignoring_body(&self, path: &str) -> ApiResult<()> {
        self.send(self.post_request(path, None)).await?;
        Ok(())
    }

    fn post_request(&self, path: &str, payload: Option<serde_json::Value>) -> RequestBuilder {
        let request = self.request(reqwest::Method::POST, path);
        match payload {
            Some(payload) => request.json(&payload),
            None => request,
        }
    }
}

#[async_trait]
impl MonitoringApi for OhDearClient {
    async fn sites(&self) -> ApiResult<Vec<Site>> {
        self.get_collection("sites", &[]).await
    }

    async fn site(&self, site_id: u64) -> ApiResult<Site> {
        self.get(&format!("sites/{}", site_id), &[]).await
    }

    async fn maintenance_periods(&self, site_id: u64) -> ApiResult<Vec<MaintenancePeriod>> {
        self.get_collection(&format!("sites/{}/maintenance-periods", site_id), &[])
            .await
    }

    async fn create_site_maintenance(
        &self,
        site_id: u64,
        starts_at: &str,
        ends_at: &str,
    ) -> ApiResult<MaintenancePeriod> {
        let payload = json!({
            "site_id": site_id,
            "starts_at": starts_at,
            "ends_at": ends_at,
        });
        self.post("maintenance-periods", Some(payload)).await
    }

    async fn delete_site_maintenance(&self, maintenance_period_id: u64) -> ApiResult<()> {
        let path = format!("maintenance-periods/{}", maintenance_period_id);
        self.send(self.request(reqwest::Method::DELETE, &path)).await?;
        Ok(())
    }

    async fn start_site_maintenance(
        &self,
        site_id: u64,
        stop_maintenance_after_seconds: u64,
    ) -> ApiResult<MaintenancePeriod> {
        let payload = json!({ "stop_maintenance_after_seconds": stop_maintenance_after_seconds });
        self.post(&format!("sites/{}/start-maintenance", site_id), Some(payload))
            .await
    }

    async fn stop_site_maintenance(&self, site_id: u64) -> ApiResult<()> {
        self.post_ignoring_body(&format!("sites/{}/stop-maintenance", site_id))
            .await
    }

    async fn uptime(
        &self,
        site_id: u64,
        started_at: &str,
        ended_at: &str,
        split: UptimeSplit,
    ) -> ApiResult<Vec<Uptime>> {
        // Unlike the other collections, uptime comes back as a bare array
        self.get(
            &format!("sites/{}/uptime", site_id),
            &[
                ("filter[started_at]", started_at),
                ("filter[ended_at]", ended_at),
                ("split", split.as_str()),
            ],
        )
        .await
    }

    async fn downtime(
        &self,
        site_id: u64,
        started_at: &str,
        ended_at: &str,
    ) -> ApiResult<Vec<DowntimePeriod>> {
        self.get_collection(
            &format!("sites/{}/downtime", site_id),
            &[
                ("filter[started_at]", started_at),
                ("filter[ended_at]", ended_at),
            ],
        )
        .await
    }

    async fn broken_links(&self, site_id: u64) -> ApiResult<Vec<BrokenLink>> {
        self.get_collection(&format!("broken-links/{}", site_id), &[])
            .await
    }

    async fn mixed_content(&self, site_id: u64) -> ApiResult<Vec<MixedContentItem>> {
        self.get_collection(&format!("mixed-content/{}", site_id), &[])
            .await
    }

    async fn certificate_health(&self, site_id: u64) -> ApiResult<CertificateHealth> {
        self.get(&format!("certificate-health/{}", site_id), &[]).await
    }

    async fn enable_check(&self, check_id: u64) -> ApiResult<Check> {
        self.post(&format!("checks/{}/enable", check_id), None).await
    }

    async fn disable_check(&self, check_id: u64) -> ApiResult<Check> {
        self.post(&format!("checks/{}/disable", check_id), None).await
    }

    async fn request_run(&self, check_id: u64) -> ApiResult<Check> {
        self.post(&format!("checks/{}/request-run", check_id), None)
            .await
    }
}

fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

// Picks the most useful message out of an error response:
// the JSON "message" field, then the raw body, then the status reason
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let client = OhDearClient::new("token").unwrap();
        assert_eq!(client.endpoint("sites/42"), "https://ohdear.app/api/sites/42");
        assert_eq!(client.endpoint("/sites"), "https://ohdear.app/api/sites");
    }

    #[test]
    fn test_custom_base_url_gets_trailing_slash() {
        let client = OhDearClient::with_base_url("token", "http://localhost:8080/api").unwrap();
        assert_eq!(
            client.endpoint("broken-links/1"),
            "http://localhost:8080/api/broken-links/1"
        );
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        let message = error_message(StatusCode::UNAUTHORIZED, r#"{"message": "Unauthenticated."}"#);
        assert_eq!(message, "Unauthenticated.");
    }

    #[test]
    fn test_error_message_falls_back_to_body_then_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream went away"),
            "upstream went away"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, "  "), "Not Found");
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, r#"{"message": ""}"#),
            r#"{"message": ""}"#
        );
    }

    #[test]
    fn test_collection_envelope_unwraps_data() {
        let json = r#"{"data": [{"started_at": "2019-09-01 10:00:00", "ended_at": null}], "links": {}}"#;
        let envelope: DataEnvelope<DowntimePeriod> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].ended_at, None);
    }

    // The tests below run the real client against a local server that
    // answers exactly one request and hands back what it received.

    struct Served {
        request_line: String,
        headers: String,
        body: String,
    }

    async fn serve_once(status: &'static str, body: &'static str) -> (OhDearClient, JoinHandle<Served>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api", listener.local_addr().unwrap());
        let client = OhDearClient::with_base_url("test-token", &base_url).unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let served = read_request(&mut socket).await;

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            served
        });

        (client, handle)
    }

    // Reads one request: head up to the blank line, then Content-Length bytes of body
    async fn read_request(socket: &mut TcpStream) -> Served {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let head_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request head was complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let body_start = head_end + 4;
        while buf.len() < body_start + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request body was complete");
            buf.extend_from_slice(&chunk[..n]);
        }

        let (request_line, headers) = head.split_once("\r\n").unwrap_or((head.as_str(), ""));
        Served {
            request_line: request_line.to_string(),
            headers: headers.to_ascii_lowercase(),
            body: String::from_utf8_lossy(&buf[body_start..body_start + content_length]).into_owned(),
        }
    }

    #[tokio::test]
    async fn test_error_status_and_message_come_from_the_response() {
        let (client, server) = serve_once("401 Unauthorized", r#"{"message":"Unauthenticated."}"#).await;

        let err = client.broken_links(42).await.unwrap_err();
        assert_eq!(err, RemoteApiError::new(401, "Unauthenticated."));

        let served = server.await.unwrap();
        assert_eq!(served.request_line, "GET /api/broken-links/42 HTTP/1.1");
        assert!(served.headers.contains("authorization: bearer test-token"));
        assert!(served.headers.contains("accept: application/json"));
    }

    #[tokio::test]
    async fn test_server_error_without_json_keeps_the_body() {
        let (client, server) = serve_once("503 Service Unavailable", "down for maintenance").await;

        let err = client.site(42).await.unwrap_err();
        assert_eq!(err.status_code, Some(503));
        assert_eq!(err.message, "down for maintenance");
        assert_eq!(server.await.unwrap().request_line, "GET /api/sites/42 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_broken_links_unwraps_data_envelope() {
        let (client, server) = serve_once(
            "200 OK",
            r#"{"data": [{"crawled_url": "https://example.com/gone", "found_on_url": "https://example.com/blog/post", "status_code": 404}]}"#,
        )
        .await;

        let links = client.broken_links(42).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].crawled_url, "https://example.com/gone");
        assert_eq!(links[0].status_code, Some(404));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_mixed_content_path() {
        let (client, server) = serve_once("200 OK", r#"{"data": []}"#).await;

        assert!(client.mixed_content(42).await.unwrap().is_empty());
        assert_eq!(server.await.unwrap().request_line, "GET /api/mixed-content/42 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_uptime_sends_filters_and_reads_bare_array() {
        let (client, server) = serve_once(
            "200 OK",
            r#"[{"datetime": "2019-09-01 00:00:00", "uptime_percentage": 99.98}]"#,
        )
        .await;

        let uptime = client
            .uptime(42, "20190901000000", "20190930235959", UptimeSplit::Day)
            .await
            .unwrap();
        assert_eq!(uptime.len(), 1);
        assert_eq!(uptime[0].uptime_percentage, 99.98);

        assert_eq!(
            server.await.unwrap().request_line,
            "GET /api/sites/42/uptime?filter%5Bstarted_at%5D=20190901000000&filter%5Bended_at%5D=20190930235959&split=day HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_downtime_sends_filters_without_split() {
        let (client, server) = serve_once(
            "200 OK",
            r#"{"data": [{"started_at": "2019-09-02 10:00:00", "ended_at": "2019-09-02 10:05:00"}]}"#,
        )
        .await;

        let downtime = client
            .downtime(42, "20190901000000", "20190930235959")
            .await
            .unwrap();
        assert_eq!(downtime[0].ended_at.as_deref(), Some("2019-09-02 10:05:00"));

        assert_eq!(
            server.await.unwrap().request_line,
            "GET /api/sites/42/downtime?filter%5Bstarted_at%5D=20190901000000&filter%5Bended_at%5D=20190930235959 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_create_maintenance_posts_site_and_window() {
        let (client, server) = serve_once(
            "201 Created",
            r#"{"id": 9, "site_id": 42, "starts_at": "2019-09-16 10:00", "ends_at": "2019-09-16 11:00"}"#,
        )
        .await;

        let period = client
            .create_site_maintenance(42, "2019-09-16 10:00", "2019-09-16 11:00")
            .await
            .unwrap();
        assert_eq!(period.id, 9);

        let served = server.await.unwrap();
        assert_eq!(served.request_line, "POST /api/maintenance-periods HTTP/1.1");
        let payload: serde_json::Value = serde_json::from_str(&served.body).unwrap();
        assert_eq!(
            payload,
            json!({"site_id": 42, "starts_at": "2019-09-16 10:00", "ends_at": "2019-09-16 11:00"})
        );
    }

    #[tokio::test]
    async fn test_start_maintenance_sends_duration() {
        let (client, server) = serve_once(
            "200 OK",
            r#"{"id": 10, "site_id": 42, "starts_at": "2019-09-16 10:00", "ends_at": null}"#,
        )
        .await;

        let period = client.start_site_maintenance(42, 3600).await.unwrap();
        assert_eq!(period.ends_at, None);

        let served = server.await.unwrap();
        assert_eq!(served.request_line, "POST /api/sites/42/start-maintenance HTTP/1.1");
        let payload: serde_json::Value = serde_json::from_str(&served.body).unwrap();
        assert_eq!(payload, json!({"stop_maintenance_after_seconds": 3600}));
    }

    #[tokio::test]
    async fn test_delete_maintenance_accepts_no_content() {
        let (client, server) = serve_once("204 No Content", "").await;

        client.delete_site_maintenance(3).await.unwrap();
        assert_eq!(
            server.await.unwrap().request_line,
            "DELETE /api/maintenance-periods/3 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_stop_maintenance_accepts_no_content() {
        let (client, server) = serve_once("204 No Content", "").await;

        client.stop_site_maintenance(42).await.unwrap();
        assert_eq!(
            server.await.unwrap().request_line,
            "POST /api/sites/42/stop-maintenance HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_request_run_posts_to_check() {
        let (client, server) = serve_once(
            "200 OK",
            r#"{"id": 7, "type": "broken_links", "label": "Broken links", "enabled": true}"#,
        )
        .await;

        let check = client.request_run(7).await.unwrap();
        assert_eq!(check.check_type, "broken_links");
        assert_eq!(
            server.await.unwrap().request_line,
            "POST /api/checks/7/request-run HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_undecodable_success_body_has_no_status() {
        let (client, server) = serve_once("200 OK", "<html>not json</html>").await;

        let err = client.certificate_health(42).await.unwrap_err();
        assert_eq!(err.status_code, None);
        assert!(err.message.starts_with("unexpected response body"));
        assert_eq!(
            server.await.unwrap().request_line,
            "GET /api/certificate-health/42 HTTP/1.1"
        );
    }
}
