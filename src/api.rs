//! API client for the release-plan backend.
//!
//! An async HTTP client plus the command/message enums that connect the UI
//! event loop to the API worker task. All requests are one-shot with a
//! client-level timeout; a failed request surfaces as a single error
//! message and never as a partial state update.

use anyhow::{Context, Result};
use reqwest::Client;

use crate::models::{ConnectionProbe, CustomizeViewRequest, ReleasePlan};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// HTTP client for the release-plan backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the given base URL.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch the full release plan.
    pub async fn fetch_release_plan(&self) -> Result<ReleasePlan> {
        let url = format!("{}/api/release_plan", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to release plan endpoint")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "API error: {} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            );
        }

        response
            .json()
            .await
            .context("Failed to parse release plan response")
    }

    /// Submit view customization (view type + name filter) and get back the
    /// filtered plan.
    pub async fn customize_view(&self, request: &CustomizeViewRequest) -> Result<ReleasePlan> {
        let url = format!("{}/api/customize_view", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to send customize view request")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "API error: {} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            );
        }

        response
            .json()
            .await
            .context("Failed to parse customize view response")
    }

    /// Probe the backend's upstream-tracker connection. Used for the status
    /// indicator only; failures are not fatal.
    pub async fn test_connection(&self) -> Result<ConnectionProbe> {
        let url = format!("{}/api/test_connection", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send connection probe")?;

        // The endpoint reports failure with a 500 plus a JSON body; decode
        // the body either way.
        response
            .json()
            .await
            .context("Failed to parse connection probe response")
    }
}

/// Messages sent from the API worker to the UI event loop.
#[derive(Debug, Clone)]
pub enum ApiMessage {
    /// A release plan arrived (initial fetch, refresh, or filter response).
    PlanLoaded(ReleasePlan),
    /// A request failed; the current chart stays as-is.
    Error(String),
    /// Backend connection status changed.
    ConnectionStatus(bool),
}

/// Commands sent from the UI event loop to the API worker. The worker
/// processes them one at a time, so responses apply in submission order
/// and the last submitted filter deterministically wins.
#[derive(Debug, Clone)]
pub enum ApiCommand {
    /// Fetch the release plan.
    RefreshPlan,
    /// Submit filters and fetch the customized plan.
    ApplyFilters(CustomizeViewRequest),
    /// Probe backend connectivity.
    CheckConnection,
    /// Shut down the worker.
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ViewType;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const PLAN_BODY: &str = r#"{
        "epics": [{"id": 1, "name": "Checkout", "startDate": "2024-01-01T00:00:00Z", "endDate": "2024-02-01T00:00:00Z"}],
        "features": [],
        "sprints": []
    }"#;

    #[tokio::test]
    async fn fetch_release_plan_parses_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/release_plan")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PLAN_BODY)
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), 5).unwrap();
        let plan = client.fetch_release_plan().await.unwrap();

        assert_eq!(plan.epics.as_ref().unwrap().len(), 1);
        assert_eq!(plan.epics.as_ref().unwrap()[0].name, "Checkout");
        mock.assert();
    }

    #[tokio::test]
    async fn fetch_release_plan_surfaces_server_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/release_plan")
            .with_status(500)
            .with_body("tracker unavailable")
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), 5).unwrap();
        let err = client.fetch_release_plan().await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("500"), "unexpected error: {}", msg);
        assert!(msg.contains("tracker unavailable"), "unexpected error: {}", msg);
    }

    #[tokio::test]
    async fn fetch_release_plan_rejects_invalid_json() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/release_plan")
            .with_status(200)
            .with_body("<html>definitely not json</html>")
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), 5).unwrap();
        let err = client.fetch_release_plan().await.unwrap_err();
        assert!(err.to_string().contains("parse"), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn customize_view_posts_the_filter_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/customize_view")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "view_type": "epics",
                "filters": {"name": "auth"}
            })))
            .with_status(200)
            .with_body(PLAN_BODY)
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), 5).unwrap();
        let request = CustomizeViewRequest::new(ViewType::Epics, "auth");
        let plan = client.customize_view(&request).await.unwrap();

        assert_eq!(plan.epics.as_ref().unwrap().len(), 1);
        mock.assert();
    }

    #[tokio::test]
    async fn connection_probe_decodes_both_outcomes() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/test_connection")
            .with_status(200)
            .with_body(r#"{"status": "success", "message": "Connected"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), 5).unwrap();
        assert!(client.test_connection().await.unwrap().is_success());

        // The endpoint reports failure as a 500 with a JSON body.
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/test_connection")
            .with_status(500)
            .with_body(r#"{"status": "error", "message": "upstream unreachable"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), 5).unwrap();
        let probe = client.test_connection().await.unwrap();
        assert!(!probe.is_success());
        assert_eq!(probe.message, "upstream unreachable");
    }
}
