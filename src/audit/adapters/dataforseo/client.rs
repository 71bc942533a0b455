//! HTTP client for the DataForSEO on-page API.

use super::wire;
use crate::audit::domain::{CrawlParameters, FacetKind, FacetRows, TargetUrl, VendorTaskId};
use crate::audit::ports::{
    AnalysisClient, AnalysisClientError, AnalysisClientResult, ReadyTask, TaskReceipt,
    VendorTaskListItem,
};
use crate::config::VendorCredentials;
use async_trait::async_trait;
use chrono::{Months, Utc};
use serde_json::{Value, json};
use tracing::warn;

/// Production base URL of the vendor API.
pub const API_BASE_URL: &str = "https://api.dataforseo.com/v3";

/// Vendor task ids listed per `id_list` request.
const ID_LIST_LIMIT: u32 = 100;

/// [`AnalysisClient`] backed by the DataForSEO on-page HTTP API.
///
/// Every request authenticates with HTTP basic auth using the configured
/// vendor credentials.
#[derive(Debug, Clone)]
pub struct DataForSeoClient {
    http: reqwest::Client,
    base_url: String,
    credentials: VendorCredentials,
}

impl DataForSeoClient {
    /// Creates a client against the production vendor API.
    #[must_use]
    pub fn new(credentials: VendorCredentials) -> Self {
        Self::with_base_url(credentials, API_BASE_URL)
    }

    /// Creates a client against an alternative base URL, e.g. a local
    /// stub server in tests.
    #[must_use]
    pub fn with_base_url(credentials: VendorCredentials, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    async fn get_json(&self, path: &str) -> AnalysisClientResult<Value> {
        let request = self
            .http
            .get(format!("{}{path}", self.base_url))
            .basic_auth(&self.credentials.login, Some(&self.credentials.password));
        Self::execute(request).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> AnalysisClientResult<Value> {
        let request = self
            .http
            .post(format!("{}{path}", self.base_url))
            .basic_auth(&self.credentials.login, Some(&self.credentials.password))
            .json(body);
        Self::execute(request).await
    }

    async fn execute(request: reqwest::RequestBuilder) -> AnalysisClientResult<Value> {
        let response = request
            .send()
            .await
            .map_err(AnalysisClientError::transport)?;
        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            if payload.is_null() {
                return Err(AnalysisClientError::InvalidResponse(
                    "response body is not JSON".to_owned(),
                ));
            }
            return Ok(payload);
        }

        Err(AnalysisClientError::Vendor {
            code: u32::from(status.as_u16()),
            message: wire::failure_message(&payload)
                .unwrap_or_else(|| "API request failed".to_owned()),
        })
    }
}

#[async_trait]
impl AnalysisClient for DataForSeoClient {
    async fn create_task(
        &self,
        target: &TargetUrl,
        parameters: &CrawlParameters,
    ) -> AnalysisClientResult<TaskReceipt> {
        let mut entry = serde_json::Map::new();
        entry.insert("target".to_owned(), json!(target.as_str()));
        if let Ok(Value::Object(fields)) = serde_json::to_value(parameters) {
            entry.extend(fields);
        }
        let body = Value::Array(vec![Value::Object(entry)]);

        let envelope = self.post_json("/on_page/task_post", &body).await?;
        wire::parse_task_receipt(&envelope)
    }

    async fn list_ready_tasks(&self) -> Vec<ReadyTask> {
        match self.get_json("/on_page/tasks_ready").await {
            Ok(envelope) => wire::parse_ready_tasks(&envelope),
            Err(err) => {
                warn!(error = %err, "readiness listing failed; treating as not ready");
                Vec::new()
            }
        }
    }

    async fn fetch_facet(
        &self,
        kind: FacetKind,
        task_id: &VendorTaskId,
    ) -> AnalysisClientResult<Option<FacetRows>> {
        // The summary endpoint addresses the task in the path; every other
        // facet takes the task id in a POST body.
        let envelope = if kind == FacetKind::Summary {
            self.get_json(&format!("/on_page/summary/{task_id}")).await?
        } else {
            let body = json!({ "data": [{ "id": task_id.as_str() }] });
            self.post_json(&format!("/on_page/{}", kind.endpoint_path()), &body)
                .await?
        };

        wire::first_result(&envelope)
            .map(|result| wire::map_facet(kind, result))
            .transpose()
    }

    async fn list_task_ids(&self) -> Vec<VendorTaskListItem> {
        let now = Utc::now();
        let from = now.checked_sub_months(Months::new(1)).unwrap_or(now);
        let body = json!([{
            "datetime_from": from.format("%Y-%m-%d %H:%M:%S %z").to_string(),
            "datetime_to": now.format("%Y-%m-%d %H:%M:%S %z").to_string(),
            "limit": ID_LIST_LIMIT,
            "include_metadata": true
        }]);

        match self.post_json("/on_page/id_list", &body).await {
            Ok(envelope) => wire::parse_task_id_list(&envelope),
            Err(err) => {
                warn!(error = %err, "task id listing failed");
                Vec::new()
            }
        }
    }
}
