use std::sync::Arc;

use async_trait::async_trait;
use employee_facade_core::{
    CreateEmployeeRequest, DeleteByNameRequest, Employee, EmployeeUpstream, GatewayError,
};
use metrics::counter;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::error::UpstreamError;
use crate::retry::{with_backoff, RetryPolicy, Sleeper, TokioSleeper};
use crate::wire::{EmployeeRecord, Envelope};

const LIST: &str = "list";
const GET_BY_ID: &str = "get_by_id";
const CREATE: &str = "create";
const DELETE_BY_NAME: &str = "delete_by_name";

/// Client for the upstream employee store.
///
/// Rate-limited calls are retried according to the configured [`RetryPolicy`];
/// every other failure is returned as soon as it happens.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: Url,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl UpstreamClient {
    /// Creates a client rooted at `base_url`, which should end with a `/`.
    pub fn new(base_url: Url, http: Client) -> Self {
        Self {
            http,
            base_url,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// `GET /employee`. An empty listing is treated as a protocol violation.
    pub async fn list_employees(&self) -> Result<Vec<EmployeeRecord>, UpstreamError> {
        let url = self.endpoint(None)?;
        let result = self
            .exchange::<Vec<EmployeeRecord>, _>(LIST, || self.http.get(url.clone()))
            .await
            .and_then(|envelope| {
                let records = envelope.data.unwrap_or_default();
                debug!(
                    stage = "upstream",
                    operation = LIST,
                    status = %envelope.status.as_deref().unwrap_or("<none>"),
                    records = records.len(),
                    "upstream listing received"
                );
                if records.is_empty() {
                    return Err(UpstreamError::MissingData { operation: LIST });
                }
                Ok(records)
            });
        observe(LIST, result)
    }

    /// `GET /employee/{id}`.
    pub async fn get_employee(&self, id: &str) -> Result<EmployeeRecord, UpstreamError> {
        let url = self.endpoint(Some(id))?;
        let result = self
            .exchange::<EmployeeRecord, _>(GET_BY_ID, || self.http.get(url.clone()))
            .await
            .and_then(|envelope| {
                debug!(stage = "upstream", operation = GET_BY_ID, %id, status = %envelope.status(), "upstream employee received");
                envelope.data.ok_or(UpstreamError::MissingData {
                    operation: GET_BY_ID,
                })
            });
        observe(GET_BY_ID, result)
    }

    /// `POST /employee`.
    pub async fn create_employee(
        &self,
        request: &CreateEmployeeRequest,
    ) -> Result<EmployeeRecord, UpstreamError> {
        let url = self.endpoint(None)?;
        let result = self
            .exchange::<EmployeeRecord, _>(CREATE, || self.http.post(url.clone()).json(request))
            .await
            .and_then(|envelope| {
                debug!(stage = "upstream", operation = CREATE, status = %envelope.status(), "upstream create answered");
                envelope
                    .data
                    .ok_or(UpstreamError::MissingData { operation: CREATE })
            });
        observe(CREATE, result)
    }

    /// `DELETE /employee` with `{ name }`. `Ok(false)` means upstream declined.
    pub async fn delete_employee_by_name(
        &self,
        request: &DeleteByNameRequest,
    ) -> Result<bool, UpstreamError> {
        let url = self.endpoint(None)?;
        let result = self
            .exchange::<bool, _>(DELETE_BY_NAME, || {
                self.http.delete(url.clone()).json(request)
            })
            .await
            .and_then(|envelope| {
                debug!(stage = "upstream", operation = DELETE_BY_NAME, name = %request.name, status = %envelope.status(), "upstream delete answered");
                envelope.data.ok_or(UpstreamError::MissingData {
                    operation: DELETE_BY_NAME,
                })
            });
        observe(DELETE_BY_NAME, result)
    }

    fn endpoint(&self, id: Option<&str>) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.join("employee")?;
        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|_| UpstreamError::BaseUrl(self.base_url.to_string()))?
                .push(id);
        }
        Ok(url)
    }

    /// Sends the request built by `build`, retrying on rate limiting, and decodes
    /// the envelope of a successful response.
    async fn exchange<T, B>(
        &self,
        operation: &'static str,
        build: B,
    ) -> Result<Envelope<T>, UpstreamError>
    where
        T: DeserializeOwned + Send,
        B: Fn() -> RequestBuilder + Send + Sync,
    {
        let build = &build;
        with_backoff(&self.retry, self.sleeper.as_ref(), operation, move || async move {
            let response = build()
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(|source| UpstreamError::Transport { operation, source })?;
            parse_envelope(operation, response).await
        })
        .await
    }
}

#[async_trait]
impl EmployeeUpstream for UpstreamClient {
    async fn list(&self) -> Result<Vec<Employee>, GatewayError> {
        let records = self.list_employees().await?;
        Ok(records.into_iter().map(Employee::from).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Employee, GatewayError> {
        Ok(self.get_employee(id).await?.into())
    }

    async fn create(&self, request: &CreateEmployeeRequest) -> Result<Employee, GatewayError> {
        Ok(self.create_employee(request).await?.into())
    }

    async fn delete_by_name(&self, request: &DeleteByNameRequest) -> Result<bool, GatewayError> {
        Ok(self.delete_employee_by_name(request).await?)
    }
}

async fn parse_envelope<T>(
    operation: &'static str,
    response: Response,
) -> Result<Envelope<T>, UpstreamError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<unavailable>"));
        return Err(UpstreamError::Status {
            operation,
            status,
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| UpstreamError::Transport { operation, source })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(UpstreamError::MissingEnvelope { operation });
    }

    serde_json::from_slice::<Option<Envelope<T>>>(&bytes)
        .map_err(|source| UpstreamError::Decode { operation, source })?
        .ok_or(UpstreamError::MissingEnvelope { operation })
}

fn observe<T>(
    operation: &'static str,
    result: Result<T, UpstreamError>,
) -> Result<T, UpstreamError> {
    match &result {
        Ok(_) => {
            counter!("upstream_requests_total", "operation" => operation, "outcome" => "ok")
                .increment(1);
        }
        Err(err) => {
            counter!("upstream_requests_total", "operation" => operation, "outcome" => err.outcome())
                .increment(1);
            error!(stage = "upstream", operation, error = %err, "upstream call failed");
        }
    }
    result
}
