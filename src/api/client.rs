use super::error::ApiError;
use super::urls::{url_surveys, url_surveys_id};
use crate::config::SurveyConfig;
use crate::survey::{SurveyId, SurveyPayload, SurveyRecord};
use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// 问卷后端的四个 REST 操作
#[async_trait]
pub trait SurveyApi: Send + Sync {
    async fn list(&self) -> Result<Vec<SurveyRecord>, ApiError>;
    async fn create(&self, payload: &SurveyPayload) -> Result<SurveyRecord, ApiError>;
    async fn update(&self, id: &SurveyId, payload: &SurveyPayload)
        -> Result<SurveyRecord, ApiError>;
    async fn delete(&self, id: &SurveyId) -> Result<(), ApiError>;
}

/// 基于 reqwest 的问卷客户端
///
/// 每个请求（发送 + 读取响应体）整体受 `timeout` 约束，不做自动重试。
pub struct SurveyClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl SurveyClient {
    pub fn new(config: &SurveyConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent("rustsurvey/0.1")
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            timeout: config.api_timeout,
        })
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    /// 执行请求；超时后请求 future 被直接丢弃，连接和计时器随之释放
    async fn execute(
        &self,
        op: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Option<Value>, ApiError> {
        let timeout_ms = self.timeout_ms();
        let result = match tokio::time::timeout(self.timeout, exchange(request, timeout_ms)).await
        {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(timeout_ms)),
        };
        match &result {
            Ok(_) => info!("{} {}(...) [{}]", self, op, url),
            Err(e) => warn!("{} {}(...) [{}] failed: {}", self, op, url, e),
        }
        result
    }
}

async fn exchange(request: RequestBuilder, timeout_ms: u64) -> Result<Option<Value>, ApiError> {
    let resp = request
        .send()
        .await
        .map_err(|e| classify(e, timeout_ms))?;
    read_response(resp, timeout_ms).await
}

fn classify(e: reqwest::Error, timeout_ms: u64) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(timeout_ms)
    } else {
        ApiError::Transport(e.to_string())
    }
}

/// 非 2xx -> Status；204 或空响应体 -> None；否则解析 JSON
async fn read_response(resp: Response, timeout_ms: u64) -> Result<Option<Value>, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let raw = resp.text().await.map_err(|e| classify(e, timeout_ms))?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ApiError::Decode(format!("{e}, raw={raw}")))
}

/// 优先取后端的 `detail`（非字符串则序列化为 JSON），否则用状态码原因短语
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned())
        .filter(|d| !d.is_null());

    match detail {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => status
            .canonical_reason()
            .map(|s| s.to_string())
            .unwrap_or_else(|| status.as_str().to_string()),
    }
}

fn decode<T: DeserializeOwned>(body: Option<Value>) -> Result<T, ApiError> {
    let value = body.ok_or_else(|| ApiError::Decode("empty response body".to_string()))?;
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl SurveyApi for SurveyClient {
    async fn list(&self) -> Result<Vec<SurveyRecord>, ApiError> {
        let url = url_surveys(&self.base_url);
        let body = self.execute("list", &url, self.client.get(&url)).await?;
        match body {
            Some(value) => decode(Some(value)),
            None => Ok(Vec::new()),
        }
    }

    async fn create(&self, payload: &SurveyPayload) -> Result<SurveyRecord, ApiError> {
        let url = url_surveys(&self.base_url);
        let body = self
            .execute("create", &url, self.client.post(&url).json(payload))
            .await?;
        decode(body)
    }

    async fn update(
        &self,
        id: &SurveyId,
        payload: &SurveyPayload,
    ) -> Result<SurveyRecord, ApiError> {
        let url = url_surveys_id(&self.base_url, id);
        let body = self
            .execute("update", &url, self.client.put(&url).json(payload))
            .await?;
        decode(body)
    }

    async fn delete(&self, id: &SurveyId) -> Result<(), ApiError> {
        let url = url_surveys_id(&self.base_url, id);
        self.execute("delete", &url, self.client.delete(&url)).await?;
        Ok(())
    }
}

impl std::fmt::Display for SurveyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<SurveyClient [{}]>", self.base_url)
    }
}

impl std::fmt::Debug for SurveyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<SurveyClient [{}]>", self.base_url)
    }
}
