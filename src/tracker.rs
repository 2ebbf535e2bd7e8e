use std::{fmt, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::period::ReportPeriod;
use crate::report::{DateEntry, Entity, FilterSet, Report};

/// 1リクエストあたりのタイムアウト。
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Tracker APIのエンドポイント。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Sessions,
    Filters,
    Chart,
}

impl Endpoint {
    fn path(&self) -> &'static str {
        match self {
            Endpoint::Sessions => "/sessions",
            Endpoint::Filters => "/reports/filters",
            Endpoint::Chart => "/reports/chart",
        }
    }

    /// 成功時に返されるステータスコード。これ以外は全てエラーとして扱う。
    fn expected_status(&self) -> StatusCode {
        match self {
            Endpoint::Sessions => StatusCode::CREATED,
            Endpoint::Filters | Endpoint::Chart => StatusCode::OK,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Tracker APIとの通信で発生するエラー。
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Failed to serialize request data for {endpoint}")]
    Serialize {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to send request to {endpoint}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("Incorrect response status code from {endpoint}: expected {expected}, got {actual}")]
    UnexpectedStatus {
        endpoint: Endpoint,
        expected: u16,
        actual: u16,
    },

    #[error("Failed to decode response data from {endpoint}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

/// 認証に利用するメールアドレスとパスワード。
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// 認証で取得するアクセストークン。
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Serialize)]
struct SessionsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionsResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct FiltersResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    filters: TrackerFilters,
}

#[derive(Debug, Default, Deserialize)]
struct TrackerFilters {
    #[serde(default, deserialize_with = "null_as_default")]
    projects: Vec<TrackerEntity>,
    #[serde(default, deserialize_with = "null_as_default")]
    workers: Vec<TrackerEntity>,
}

#[derive(Debug, Deserialize)]
struct TrackerEntity {
    #[serde(default, deserialize_with = "null_as_default")]
    id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    dates: Vec<TrackerDate>,
}

#[derive(Debug, Deserialize)]
struct TrackerDate {
    #[serde(default, deserialize_with = "null_as_default")]
    date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    seconds: i64,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    reports: ChartReports,
}

#[derive(Debug, Default, Deserialize)]
struct ChartReports {
    #[serde(default, deserialize_with = "null_as_default")]
    projects: ReportData,
}

#[derive(Debug, Default, Deserialize)]
struct ReportData {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<TrackerEntity>,
    #[serde(default, deserialize_with = "null_as_default")]
    total_seconds: i64,
}

/// `null`を型のデフォルト値として扱う。
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<TrackerEntity> for Entity {
    fn from(entity: TrackerEntity) -> Self {
        Entity {
            id: entity.id,
            label: entity.label,
            dates: entity
                .dates
                .into_iter()
                .map(|date| DateEntry {
                    date: date.date,
                    seconds: date.seconds,
                })
                .collect(),
        }
    }
}

impl From<TrackerFilters> for FilterSet {
    fn from(filters: TrackerFilters) -> Self {
        FilterSet {
            projects: filters.projects.into_iter().map(Entity::from).collect(),
            workers: filters.workers.into_iter().map(Entity::from).collect(),
        }
    }
}

/// Tracker APIから情報を取得するためのリポジトリ。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackerRepository {
    /// 認証してアクセストークンを取得する。
    async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, TrackerError>;

    /// ユーザーが参照可能なプロジェクトとワーカーの一覧を取得する。
    async fn read_filters(&self, token: &AccessToken) -> Result<FilterSet, TrackerError>;

    /// 指定された期間とフィルタで集計したレポートを取得する。
    ///
    /// # Arguments
    ///
    /// * `token` - `authenticate`で取得したアクセストークン
    /// * `filters` - レポートの対象とするプロジェクトとワーカー
    /// * `period` - 集計期間
    async fn read_report(
        &self,
        token: &AccessToken,
        filters: &FilterSet,
        period: &ReportPeriod,
    ) -> Result<Report, TrackerError>;
}

/// Tracker APIと通信するためのクライアント。
///
/// 各リクエストは1回だけ送信し、失敗してもリトライしない。
///
/// # Examples
///
/// ```
/// let client = TrackerClient::new("https://tracker-api.toptal.com").unwrap();
/// let token = client.authenticate(&credentials).await.unwrap();
/// ```
pub struct TrackerClient {
    client: Client,
    api_url: String,
}

impl TrackerClient {
    /// 新しい`TrackerClient`を返す。
    ///
    /// # Arguments
    ///
    /// * `api_url` - Tracker APIのベースURL
    pub fn new(api_url: &str) -> Result<Self> {
        Self::with_timeout(api_url, REQUEST_TIMEOUT)
    }

    /// リクエストのタイムアウトを指定して新しい`TrackerClient`を返す。
    ///
    /// タイムアウトした場合は`TrackerError::Transport`になる。
    pub fn with_timeout(api_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build http client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.api_url, endpoint.path())
    }

    /// リクエストを送信し、ステータスコードを確認した上でレスポンスをデシリアライズする。
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<T, TrackerError> {
        let response = request
            .send()
            .await
            .map_err(|source| TrackerError::Transport { endpoint, source })?;

        let status = response.status();
        debug!("{} responded with {}", endpoint, status);
        if status != endpoint.expected_status() {
            return Err(TrackerError::UnexpectedStatus {
                endpoint,
                expected: endpoint.expected_status().as_u16(),
                actual: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| TrackerError::Transport { endpoint, source })?;
        serde_json::from_slice(&body).map_err(|source| TrackerError::Decode { endpoint, source })
    }
}

#[async_trait]
impl TrackerRepository for TrackerClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, TrackerError> {
        let endpoint = Endpoint::Sessions;
        let body = serde_json::to_vec(&SessionsRequest {
            email: &credentials.email,
            password: &credentials.password,
        })
        .map_err(|source| TrackerError::Serialize { endpoint, source })?;

        let request = self
            .client
            .post(self.url(endpoint))
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let response: SessionsResponse = self.execute(endpoint, request).await?;
        info!("Authenticated as {}", credentials.email);

        Ok(AccessToken::new(response.access_token))
    }

    async fn read_filters(&self, token: &AccessToken) -> Result<FilterSet, TrackerError> {
        let endpoint = Endpoint::Filters;
        let request = self
            .client
            .get(self.url(endpoint))
            .query(&[("access_token", token.as_str())]);
        let response: FiltersResponse = self.execute(endpoint, request).await?;

        let filters = FilterSet::from(response.filters);
        info!(
            "length of projects: {}, length of workers: {}",
            filters.projects.len(),
            filters.workers.len()
        );

        Ok(filters)
    }

    async fn read_report(
        &self,
        token: &AccessToken,
        filters: &FilterSet,
        period: &ReportPeriod,
    ) -> Result<Report, TrackerError> {
        let endpoint = Endpoint::Chart;
        let request = self
            .client
            .get(self.url(endpoint))
            .query(&chart_query(token, filters, period));
        let response: ChartResponse = self.execute(endpoint, request).await?;

        let projects = response.reports.projects;
        info!("length of report projects: {}", projects.data.len());

        Ok(Report {
            total_seconds: projects.total_seconds,
            projects: projects.data.into_iter().map(Entity::from).collect(),
        })
    }
}

/// レポート取得時のクエリパラメータを組み立てる。
///
/// `project_ids[]`と`worker_ids[]`はフィルタのIDごとに繰り返し付与する。
fn chart_query(
    token: &AccessToken,
    filters: &FilterSet,
    period: &ReportPeriod,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("access_token", token.as_str().to_string()),
        ("start_date", period.start_date()),
        ("end_date", period.end_date()),
    ];
    query.extend(
        filters
            .projects
            .iter()
            .map(|project| ("project_ids[]", project.id.to_string())),
    );
    query.extend(
        filters
            .workers
            .iter()
            .map(|worker| ("worker_ids[]", worker.id.to_string())),
    );

    query
}
