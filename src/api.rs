use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ApiError {
        #[error("{0} does not exist on the judge")]
        NotFound(String),
        #[error(transparent)]
        Http(#[from] reqwest::Error),
        #[error("judge api error {code}: {message}")]
        Upstream { code: u16, message: String },
        #[error("malformed judge api response: {0}")]
        Malformed(String),
    }
}

pub use error::ApiError;

const DEFAULT_BASE_URL: &str = "https://dmoj.ca";

fn judge_base_url() -> String {
    env::var("JUDGE_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

fn judge_token() -> Option<String> {
    let raw = env::var("JUDGE_API_TOKEN").ok()?;
    let token = raw.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiParticipation {
    pub key: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub rating: Option<i32>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiUser {
    pub id: i32,
    pub username: String,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub performance_points: f64,
    #[serde(default)]
    pub problem_count: i32,
    pub rating: Option<i32>,
    #[serde(default)]
    pub contests: Vec<ApiParticipation>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiProblem {
    pub code: String,
    pub name: String,
    pub points: Option<f64>,
    #[serde(default)]
    pub partial: bool,
    #[serde(default)]
    pub time_limit: f64,
    #[serde(default)]
    pub memory_limit: i32,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub is_organization_private: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiSubmission {
    pub problem: String,
    pub user: String,
    pub date: DateTime<Utc>,
    pub language: String,
    pub time: Option<f64>,
    pub memory: Option<f64>,
    pub points: Option<f64>,
    pub result: Option<String>,
    #[serde(default)]
    pub score_num: Option<i32>,
    #[serde(default)]
    pub score_denom: Option<i32>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiContest {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub is_rated: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiContestRanking {
    pub user: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiContestDetail {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub is_rated: bool,
    #[serde(default)]
    pub rankings: Vec<ApiContestRanking>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiOrganization {
    pub id: i32,
    pub slug: String,
    pub short_name: String,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub member_count: i32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiLanguage {
    pub id: i32,
    pub key: String,
    pub short_name: Option<String>,
    pub common_name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiJudge {
    pub name: String,
    #[serde(default)]
    pub online: bool,
    pub ping: Option<f64>,
    pub load: Option<f64>,
}

/// One page of a paginated list endpoint.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub objects: Vec<T>,
    pub has_more: bool,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<EnvelopeError>,
}

#[derive(Deserialize)]
struct EnvelopeError {
    code: u16,
    message: String,
}

#[derive(Deserialize)]
struct ObjectData<T> {
    object: T,
}

#[derive(Deserialize)]
struct ListData<T> {
    objects: Vec<T>,
    #[serde(default)]
    has_more: bool,
}

#[async_trait]
pub trait JudgeClient: Send + Sync {
    async fn fetch_user(&self, username: &str) -> Result<ApiUser, ApiError>;
    async fn fetch_problem(&self, code: &str) -> Result<ApiProblem, ApiError>;
    async fn fetch_problems(&self, page: u32) -> Result<Page<ApiProblem>, ApiError>;
    async fn fetch_submissions(
        &self,
        username: &str,
        page: u32,
    ) -> Result<Page<ApiSubmission>, ApiError>;
    async fn fetch_contests(&self) -> Result<Vec<ApiContest>, ApiError>;
    async fn fetch_contest(&self, key: &str) -> Result<ApiContestDetail, ApiError>;
    async fn fetch_organizations(&self) -> Result<Vec<ApiOrganization>, ApiError>;
    async fn fetch_languages(&self) -> Result<Vec<ApiLanguage>, ApiError>;
    async fn fetch_judges(&self) -> Result<Vec<ApiJudge>, ApiError>;
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String, token: Option<String>) -> ApiClient {
        ApiClient {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    pub fn from_env() -> ApiClient {
        ApiClient::new(judge_base_url(), judge_token())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, ApiError> {
        let mut builder = self
            .http
            .get(&format!("{}{}", self.base_url, path))
            .query(query);
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = builder.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(what.to_string()));
        }
        let envelope: Envelope<T> = response.json().await?;
        if let Some(error) = envelope.error {
            if error.code == 404 {
                return Err(ApiError::NotFound(what.to_string()));
            }
            return Err(ApiError::Upstream {
                code: error.code,
                message: error.message,
            });
        }
        envelope
            .data
            .ok_or_else(|| ApiError::Malformed(format!("no data for {}", what)))
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        mut query: Vec<(&str, String)>,
        page: u32,
        what: &str,
    ) -> Result<Page<T>, ApiError> {
        query.push(("page", page.to_string()));
        let data: ListData<T> = self.get(path, &query, what).await?;
        Ok(Page {
            objects: data.objects,
            has_more: data.has_more,
        })
    }

    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<Vec<T>, ApiError> {
        let mut objects = Vec::new();
        let mut page = 1;
        loop {
            let fetched: Page<T> = self.get_page(path, Vec::new(), page, what).await?;
            objects.extend(fetched.objects);
            if !fetched.has_more {
                return Ok(objects);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl JudgeClient for ApiClient {
    async fn fetch_user(&self, username: &str) -> Result<ApiUser, ApiError> {
        let what = format!("user {}", username);
        let data: ObjectData<ApiUser> = self
            .get(&format!("/api/v2/user/{}", username), &[], &what)
            .await?;
        Ok(data.object)
    }

    async fn fetch_problem(&self, code: &str) -> Result<ApiProblem, ApiError> {
        let what = format!("problem {}", code);
        let data: ObjectData<ApiProblem> = self
            .get(&format!("/api/v2/problem/{}", code), &[], &what)
            .await?;
        Ok(data.object)
    }

    async fn fetch_problems(&self, page: u32) -> Result<Page<ApiProblem>, ApiError> {
        self.get_page("/api/v2/problems", Vec::new(), page, "problem list")
            .await
    }

    async fn fetch_submissions(
        &self,
        username: &str,
        page: u32,
    ) -> Result<Page<ApiSubmission>, ApiError> {
        let what = format!("submissions of {}", username);
        self.get_page(
            "/api/v2/submissions",
            vec![("user", username.to_string())],
            page,
            &what,
        )
        .await
    }

    async fn fetch_contests(&self) -> Result<Vec<ApiContest>, ApiError> {
        self.get_all("/api/v2/contests", "contest list").await
    }

    async fn fetch_contest(&self, key: &str) -> Result<ApiContestDetail, ApiError> {
        let what = format!("contest {}", key);
        let data: ObjectData<ApiContestDetail> = self
            .get(&format!("/api/v2/contest/{}", key), &[], &what)
            .await?;
        Ok(data.object)
    }

    async fn fetch_organizations(&self) -> Result<Vec<ApiOrganization>, ApiError> {
        self.get_all("/api/v2/organizations", "organization list")
            .await
    }

    async fn fetch_languages(&self) -> Result<Vec<ApiLanguage>, ApiError> {
        self.get_all("/api/v2/languages", "language list").await
    }

    async fn fetch_judges(&self) -> Result<Vec<ApiJudge>, ApiError> {
        self.get_all("/api/v2/judges", "judge list").await
    }
}
