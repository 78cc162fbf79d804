use diesel::sqlite::SqliteConnection;
use log::info;
use std::time::Duration;
use thiserror::Error;

use crate::api::{ApiError, JudgeClient};
use crate::models::contest::{self, Contest};
use crate::models::handle::{self, Handle};
use crate::models::problem::{self, Problem};
use crate::models::submission::{self, Submission};
use crate::models::user::{self, User};
use crate::throttle::{self, Ticker};

pub const DEFAULT_FETCH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("{0} does not exist on the judge")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
    #[error(transparent)]
    Api(ApiError),
    #[error("operation cancelled")]
    Cancelled,
}

impl From<ApiError> for QueryError {
    fn from(error: ApiError) -> QueryError {
        match error {
            ApiError::NotFound(what) => QueryError::NotFound(what),
            other => QueryError::Api(other),
        }
    }
}

/// Cache-or-fetch façade over the local mirror and the judge API. Borrows
/// its storage handle and client per instance; holds no global state.
pub struct Query<'a> {
    connection: &'a SqliteConnection,
    api: &'a dyn JudgeClient,
    fetch_interval: Duration,
}

impl<'a> Query<'a> {
    pub fn new(connection: &'a SqliteConnection, api: &'a dyn JudgeClient) -> Query<'a> {
        Query {
            connection,
            api,
            fetch_interval: DEFAULT_FETCH_INTERVAL,
        }
    }

    pub fn with_fetch_interval(mut self, fetch_interval: Duration) -> Query<'a> {
        self.fetch_interval = fetch_interval;
        self
    }

    pub async fn get_user(&self, username: &str) -> Result<User, QueryError> {
        if let Some(cached) = user::get_user(self.connection, username)? {
            return Ok(cached);
        }
        let fetched = self.api.fetch_user(username).await?;
        Ok(user::upsert_user(self.connection, &fetched)?)
    }

    pub async fn get_problem(&self, code: &str) -> Result<Problem, QueryError> {
        if let Some(cached) = problem::get_problem(self.connection, code)? {
            return Ok(cached);
        }
        let fetched = self.api.fetch_problem(code).await?;
        Ok(problem::upsert_problem(self.connection, &fetched)?)
    }

    pub async fn get_contest(&self, key: &str) -> Result<Contest, QueryError> {
        if let Some(cached) = contest::get_contest(self.connection, key)? {
            return Ok(cached);
        }
        let fetched = self.api.fetch_contest(key).await?;
        Ok(contest::upsert_contest(self.connection, &fetched)?)
    }

    /// Walks every submission page for the user through the ticker, one
    /// request per tick, and appends the rows to the cache.
    pub async fn fetch_submissions(
        &self,
        username: &str,
        ticker: &mut Ticker,
    ) -> Result<usize, QueryError> {
        let mut page = 1;
        let mut cached = 0;
        loop {
            if !ticker.wait().await {
                return Err(QueryError::Cancelled);
            }
            let fetched = self.api.fetch_submissions(username, page).await?;
            cached += submission::insert_submissions(self.connection, &fetched.objects)?;
            if !fetched.has_more {
                return Ok(cached);
            }
            page += 1;
        }
    }

    pub async fn get_submissions(&self, username: &str) -> Result<Vec<Submission>, QueryError> {
        if !submission::has_submissions(self.connection, username)? {
            let (mut ticker, _cancel) = throttle::ticker(self.fetch_interval);
            let cached = self.fetch_submissions(username, &mut ticker).await?;
            info!("cached {} submissions for {}", cached, username);
        }
        Ok(submission::get_submissions_by_user(self.connection, username)?)
    }

    pub async fn get_latest_submissions(
        &self,
        username: &str,
        count: i64,
    ) -> Result<Vec<Submission>, QueryError> {
        if !submission::has_submissions(self.connection, username)? {
            let (mut ticker, _cancel) = throttle::ticker(self.fetch_interval);
            self.fetch_submissions(username, &mut ticker).await?;
        }
        Ok(submission::latest_submissions(
            self.connection,
            username,
            count,
        )?)
    }

    pub fn get_linked_handle(&self, account_id: i64) -> Result<Option<Handle>, QueryError> {
        Ok(handle::get_handle(self.connection, account_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        ApiContest, ApiContestDetail, ApiJudge, ApiLanguage, ApiOrganization, ApiProblem,
        ApiSubmission, ApiUser, Page,
    };
    use crate::setup::test_connection;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockJudge {
        users: HashMap<String, ApiUser>,
        submission_pages: HashMap<String, Vec<Vec<ApiSubmission>>>,
        user_calls: AtomicUsize,
        submission_calls: AtomicUsize,
    }

    #[async_trait]
    impl JudgeClient for MockJudge {
        async fn fetch_user(&self, username: &str) -> Result<ApiUser, ApiError> {
            self.user_calls.fetch_add(1, Ordering::SeqCst);
            self.users
                .get(username)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("user {}", username)))
        }

        async fn fetch_problem(&self, code: &str) -> Result<ApiProblem, ApiError> {
            Err(ApiError::NotFound(format!("problem {}", code)))
        }

        async fn fetch_problems(&self, _page: u32) -> Result<Page<ApiProblem>, ApiError> {
            Ok(Page {
                objects: Vec::new(),
                has_more: false,
            })
        }

        async fn fetch_submissions(
            &self,
            username: &str,
            page: u32,
        ) -> Result<Page<ApiSubmission>, ApiError> {
            self.submission_calls.fetch_add(1, Ordering::SeqCst);
            let pages = self
                .submission_pages
                .get(username)
                .ok_or_else(|| ApiError::NotFound(format!("submissions of {}", username)))?;
            let index = (page - 1) as usize;
            Ok(Page {
                objects: pages[index].clone(),
                has_more: index + 1 < pages.len(),
            })
        }

        async fn fetch_contests(&self) -> Result<Vec<ApiContest>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_contest(&self, key: &str) -> Result<ApiContestDetail, ApiError> {
            Err(ApiError::NotFound(format!("contest {}", key)))
        }

        async fn fetch_organizations(&self) -> Result<Vec<ApiOrganization>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_languages(&self) -> Result<Vec<ApiLanguage>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_judges(&self) -> Result<Vec<ApiJudge>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn api_user(username: &str) -> ApiUser {
        ApiUser {
            id: 1,
            username: username.to_string(),
            points: 50.0,
            performance_points: 48.0,
            problem_count: 5,
            rating: None,
            contests: Vec::new(),
        }
    }

    fn api_submission(problem: &str, date: &str) -> ApiSubmission {
        ApiSubmission {
            problem: problem.to_string(),
            user: "ada".to_string(),
            date: date.parse::<DateTime<Utc>>().unwrap(),
            language: "CPP17".to_string(),
            time: None,
            memory: None,
            points: Some(1.0),
            result: Some("AC".to_string()),
            score_num: None,
            score_denom: None,
        }
    }

    #[tokio::test]
    async fn cache_hit_performs_no_api_call() {
        let connection = test_connection();
        let mut judge = MockJudge::default();
        judge.users.insert("ada".to_string(), api_user("ada"));
        let query = Query::new(&connection, &judge);

        query.get_user("ada").await.unwrap();
        query.get_user("ada").await.unwrap();
        query.get_user("ADA").await.unwrap();

        assert_eq!(judge.user_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_user_maps_to_not_found() {
        let connection = test_connection();
        let judge = MockJudge::default();
        let query = Query::new(&connection, &judge);

        let outcome = query.get_user("nobody").await;
        assert!(matches!(outcome, Err(QueryError::NotFound(_))));
        assert!(user::get_user(&connection, "nobody").unwrap().is_none());
    }

    #[tokio::test]
    async fn submissions_are_fetched_page_by_page_then_served_from_cache() {
        let connection = test_connection();
        let mut judge = MockJudge::default();
        judge.submission_pages.insert(
            "ada".to_string(),
            vec![
                vec![api_submission("p1", "2021-01-01T00:00:00Z")],
                vec![api_submission("p2", "2021-01-02T00:00:00Z")],
            ],
        );
        let query = Query::new(&connection, &judge).with_fetch_interval(Duration::from_millis(5));

        let fetched = query.get_submissions("ada").await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(judge.submission_calls.load(Ordering::SeqCst), 2);

        let cached = query.get_submissions("ada").await.unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(judge.submission_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn latest_submissions_limit_the_cached_rows() {
        let connection = test_connection();
        let mut judge = MockJudge::default();
        judge.submission_pages.insert(
            "ada".to_string(),
            vec![vec![
                api_submission("p1", "2021-01-01T00:00:00Z"),
                api_submission("p2", "2021-01-02T00:00:00Z"),
                api_submission("p3", "2021-01-03T00:00:00Z"),
            ]],
        );
        let query = Query::new(&connection, &judge).with_fetch_interval(Duration::from_millis(5));

        let latest = query.get_latest_submissions("ada", 2).await.unwrap();
        let codes: Vec<&str> = latest.iter().map(|s| s.problem_code.as_str()).collect();
        assert_eq!(codes, vec!["p3", "p2"]);
    }
}
