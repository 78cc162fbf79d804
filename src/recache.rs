use diesel::sqlite::SqliteConnection;
use log::info;

use crate::api::JudgeClient;
use crate::models::contest::{self, Contest};
use crate::models::judge;
use crate::models::language;
use crate::models::organization;
use crate::models::problem::{self, Problem};
use crate::models::submission;
use crate::query::{Query, QueryError};
use crate::throttle::Ticker;

/// Sweeps every page of the problem list into the cache. With `clear` the
/// table is emptied first, turning the sweep into a full rebuild.
pub async fn recache_problems(
    connection: &SqliteConnection,
    api: &dyn JudgeClient,
    clear: bool,
) -> Result<usize, QueryError> {
    if clear {
        let removed = problem::clear_problems(connection)?;
        info!("cleared {} cached problems", removed);
    }
    let mut page = 1;
    let mut cached = 0;
    loop {
        let fetched = api.fetch_problems(page).await?;
        for api_problem in &fetched.objects {
            problem::upsert_problem(connection, api_problem)?;
        }
        cached += fetched.objects.len();
        if !fetched.has_more {
            break;
        }
        page += 1;
    }
    info!("cached {} problems", cached);
    Ok(cached)
}

pub async fn recache_contests(
    connection: &SqliteConnection,
    api: &dyn JudgeClient,
) -> Result<usize, QueryError> {
    let contests = api.fetch_contests().await?;
    for listed in &contests {
        let detail = api.fetch_contest(&listed.key).await?;
        contest::upsert_contest(connection, &detail)?;
    }
    info!("cached {} contests", contests.len());
    Ok(contests.len())
}

#[derive(Debug)]
pub struct MetadataCounts {
    pub organizations: usize,
    pub languages: usize,
    pub judges: usize,
}

pub async fn recache_metadata(
    connection: &SqliteConnection,
    api: &dyn JudgeClient,
) -> Result<MetadataCounts, QueryError> {
    let organizations =
        organization::upsert_organizations(connection, &api.fetch_organizations().await?)?;
    let languages = language::upsert_languages(connection, &api.fetch_languages().await?)?;
    let judges = judge::upsert_judges(connection, &api.fetch_judges().await?)?;
    Ok(MetadataCounts {
        organizations,
        languages,
        judges,
    })
}

/// Clears the submission table and refetches every known user's submissions
/// serially through one shared ticker. An API failure aborts the operation;
/// an administrator reruns it. Cancellation surfaces as
/// `QueryError::Cancelled`.
pub async fn recache_submissions(
    connection: &SqliteConnection,
    api: &dyn JudgeClient,
    ticker: &mut Ticker,
) -> Result<usize, QueryError> {
    let usernames = submission::cached_usernames(connection)?;
    info!(
        "recaching submissions for {} users, this can take hours",
        usernames.len()
    );
    submission::clear_submissions(connection)?;

    let query = Query::new(connection, api);
    let mut done = 0;
    for username in &usernames {
        let cached = query.fetch_submissions(username, ticker).await?;
        done += 1;
        info!(
            "{}/{} users recached ({}: {} submissions)",
            done,
            usernames.len(),
            username,
            cached
        );
    }
    Ok(done)
}

/// Drops the cached snapshot, if any, then fetches a fresh one.
pub async fn force_problem(
    connection: &SqliteConnection,
    api: &dyn JudgeClient,
    code: &str,
) -> Result<Problem, QueryError> {
    if problem::delete_problem(connection, code)? == 0 {
        info!("problem {} was not cached, fetching fresh", code);
    }
    Query::new(connection, api).get_problem(code).await
}

pub async fn force_contest(
    connection: &SqliteConnection,
    api: &dyn JudgeClient,
    key: &str,
) -> Result<Contest, QueryError> {
    if contest::delete_contest(connection, key)? == 0 {
        info!("contest {} was not cached, fetching fresh", key);
    }
    Query::new(connection, api).get_contest(key).await
}
