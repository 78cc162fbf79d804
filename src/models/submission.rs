use diesel::insert_or_ignore_into;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::lower;
use crate::api::ApiSubmission;
use crate::schema::submission;
use chrono::NaiveDateTime;

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Submission {
    pub username: String,
    pub problem_code: String,
    pub date: NaiveDateTime,
    pub language_key: String,
    pub time: Option<f64>,
    pub memory: Option<f64>,
    pub points: Option<f64>,
    pub result: Option<String>,
    pub score_num: Option<i32>,
    pub score_denom: Option<i32>,
}

#[derive(Insertable)]
#[table_name = "submission"]
struct NewSubmission<'a> {
    pub username: &'a str,
    pub problem_code: &'a str,
    pub date: NaiveDateTime,
    pub language_key: &'a str,
    pub time: Option<f64>,
    pub memory: Option<f64>,
    pub points: Option<f64>,
    pub result: Option<&'a str>,
    pub score_num: Option<i32>,
    pub score_denom: Option<i32>,
}

/// Append-only: rows already cached under the same (user, problem, timestamp)
/// identity are left untouched.
pub fn insert_submissions(
    connection: &SqliteConnection,
    submissions: &[ApiSubmission],
) -> QueryResult<usize> {
    let mut inserted = 0;
    for fetched in submissions {
        inserted += insert_or_ignore_into(submission::table)
            .values(NewSubmission {
                username: &fetched.user,
                problem_code: &fetched.problem,
                date: fetched.date.naive_utc(),
                language_key: &fetched.language,
                time: fetched.time,
                memory: fetched.memory,
                points: fetched.points,
                result: fetched.result.as_deref(),
                score_num: fetched.score_num,
                score_denom: fetched.score_denom,
            })
            .execute(connection)?;
    }
    Ok(inserted)
}

pub fn get_submissions_by_user(
    connection: &SqliteConnection,
    username: &str,
) -> QueryResult<Vec<Submission>> {
    submission::table
        .filter(lower(submission::username).eq(username.to_lowercase()))
        .order_by(submission::date.desc())
        .load(connection)
}

pub fn latest_submissions(
    connection: &SqliteConnection,
    username: &str,
    count: i64,
) -> QueryResult<Vec<Submission>> {
    submission::table
        .filter(lower(submission::username).eq(username.to_lowercase()))
        .order_by(submission::date.desc())
        .limit(count)
        .load(connection)
}

pub fn has_submissions(connection: &SqliteConnection, username: &str) -> QueryResult<bool> {
    let first: Option<String> = submission::table
        .filter(lower(submission::username).eq(username.to_lowercase()))
        .select(submission::username)
        .first(connection)
        .optional()?;
    Ok(first.is_some())
}

pub fn cached_usernames(connection: &SqliteConnection) -> QueryResult<Vec<String>> {
    submission::table
        .select(submission::username)
        .distinct()
        .load(connection)
}

pub fn clear_submissions(connection: &SqliteConnection) -> QueryResult<usize> {
    diesel::delete(submission::table).execute(connection)
}

/// Best recorded points per problem plus the set of fully-AC problems,
/// aggregated once so the recommendation and prediction engines cannot
/// disagree on tie-breaking.
#[derive(Debug, Default)]
pub struct SolveSummary {
    best_points: HashMap<String, f64>,
    ac_problems: HashSet<String>,
}

impl SolveSummary {
    pub fn from_submissions(submissions: &[Submission]) -> SolveSummary {
        let mut summary = SolveSummary::default();
        for fetched in submissions {
            let points = match fetched.points {
                Some(points) => points,
                None => continue,
            };
            if fetched.result.as_deref() == Some("AC") {
                summary.ac_problems.insert(fetched.problem_code.clone());
            }
            let best = summary
                .best_points
                .entry(fetched.problem_code.clone())
                .or_insert(points);
            if points > *best {
                *best = points;
            }
        }
        summary
    }

    pub fn solved_count(&self) -> usize {
        self.ac_problems.len()
    }

    /// 0 when the user never attempted the problem.
    pub fn best_score(&self, code: &str) -> f64 {
        self.best_points.get(code).copied().unwrap_or(0.0)
    }

    pub fn points_descending(&self) -> Vec<f64> {
        let mut points: Vec<f64> = self.best_points.values().copied().collect();
        points.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        points
    }
}
