use diesel::sqlite::SqliteConnection;
use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::problem::{self, Problem};
use crate::models::submission::{self, SolveSummary};

#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("no problems satisfy the filters")]
    NoMatch,
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct PointRange {
    pub low: f64,
    pub high: f64,
}

impl Default for PointRange {
    fn default() -> PointRange {
        PointRange {
            low: 1.0,
            high: 50.0,
        }
    }
}

lazy_static! {
    static ref POINT_RANGE_REGEX: Regex =
        Regex::new(r"^p?(\d+(?:\.\d+)?)(?:-p?(\d+(?:\.\d+)?))?$").unwrap();
}

/// Parses "30", "10-50" or "p10-p50" into an inclusive point range; a single
/// value pins both ends.
pub fn parse_point_range(raw: &str) -> Option<PointRange> {
    let captures = POINT_RANGE_REGEX.captures(raw)?;
    let low: f64 = captures.get(1)?.as_str().parse().ok()?;
    let high: f64 = match captures.get(2) {
        Some(matched) => matched.as_str().parse().ok()?,
        None => low,
    };
    if low > high {
        return None;
    }
    Some(PointRange { low, high })
}

lazy_static! {
    static ref TAG_ALIASES: HashMap<&'static str, &'static [&'static str]> = {
        let mut aliases: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        aliases.insert("adhoc", &["Ad Hoc"]);
        aliases.insert(
            "math",
            &["Advanced Math", "Intermediate Math", "Simple Math"],
        );
        aliases.insert("bf", &["Brute Force"]);
        aliases.insert("ctf", &["Capture the Flag"]);
        aliases.insert("ds", &["Data Structures"]);
        aliases.insert("d&c", &["Divide and Conquer"]);
        aliases.insert("dp", &["Dynamic Programming"]);
        aliases.insert("geo", &["Geometry"]);
        aliases.insert("gt", &["Graph Theory"]);
        aliases.insert("greedy", &["Greedy Algorithms"]);
        aliases.insert("regex", &["Regular Expressions"]);
        aliases.insert("string", &["String Algorithms"]);
        aliases
    };
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Expands shorthand filters into canonical tag names; anything unknown is
/// title-cased and matched as-is.
pub fn expand_tag_aliases(filters: &[String]) -> Vec<String> {
    let mut expanded = Vec::new();
    for filter in filters {
        match TAG_ALIASES.get(filter.to_lowercase().as_str()) {
            Some(tags) => expanded.extend(tags.iter().map(|tag| tag.to_string())),
            None => expanded.push(title_case(filter)),
        }
    }
    expanded
}

fn matches_tags(candidate: &Problem, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    let tags = candidate.tags();
    filters
        .iter()
        .any(|filter| tags.iter().any(|tag| tag.eq_ignore_ascii_case(filter)))
}

/// Picks uniformly at random among cached public problems in the point range
/// whose tags intersect the filters and which the user has not fully solved.
pub fn recommend(
    connection: &SqliteConnection,
    username: &str,
    range: PointRange,
    tags: &[String],
) -> Result<Problem, RecommendError> {
    let submissions = submission::get_submissions_by_user(connection, username)?;
    let summary = SolveSummary::from_submissions(&submissions);

    let candidates: Vec<Problem> = problem::get_problems_in_range(connection, range.low, range.high)?
        .into_iter()
        .filter(|candidate| matches_tags(candidate, tags))
        .filter(|candidate| summary.best_score(&candidate.code) < candidate.points)
        .collect();

    candidates
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or(RecommendError::NoMatch)
}
