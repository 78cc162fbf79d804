use diesel::prelude::*;
use diesel::replace_into;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use crate::api::ApiProblem;
use crate::schema::problem;

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Problem {
    pub code: String,
    pub name: String,
    pub points: f64,
    pub partial: bool,
    pub time_limit: f64,
    pub memory_limit: i32,
    pub types: String,
    pub group: String,
    pub is_organization_private: bool,
}

impl Problem {
    pub fn tags(&self) -> Vec<String> {
        serde_json::from_str(&self.types).unwrap_or_default()
    }
}

#[derive(Insertable)]
#[table_name = "problem"]
struct NewProblem<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub points: f64,
    pub partial: bool,
    pub time_limit: f64,
    pub memory_limit: i32,
    pub types: String,
    pub group: &'a str,
    pub is_organization_private: bool,
}

pub fn get_problem(connection: &SqliteConnection, code: &str) -> QueryResult<Option<Problem>> {
    problem::table
        .filter(problem::code.eq(code))
        .first::<Problem>(connection)
        .optional()
}

pub fn upsert_problem(
    connection: &SqliteConnection,
    api_problem: &ApiProblem,
) -> QueryResult<Problem> {
    let types = serde_json::to_string(&api_problem.types)
        .map_err(|e| diesel::result::Error::SerializationError(Box::new(e)))?;
    replace_into(problem::table)
        .values(NewProblem {
            code: &api_problem.code,
            name: &api_problem.name,
            points: api_problem.points.unwrap_or(0.0),
            partial: api_problem.partial,
            time_limit: api_problem.time_limit,
            memory_limit: api_problem.memory_limit,
            types,
            group: &api_problem.group,
            is_organization_private: api_problem.is_organization_private,
        })
        .execute(connection)?;
    problem::table
        .filter(problem::code.eq(&api_problem.code))
        .first(connection)
}

/// Public problems whose point value lies in the inclusive range.
pub fn get_problems_in_range(
    connection: &SqliteConnection,
    low: f64,
    high: f64,
) -> QueryResult<Vec<Problem>> {
    problem::table
        .filter(problem::points.between(low, high))
        .filter(problem::is_organization_private.eq(false))
        .load(connection)
}

pub fn delete_problem(connection: &SqliteConnection, code: &str) -> QueryResult<usize> {
    diesel::delete(problem::table.filter(problem::code.eq(code))).execute(connection)
}

pub fn clear_problems(connection: &SqliteConnection) -> QueryResult<usize> {
    diesel::delete(problem::table).execute(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::test_connection;

    fn api_problem(code: &str, points: f64) -> ApiProblem {
        ApiProblem {
            code: code.to_string(),
            name: format!("Problem {}", code),
            points: Some(points),
            partial: false,
            time_limit: 2.0,
            memory_limit: 262144,
            types: vec!["Greedy Algorithms".to_string()],
            group: "Uncategorized".to_string(),
            is_organization_private: false,
        }
    }

    #[test]
    fn upsert_is_idempotent() {
        let connection = test_connection();
        let fetched = api_problem("helloworld", 3.0);

        let first = upsert_problem(&connection, &fetched).unwrap();
        let second = upsert_problem(&connection, &fetched).unwrap();

        let rows: Vec<Problem> = problem::table.load(&connection).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(first.name, second.name);
        assert_eq!(first.types, second.types);
        assert_eq!(second.tags(), vec!["Greedy Algorithms".to_string()]);
    }

    #[test]
    fn range_filter_is_inclusive_and_skips_private_problems() {
        let connection = test_connection();
        upsert_problem(&connection, &api_problem("a", 5.0)).unwrap();
        upsert_problem(&connection, &api_problem("b", 10.0)).unwrap();
        upsert_problem(&connection, &api_problem("c", 12.0)).unwrap();
        let mut private = api_problem("d", 7.0);
        private.is_organization_private = true;
        upsert_problem(&connection, &private).unwrap();

        let in_range = get_problems_in_range(&connection, 5.0, 10.0).unwrap();
        let mut codes: Vec<&str> = in_range.iter().map(|p| p.code.as_str()).collect();
        codes.sort_unstable();
        assert_eq!(codes, vec!["a", "b"]);
    }
}
