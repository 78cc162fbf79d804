use diesel::prelude::*;
use diesel::replace_into;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use super::lower;
use crate::api::{ApiParticipation, ApiUser};
use crate::schema::user;

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct User {
    pub username: String,
    pub id: i32,
    pub rating: Option<i32>,
    pub points: f64,
    pub performance_points: f64,
    pub problem_count: i32,
    pub contests: String,
}

impl User {
    pub fn participations(&self) -> Vec<ApiParticipation> {
        serde_json::from_str(&self.contests).unwrap_or_default()
    }
}

#[derive(Insertable)]
#[table_name = "user"]
struct NewUser<'a> {
    pub username: &'a str,
    pub id: i32,
    pub rating: Option<i32>,
    pub points: f64,
    pub performance_points: f64,
    pub problem_count: i32,
    pub contests: String,
}

pub fn get_user(connection: &SqliteConnection, username: &str) -> QueryResult<Option<User>> {
    user::table
        .filter(lower(user::username).eq(username.to_lowercase()))
        .first::<User>(connection)
        .optional()
}

pub fn upsert_user(connection: &SqliteConnection, api_user: &ApiUser) -> QueryResult<User> {
    let contests = serde_json::to_string(&api_user.contests)
        .map_err(|e| diesel::result::Error::SerializationError(Box::new(e)))?;
    replace_into(user::table)
        .values(NewUser {
            username: &api_user.username,
            id: api_user.id,
            rating: api_user.rating,
            points: api_user.points,
            performance_points: api_user.performance_points,
            problem_count: api_user.problem_count,
            contests,
        })
        .execute(connection)?;
    user::table
        .filter(user::username.eq(&api_user.username))
        .first(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::test_connection;

    fn api_user(username: &str) -> ApiUser {
        ApiUser {
            id: 7,
            username: username.to_string(),
            points: 120.0,
            performance_points: 115.5,
            problem_count: 12,
            rating: Some(1800),
            contests: vec![ApiParticipation {
                key: "dmopc21c1".to_string(),
                score: 300.0,
                rating: Some(1750),
            }],
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let connection = test_connection();
        upsert_user(&connection, &api_user("Xyene")).unwrap();

        let found = get_user(&connection, "xyene").unwrap().unwrap();
        assert_eq!(found.username, "Xyene");
        assert_eq!(found.participations().len(), 1);
    }

    #[test]
    fn upsert_replaces_the_whole_row() {
        let connection = test_connection();
        upsert_user(&connection, &api_user("quantum")).unwrap();

        let mut updated = api_user("quantum");
        updated.problem_count = 40;
        updated.rating = None;
        upsert_user(&connection, &updated).unwrap();

        let rows: Vec<User> = user::table.load(&connection).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].problem_count, 40);
        assert_eq!(rows[0].rating, None);
    }
}
