use diesel::prelude::*;
use diesel::replace_into;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use crate::api::ApiContestDetail;
use crate::schema::contest;

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Contest {
    pub key: String,
    pub name: String,
    pub is_rated: bool,
    pub participants: String,
}

impl Contest {
    pub fn participant_list(&self) -> Vec<String> {
        serde_json::from_str(&self.participants).unwrap_or_default()
    }
}

#[derive(Insertable)]
#[table_name = "contest"]
struct NewContest<'a> {
    pub key: &'a str,
    pub name: &'a str,
    pub is_rated: bool,
    pub participants: String,
}

pub fn get_contest(connection: &SqliteConnection, key: &str) -> QueryResult<Option<Contest>> {
    contest::table
        .filter(contest::key.eq(key))
        .first::<Contest>(connection)
        .optional()
}

pub fn upsert_contest(
    connection: &SqliteConnection,
    api_contest: &ApiContestDetail,
) -> QueryResult<Contest> {
    let usernames: Vec<&str> = api_contest
        .rankings
        .iter()
        .map(|ranking| ranking.user.as_str())
        .collect();
    let participants = serde_json::to_string(&usernames)
        .map_err(|e| diesel::result::Error::SerializationError(Box::new(e)))?;
    replace_into(contest::table)
        .values(NewContest {
            key: &api_contest.key,
            name: &api_contest.name,
            is_rated: api_contest.is_rated,
            participants,
        })
        .execute(connection)?;
    contest::table
        .filter(contest::key.eq(&api_contest.key))
        .first(connection)
}

pub fn delete_contest(connection: &SqliteConnection, key: &str) -> QueryResult<usize> {
    diesel::delete(contest::table.filter(contest::key.eq(key))).execute(connection)
}
