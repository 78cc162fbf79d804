use diesel::prelude::*;
use diesel::replace_into;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use crate::api::ApiJudge;
use crate::schema::judge;

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Judge {
    pub name: String,
    pub online: bool,
    pub ping: Option<f64>,
    pub load: Option<f64>,
}

#[derive(Insertable)]
#[table_name = "judge"]
struct NewJudge<'a> {
    pub name: &'a str,
    pub online: bool,
    pub ping: Option<f64>,
    pub load: Option<f64>,
}

pub fn upsert_judges(connection: &SqliteConnection, judges: &[ApiJudge]) -> QueryResult<usize> {
    for fetched in judges {
        replace_into(judge::table)
            .values(NewJudge {
                name: &fetched.name,
                online: fetched.online,
                ping: fetched.ping,
                load: fetched.load,
            })
            .execute(connection)?;
    }
    Ok(judges.len())
}

pub fn get_judges(connection: &SqliteConnection) -> QueryResult<Vec<Judge>> {
    judge::table.load(connection)
}
