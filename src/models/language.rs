use diesel::prelude::*;
use diesel::replace_into;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use crate::api::ApiLanguage;
use crate::schema::language;

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Language {
    pub id: i32,
    pub key: String,
    pub short_name: Option<String>,
    pub common_name: String,
}

#[derive(Insertable)]
#[table_name = "language"]
struct NewLanguage<'a> {
    pub id: i32,
    pub key: &'a str,
    pub short_name: Option<&'a str>,
    pub common_name: &'a str,
}

pub fn upsert_languages(
    connection: &SqliteConnection,
    languages: &[ApiLanguage],
) -> QueryResult<usize> {
    for fetched in languages {
        replace_into(language::table)
            .values(NewLanguage {
                id: fetched.id,
                key: &fetched.key,
                short_name: fetched.short_name.as_deref(),
                common_name: &fetched.common_name,
            })
            .execute(connection)?;
    }
    Ok(languages.len())
}

pub fn get_languages(connection: &SqliteConnection) -> QueryResult<Vec<Language>> {
    language::table.load(connection)
}
