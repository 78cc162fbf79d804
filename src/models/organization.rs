use diesel::prelude::*;
use diesel::replace_into;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use crate::api::ApiOrganization;
use crate::schema::organization;

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Organization {
    pub id: i32,
    pub slug: String,
    pub short_name: String,
    pub is_open: bool,
    pub member_count: i32,
}

#[derive(Insertable)]
#[table_name = "organization"]
struct NewOrganization<'a> {
    pub id: i32,
    pub slug: &'a str,
    pub short_name: &'a str,
    pub is_open: bool,
    pub member_count: i32,
}

pub fn upsert_organizations(
    connection: &SqliteConnection,
    organizations: &[ApiOrganization],
) -> QueryResult<usize> {
    for fetched in organizations {
        replace_into(organization::table)
            .values(NewOrganization {
                id: fetched.id,
                slug: &fetched.slug,
                short_name: &fetched.short_name,
                is_open: fetched.is_open,
                member_count: fetched.member_count,
            })
            .execute(connection)?;
    }
    Ok(organizations.len())
}

pub fn get_organizations(connection: &SqliteConnection) -> QueryResult<Vec<Organization>> {
    organization::table.load(connection)
}
