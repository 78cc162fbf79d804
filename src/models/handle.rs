use diesel::insert_into;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;
use thiserror::Error;

use super::lower;
use crate::schema::handle;

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Handle {
    pub account_id: i64,
    pub handle: String,
    pub user_id: i32,
}

#[derive(Insertable)]
#[table_name = "handle"]
struct NewHandle<'a> {
    pub account_id: i64,
    #[column_name = "handle_name"]
    pub handle: &'a str,
    pub user_id: i32,
}

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("account is already linked to {0}")]
    AccountTaken(String),
    #[error("{0} is already linked to another account")]
    HandleTaken(String),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

pub fn get_handle(connection: &SqliteConnection, account_id: i64) -> QueryResult<Option<Handle>> {
    handle::table
        .filter(handle::account_id.eq(account_id))
        .first::<Handle>(connection)
        .optional()
}

pub fn get_handle_by_username(
    connection: &SqliteConnection,
    username: &str,
) -> QueryResult<Option<Handle>> {
    handle::table
        .filter(lower(handle::handle_name).eq(username.to_lowercase()))
        .first::<Handle>(connection)
        .optional()
}

/// At most one live link per chat account and per judge username. A second
/// link attempt is rejected without touching the existing row.
pub fn link(
    connection: &SqliteConnection,
    account_id: i64,
    username: &str,
    user_id: i32,
) -> Result<Handle, LinkError> {
    if let Some(existing) = get_handle(connection, account_id)? {
        return Err(LinkError::AccountTaken(existing.handle));
    }
    if get_handle_by_username(connection, username)?.is_some() {
        return Err(LinkError::HandleTaken(username.to_string()));
    }
    insert_into(handle::table)
        .values(NewHandle {
            account_id,
            handle: username,
            user_id,
        })
        .execute(connection)?;
    handle::table
        .filter(handle::account_id.eq(account_id))
        .first(connection)
        .map_err(LinkError::Database)
}

/// Removes the link when a member leaves or an admin forces a relink.
pub fn unlink(connection: &SqliteConnection, account_id: i64) -> QueryResult<bool> {
    let deleted =
        diesel::delete(handle::table.filter(handle::account_id.eq(account_id))).execute(connection)?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::test_connection;

    #[test]
    fn second_link_for_an_account_is_rejected() {
        let connection = test_connection();
        link(&connection, 1001, "ada", 7).unwrap();

        let rejected = link(&connection, 1001, "grace", 8);
        match rejected {
            Err(LinkError::AccountTaken(existing)) => assert_eq!(existing, "ada"),
            other => panic!("expected AccountTaken, got {:?}", other.map(|h| h.handle)),
        }

        let kept = get_handle(&connection, 1001).unwrap().unwrap();
        assert_eq!(kept.handle, "ada");
    }

    #[test]
    fn a_username_cannot_be_linked_twice() {
        let connection = test_connection();
        link(&connection, 1001, "ada", 7).unwrap();

        let rejected = link(&connection, 1002, "Ada", 7);
        assert!(matches!(rejected, Err(LinkError::HandleTaken(_))));
        assert!(get_handle(&connection, 1002).unwrap().is_none());
    }

    #[test]
    fn unlink_reports_whether_a_row_was_removed() {
        let connection = test_connection();
        link(&connection, 1001, "ada", 7).unwrap();

        assert!(unlink(&connection, 1001).unwrap());
        assert!(!unlink(&connection, 1001).unwrap());
        assert!(get_handle(&connection, 1001).unwrap().is_none());
    }
}
