use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::QueryResult;
use dotenv::dotenv;
use std::env;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub fn setup_dotenv() {
    dotenv().ok();
}

pub fn establish_pool() -> DbPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    Pool::builder()
        .build(ConnectionManager::new(&database_url))
        .expect(&format!("Error connecting to {}", database_url))
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS user (
    username           TEXT     PRIMARY KEY NOT NULL,
    id                 INTEGER  NOT NULL,
    rating             INTEGER,
    points             DOUBLE   NOT NULL,
    performance_points DOUBLE   NOT NULL,
    problem_count      INTEGER  NOT NULL,
    contests           TEXT     NOT NULL
);

CREATE TABLE IF NOT EXISTS problem (
    code                    TEXT     PRIMARY KEY NOT NULL,
    name                    TEXT     NOT NULL,
    points                  DOUBLE   NOT NULL,
    partial                 BOOLEAN  NOT NULL,
    time_limit              DOUBLE   NOT NULL,
    memory_limit            INTEGER  NOT NULL,
    types                   TEXT     NOT NULL,
    \"group\"              TEXT     NOT NULL,
    is_organization_private BOOLEAN  NOT NULL
);

CREATE TABLE IF NOT EXISTS submission (
    username      TEXT      NOT NULL,
    problem_code  TEXT      NOT NULL,
    date          TIMESTAMP NOT NULL,
    language_key  TEXT      NOT NULL,
    time          DOUBLE,
    memory        DOUBLE,
    points        DOUBLE,
    result        TEXT,
    score_num     INTEGER,
    score_denom   INTEGER,

    PRIMARY KEY (username, problem_code, date)
);

CREATE TABLE IF NOT EXISTS contest (
    key          TEXT    PRIMARY KEY NOT NULL,
    name         TEXT    NOT NULL,
    is_rated     BOOLEAN NOT NULL,
    participants TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS organization (
    id           INTEGER PRIMARY KEY NOT NULL,
    slug         TEXT    NOT NULL,
    short_name   TEXT    NOT NULL,
    is_open      BOOLEAN NOT NULL,
    member_count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS language (
    id          INTEGER PRIMARY KEY NOT NULL,
    key         TEXT    NOT NULL,
    short_name  TEXT,
    common_name TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS judge (
    name   TEXT    PRIMARY KEY NOT NULL,
    online BOOLEAN NOT NULL,
    ping   DOUBLE,
    load   DOUBLE
);

CREATE TABLE IF NOT EXISTS handle (
    account_id BIGINT  PRIMARY KEY NOT NULL,
    handle     TEXT    NOT NULL UNIQUE,
    user_id    INTEGER NOT NULL
);
";

pub fn create_schema(connection: &SqliteConnection) -> QueryResult<()> {
    connection.batch_execute(SCHEMA)
}

#[cfg(test)]
pub fn test_connection() -> SqliteConnection {
    use diesel::Connection;

    let connection = SqliteConnection::establish(":memory:").expect("in-memory database");
    create_schema(&connection).expect("schema creation");
    connection
}
