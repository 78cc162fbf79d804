#[macro_use]
extern crate diesel;

pub mod api;
pub mod models;
pub mod predict;
pub mod query;
pub mod recache;
pub mod recommend;
pub mod schema;
pub mod setup;
pub mod throttle;
