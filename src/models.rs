use diesel::sql_types::Text;

pub mod contest;
pub mod handle;
pub mod judge;
pub mod language;
pub mod organization;
pub mod problem;
pub mod submission;
pub mod user;

sql_function!(fn lower(x: Text) -> Text);
