pub mod prelude;
pub mod users;
