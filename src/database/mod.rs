pub mod db;
pub mod db_structs;

pub use db::{DbClient, DbError};
