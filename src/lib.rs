//! motus - workout routine planner
//!
//! Exercise database, workout table engine and plan file import/export.

pub mod db;
pub mod exercises;
pub mod motfile;
pub mod workout;

pub use db::Database;
