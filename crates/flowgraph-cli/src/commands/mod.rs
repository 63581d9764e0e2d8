//! CLI command implementations.

pub mod check;
pub mod common;
pub mod dry_run;
pub mod routes;
