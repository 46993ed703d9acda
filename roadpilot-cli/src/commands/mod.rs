//! CLI command implementations.

mod common;

pub mod config;
pub mod drive;
pub mod history;
pub mod init;
pub mod routes;
