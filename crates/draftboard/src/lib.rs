// Library root: re-exports all modules so integration tests and the console
// binary can access the crate's public API.

pub mod adp;
pub mod app;
pub mod board;
pub mod cache;
pub mod config;
pub mod console;
pub mod draft;
pub mod metrics;
pub mod player;
pub mod ranking;
