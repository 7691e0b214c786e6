//! vibecheck: scope-compliance checks for AI coding agents (library crate).
//!
//! A pre-check turns a plan into a scope contract, a diff review holds the
//! finished change to it, and a file-backed memory bank carries project
//! context between the two. Re-exports public modules for the
//! tool-invocation layer and integration tests.

pub mod config;
pub mod constants;
pub mod env;
pub mod memory;
pub mod models;
pub mod output;
pub mod precheck;
pub mod review;
pub mod scanner;
pub mod text;
