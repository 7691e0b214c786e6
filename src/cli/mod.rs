//! CLI command definitions and argument parsing.
//!
//! Uses clap derive macros for ergonomic argument definitions.

pub mod args;

/// Help header with ANSI styling. Bold name, dimmed rest.
pub const ABOUT: &str = "\x1b[1mvibecheck\x1b[0m \x1b[2m· Scope contracts before the change, compliance review after it.\x1b[0m";
