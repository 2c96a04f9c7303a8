//! Shared plumbing for the user-account crates.

pub mod utils;
