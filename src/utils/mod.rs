//! Shared utilities

pub mod errors;
pub mod jwt;
