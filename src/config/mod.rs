//! Project configuration
//!
//! This module holds environment and file-store configuration.

pub mod environment;
pub mod file_store;

pub use environment::*;
pub use file_store::*;
