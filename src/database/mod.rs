//! Database layer

pub mod connection;

pub use connection::*;
