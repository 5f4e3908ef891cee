//! Domain models

pub mod batch;
pub mod user;
pub mod vehicle;

pub use batch::*;
pub use user::*;
pub use vehicle::*;
