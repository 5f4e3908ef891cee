pub mod auth_dto;
pub mod common;
pub mod user_dto;
pub mod vehicle_dto;

pub use common::{ApiResponse, PaginatedResponse, Pagination};
