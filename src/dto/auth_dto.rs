//! Authentication request and response shapes

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

/// Admin panel login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Mobile app login: Admin or Sub Seizer, by username or mobile number
#[derive(Debug, Deserialize, Validate)]
pub struct AppLoginRequest {
    #[validate(length(min = 1, message = "Username or mobile number is required"))]
    pub identifier: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}
