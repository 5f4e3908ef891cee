//! Authentication flows

use sqlx::PgPool;
use validator::Validate;

use crate::dto::auth_dto::{AppLoginRequest, LoginRequest, LoginResponse};
use crate::models::{statuses, User};
use crate::repositories::UserRepository;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct AuthController {
    repository: UserRepository,
}

impl AuthController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool),
        }
    }

    /// Admin panel login by username and password
    pub async fn login(
        &self,
        request: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> AppResult<LoginResponse> {
        request.validate()?;

        let user = self
            .repository
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        Self::check_password(&request.password, &user)?;

        // the web panel is the Super Admin's tool; everyone else logs in
        // through the app
        if !user.is_super_admin() {
            return Err(AppError::Forbidden(
                "Panel access is restricted to the Super Admin".to_string(),
            ));
        }

        Self::check_active(&user)?;

        let token = generate_token(user.id, &user.role, jwt_config)?;
        Ok(LoginResponse {
            success: true,
            token,
            user,
        })
    }

    /// Mobile app login: Admin and Sub Seizer accounts only, identified by
    /// either username or mobile number.
    pub async fn app_login(
        &self,
        request: AppLoginRequest,
        jwt_config: &JwtConfig,
    ) -> AppResult<LoginResponse> {
        request.validate()?;

        let user = self
            .repository
            .find_app_user(&request.identifier)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        Self::check_password(&request.password, &user)?;
        Self::check_active(&user)?;

        let token = generate_token(user.id, &user.role, jwt_config)?;
        Ok(LoginResponse {
            success: true,
            token,
            user,
        })
    }

    fn check_password(password: &str, user: &User) -> AppResult<()> {
        let valid = bcrypt::verify(password, &user.password_hash)?;
        if valid {
            Ok(())
        } else {
            Err(AppError::Unauthorized("Invalid credentials".to_string()))
        }
    }

    fn check_active(user: &User) -> AppResult<()> {
        if user.status == statuses::ACTIVE {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Account is {}, contact your administrator",
                user.status
            )))
        }
    }
}
