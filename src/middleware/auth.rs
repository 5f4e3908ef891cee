//! Request authentication and role gates

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::models::User;
use crate::repositories::UserRepository;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{extract_token_from_header, verify_token, JwtConfig};

/// Authenticated user attached to the request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Verifies the bearer token, loads the account and rejects anything but
/// an Active user. Downstream handlers read the user from extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = extract_token_from_header(header)?;
    let jwt_config = JwtConfig::from(state.config.as_ref());
    let claims = verify_token(token, &jwt_config)?;

    let user_id = claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

    let user = UserRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    if !user.is_active() {
        return Err(AppError::Forbidden("Account is not active".to_string()));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Panel endpoints restricted to the Super Admin
pub fn require_super_admin(user: &User) -> AppResult<()> {
    if user.is_super_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Super Admin access required".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{roles, statuses};

    fn user_with_role(role: &str) -> User {
        let now = chrono::Utc::now();
        User {
            id: uuid::Uuid::new_v4(),
            full_name: "Test".to_string(),
            username: "test".to_string(),
            password_hash: String::new(),
            employee_id: "1234".to_string(),
            mobile_no: String::new(),
            status: statuses::ACTIVE.to_string(),
            i_card: None,
            profile_image: None,
            role: role.to_string(),
            groups: Vec::new(),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn sub_seizer_cannot_pass_the_panel_gate() {
        let user = user_with_role(roles::SUB_SEIZER);
        assert!(require_super_admin(&user).is_err());
        assert!(!user.is_admin_or_above());
    }

    #[test]
    fn admin_cannot_pass_the_panel_gate() {
        let user = user_with_role(roles::ADMIN);
        assert!(require_super_admin(&user).is_err());
        assert!(user.is_admin_or_above());
    }

    #[test]
    fn super_admin_passes_the_panel_gate() {
        let user = user_with_role(roles::SUPER_ADMIN);
        assert!(require_super_admin(&user).is_ok());
        assert!(user.is_admin_or_above());
    }
}
