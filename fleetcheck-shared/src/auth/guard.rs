/// Request access guard
///
/// Resolves an `Authorization: Bearer <token>` header to an active user.
/// The resulting [`AuthUser`] is what every tenant-scoped query keys off.
///
/// # Failure Policy
///
/// Every failure (missing header, malformed header, invalid or expired
/// token, unknown user, deactivated user) maps to [`AuthError`] variants that
/// the API layer collapses into one generic 401 response. Callers must never
/// be able to tell which condition tripped.

use crate::auth::jwt;
use crate::models::user::{User, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

/// Error type for access guard failures
///
/// Variants exist for logging; the HTTP layer renders them all identically.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header present
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Header present but not a Bearer token
    #[error("Malformed authorization header")]
    MalformedHeader,

    /// Token failed signature, expiry, issuer, or type checks
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jwt::JwtError),

    /// Token subject does not resolve to an active user
    #[error("Unknown or inactive user")]
    UnknownUser,

    /// Database failure while loading the user
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Authenticated request context
///
/// Inserted into request extensions by the API's auth middleware. Handlers
/// take `company_id` from here, never from the request body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID
    pub id: Uuid,

    /// Tenant the user belongs to
    pub company_id: Uuid,

    /// Role loaded fresh from the database, not from the token
    pub role: UserRole,
}

impl AuthUser {
    /// Whether the user holds one of the given roles
    pub fn has_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }

    /// Whether the user can manage tenant resources (admin or supervisor)
    pub fn is_manager(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Supervisor)
    }
}

/// Authenticates a request from its Authorization header
///
/// Validates the access token, then loads the user by the token subject and
/// rejects missing or deactivated accounts. The role comes from the user row
/// so a role change takes effect without waiting for token expiry.
///
/// # Errors
///
/// Returns an [`AuthError`] for any credential failure
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    auth_header: Option<&str>,
) -> Result<AuthUser, AuthError> {
    let header = auth_header.ok_or(AuthError::MissingCredentials)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?;

    let claims = jwt::validate_access_token(token, secret)?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    if !user.is_active {
        return Err(AuthError::UnknownUser);
    }

    let role = user.get_role().ok_or(AuthError::UnknownUser)?;

    Ok(AuthUser {
        id: user.id,
        company_id: user.company_id,
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_role() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            role: UserRole::Supervisor,
        };

        assert!(user.has_role(&[UserRole::Admin, UserRole::Supervisor]));
        assert!(!user.has_role(&[UserRole::Admin]));
    }

    #[test]
    fn test_is_manager() {
        let mut user = AuthUser {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            role: UserRole::Admin,
        };
        assert!(user.is_manager());

        user.role = UserRole::Supervisor;
        assert!(user.is_manager());

        user.role = UserRole::Driver;
        assert!(!user.is_manager());

        user.role = UserRole::Mechanic;
        assert!(!user.is_manager());
    }

    // Database-backed authentication tests live in the API integration suite
}
