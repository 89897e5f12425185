/// Authentication primitives for FleetCheck
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: JWT token generation and validation (HS256)
/// - [`guard`]: Request access guard resolving a token to an active user
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing, 24h access / 30d refresh expiry
/// - **Uniform Failures**: the guard reports every credential failure the
///   same way so callers cannot probe which condition tripped
///
/// # Example
///
/// ```no_run
/// use fleetcheck_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod guard;
pub mod jwt;
pub mod password;
