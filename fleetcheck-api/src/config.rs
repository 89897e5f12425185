/// Configuration management for the API server
///
/// Loads configuration from environment variables into a type-safe struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `JWT_SECRET`: secret key for JWT signing, at least 32 chars (required)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: *)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `EMAIL_API_KEY` / `EMAIL_API_URL` / `EMAIL_FROM` / `EMAIL_FROM_NAME`:
///   email provider; the channel is disabled when the key is unset
/// - `SMS_ACCOUNT_SID` / `SMS_AUTH_TOKEN` / `SMS_FROM_NUMBER` / `SMS_API_URL`:
///   SMS provider; the channel is disabled when the SID is unset
/// - `FRONTEND_URL`: base URL used in password reset links
///
/// # Example
///
/// ```no_run
/// use fleetcheck_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use fleetcheck_shared::notify::email::EmailConfig;
use fleetcheck_shared::notify::sms::SmsConfig;
use std::env;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Email channel, when configured
    pub email: Option<EmailConfig>,

    /// SMS channel, when configured
    pub sms: Option<SmsConfig>,

    /// Base URL for links embedded in emails
    pub frontend_url: String,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; "*" means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 characters. Generate with `openssl rand -hex 32`.
    pub secret: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails
    /// to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let email = env::var("EMAIL_API_KEY").ok().map(|api_key| EmailConfig {
            api_key,
            api_url: env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
            from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "no-reply@fleetcheck.example".to_string()),
            from_name: env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "FleetCheck".to_string()),
        });

        let sms = match (env::var("SMS_ACCOUNT_SID"), env::var("SMS_AUTH_TOKEN")) {
            (Ok(account_sid), Ok(auth_token)) => Some(SmsConfig {
                account_sid,
                auth_token,
                from_number: env::var("SMS_FROM_NUMBER").unwrap_or_default(),
                api_url: env::var("SMS_API_URL")
                    .unwrap_or_else(|_| "https://api.twilio.com/2010-04-01".to_string()),
            }),
            _ => None,
        };

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            email,
            sms,
            frontend_url,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            email: None,
            sms: None,
            frontend_url: "http://localhost:3000".to_string(),
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_channels_default_disabled() {
        let config = test_config();
        assert!(config.email.is_none());
        assert!(config.sms.is_none());
    }
}
