use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, env_optional, server::ServerConfig};

// Import MongoDB config from the database library
use database::mongodb::MongoConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Bootstrap credentials for the initial superuser account
#[derive(Clone, Debug)]
pub struct FirstSuperuser {
    pub email: String,
    pub password: String,
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub jwt: JwtConfig,
    /// Set when both FIRST_SUPERUSER and FIRST_SUPERUSER_PASSWORD are present
    pub first_superuser: Option<FirstSuperuser>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;

        let first_superuser = match (
            env_optional("FIRST_SUPERUSER"),
            env_optional("FIRST_SUPERUSER_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(FirstSuperuser { email, password }),
            _ => None,
        };

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            jwt,
            first_superuser,
        })
    }
}
