use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Deployment environment. Only `dev` may reset the store.
    pub platform: String,
}

impl ApplicationSettings {
    pub fn allows_reset(&self) -> bool {
        self.platform == "dev"
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    /// Keep everything in process memory instead of Postgres.
    #[serde(default)]
    pub in_memory: bool,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Credentials read once at startup
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    /// HMAC secret for access tokens
    pub secret: String,
    /// Key the payment provider presents on webhooks
    pub polka_key: String,
}

impl Settings {
    /// # Errors
    /// Returns `ConfigError::MissingRequired` for an empty signing secret or webhook key
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.secret".to_string()));
        }
        if self.auth.polka_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.polka_key".to_string()));
        }
        if self.application.platform.trim().is_empty() {
            return Err(ConfigError::InvalidValue("application.platform".to_string()));
        }
        Ok(())
    }
}

/// Load `configuration.yaml` (optional) overlaid by `APP_*` environment
/// variables, e.g. `APP_AUTH__SECRET`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
