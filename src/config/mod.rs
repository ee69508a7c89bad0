use serde::Deserialize;
use std::env;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub security: SecurityConfig,
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Настройки JWT
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub bcrypt_cost: u32,
}

// Пагинация списка спектаклей
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    pub page_size: u32,
    pub max_page_size: u32,
}

/// Optional superuser created at startup when both username and password are set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// Переменная окружения -> ключ конфигурации
const ENV_KEYS: &[(&str, &str)] = &[
    ("HOST", "app.host"),
    ("PORT", "app.port"),
    ("ENVIRONMENT", "app.environment"),
    ("RUST_LOG", "app.rust_log"),
    ("DATABASE_URL", "database.url"),
    ("DB_POOL_SIZE", "database.pool_size"),
    ("JWT_SECRET", "jwt.secret"),
    ("JWT_ACCESS_TTL_MINUTES", "jwt.access_ttl_minutes"),
    ("JWT_REFRESH_TTL_HOURS", "jwt.refresh_ttl_hours"),
    ("BCRYPT_COST", "security.bcrypt_cost"),
    ("PAGE_SIZE", "pagination.page_size"),
    ("MAX_PAGE_SIZE", "pagination.max_page_size"),
    ("ADMIN_USERNAME", "admin.username"),
    ("ADMIN_EMAIL", "admin.email"),
    ("ADMIN_PASSWORD", "admin.password"),
];

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from defaults overridden by whatever `lookup`
    /// returns for each known environment variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 8000_i64)?
            .set_default("app.environment", "development")?
            .set_default("app.rust_log", "theatre_booking=debug,tower_http=debug")?
            .set_default("database.pool_size", 20_i64)?
            .set_default("jwt.access_ttl_minutes", 5_i64)?
            .set_default("jwt.refresh_ttl_hours", 24_i64)?
            .set_default("security.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?
            .set_default("pagination.page_size", 10_i64)?
            .set_default("pagination.max_page_size", 100_i64)?;

        for (var, key) in ENV_KEYS {
            builder = builder.set_override_option(*key, lookup(var))?;
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_fill_everything_but_secrets() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/theatre"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.app.port, 8000);
        assert_eq!(config.database.pool_size, 20);
        assert_eq!(config.jwt.access_ttl_minutes, 5);
        assert_eq!(config.pagination.page_size, 10);
        assert_eq!(config.pagination.max_page_size, 100);
        assert!(config.admin.username.is_none());
        assert!(!config.app.is_production());
    }

    #[test]
    fn environment_values_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/theatre"),
            ("JWT_SECRET", "secret"),
            ("PORT", "9090"),
            ("ENVIRONMENT", "Production"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_PASSWORD", "changeme"),
        ]))
        .unwrap();

        assert_eq!(config.app.port, 9090);
        assert!(config.app.is_production());
        assert_eq!(config.admin.username.as_deref(), Some("root"));
        assert_eq!(config.admin.password.as_deref(), Some("changeme"));
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let result = Config::from_lookup(lookup_from(&[("JWT_SECRET", "secret")]));
        assert!(result.is_err());
    }
}
