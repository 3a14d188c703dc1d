/*
 * Responsibility
 * - 環境変数や .env.<SERVER_ENV> / .env の読み込み (HTTP_PORT, DB_URL など)
 * - 設定値のバリデーション (不正なら起動失敗)
 * - 起動ログ用の describe() (sensitive な値は mask)
 */
use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;
use url::Url;

const MASK: &str = "******";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    /// Production logs are JSON lines for the log collector.
    pub fn json_logs(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_env: String,
    pub app_env: AppEnv,
    pub http_port: u16,

    pub db_url: Option<String>,
    pub db_user_name: Option<String>,
    pub db_password: Option<String>,
    pub db_max_connections: u32,
    pub migrations_dir: PathBuf,

    pub health_check_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_env = env::var("SERVER_ENV").unwrap_or_else(|_| "local".to_string());

        // Earlier files win; real environment variables win over both.
        dotenvy::from_filename(format!(".env.{server_env}")).ok();
        dotenvy::dotenv().ok();

        Self::from_lookup(server_env, |key| env::var(key).ok())
    }

    fn from_lookup<F>(server_env: String, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_port = parse_or(&lookup, "HTTP_PORT", 8080)?;
        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let db_url = lookup("DB_URL").filter(|s| !s.is_empty());
        let db_user_name = lookup("DB_USER_NAME").filter(|s| !s.is_empty());
        let db_password = lookup("DB_PASSWORD").filter(|s| !s.is_empty());
        let db_max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid("DB_MAX_CONNECTIONS"));
        }
        let migrations_dir = lookup("MIGRATIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./migrations"));

        let health_check_timeout =
            Duration::from_millis(parse_or(&lookup, "HEALTH_CHECK_TIMEOUT_MS", 500)?);

        Ok(Self {
            server_env,
            app_env,
            http_port,
            db_url,
            db_user_name,
            db_password,
            db_max_connections,
            migrations_dir,
            health_check_timeout,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.http_port))
    }

    /// Connection options for the pool. User name and password override
    /// whatever the URL carries.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let url = self.db_url.as_deref().ok_or(ConfigError::Missing("DB_URL"))?;
        let mut options =
            PgConnectOptions::from_str(url).map_err(|_| ConfigError::Invalid("DB_URL"))?;

        if let Some(user) = &self.db_user_name {
            options = options.username(user);
        }
        if let Some(password) = &self.db_password {
            options = options.password(password);
        }
        Ok(options)
    }

    /// `name: value` lines sorted by name, sensitive values masked.
    pub fn describe(&self) -> String {
        // Destructured so a new field cannot be forgotten here.
        let Config {
            server_env,
            app_env,
            http_port,
            db_url,
            db_user_name,
            db_password,
            db_max_connections,
            migrations_dir,
            health_check_timeout,
        } = self;

        let mut fields: Vec<(&'static str, String, bool)> = vec![
            ("server_env", server_env.clone(), false),
            ("app_env", format!("{app_env:?}"), false),
            ("http_port", http_port.to_string(), false),
            ("db_url", redact_url(db_url), false),
            ("db_user_name", display_opt(db_user_name), false),
            ("db_password", display_opt(db_password), true),
            ("db_max_connections", db_max_connections.to_string(), false),
            ("migrations_dir", migrations_dir.display().to_string(), false),
            ("health_check_timeout", format!("{health_check_timeout:?}"), false),
        ];
        fields.sort_by_key(|(name, _, _)| *name);

        fields
            .into_iter()
            .map(|(name, value, sensitive)| {
                if sensitive {
                    format!("{name}: {MASK}")
                } else {
                    format!("{name}: {value}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn display_opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "<unset>".to_string())
}

// Credentials embedded in the URL are masked; an unparseable URL is masked whole.
fn redact_url(value: &Option<String>) -> String {
    let Some(raw) = value else {
        return display_opt(value);
    };
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some(MASK)).is_err() {
                return MASK.to_string();
            }
            url.to_string()
        }
        Err(_) => MASK.to_string(),
    }
}
