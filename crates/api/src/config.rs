use sqlx::postgres::PgConnectOptions;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development except
/// the database location, which must be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Database connection settings.
    pub database: DatabaseConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    ///
    /// See [`DatabaseConfig::from_env`] for the database variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database: DatabaseConfig::from_env(),
        }
    }
}

/// Where and how to connect to PostgreSQL.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Parsed connection options, including credentials.
    pub connect_options: PgConnectOptions,
    /// Connection string with the password masked, safe to log.
    pub redacted_url: String,
    /// Pool size (default: `20`).
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Load database settings from the environment.
    ///
    /// `DATABASE_URL` wins when set. Otherwise `DB_HOST`, `DB_PORT`,
    /// `DB_NAME`, `DB_USER` and `DB_PASSWORD` must all be present; they are
    /// passed to the driver as separate components so credentials need no
    /// URL escaping. `DB_MAX_CONNECTIONS` defaults to `20`.
    pub fn from_env() -> Self {
        let max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        if let Ok(url) = std::env::var("DATABASE_URL") {
            let connect_options = url
                .parse::<PgConnectOptions>()
                .expect("DATABASE_URL must be a valid PostgreSQL URL");
            return Self {
                connect_options,
                redacted_url: redact_url(&url),
                max_connections,
            };
        }

        let var = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| {
                panic!("Missing DB connection environment variable {name} (or set DATABASE_URL)")
            })
        };
        let host = var("DB_HOST");
        let port: u16 = var("DB_PORT").parse().expect("DB_PORT must be a valid u16");
        let name = var("DB_NAME");
        let user = var("DB_USER");
        let password = var("DB_PASSWORD");

        Self {
            connect_options: PgConnectOptions::new()
                .host(&host)
                .port(port)
                .database(&name)
                .username(&user)
                .password(&password),
            redacted_url: format!("postgres://{user}:****@{host}:{port}/{name}"),
            max_connections,
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Mask the password component of a connection URL, if there is one.
pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|i| i + 3) else {
        return url.to_string();
    };
    let rest = &url[scheme_end..];
    let Some(at) = rest.rfind('@') else {
        return url.to_string();
    };
    let userinfo = &rest[..at];
    match userinfo.find(':') {
        Some(colon) => format!(
            "{}{}:****{}",
            &url[..scheme_end],
            &userinfo[..colon],
            &rest[at..]
        ),
        None => url.to_string(),
    }
}
