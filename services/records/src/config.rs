/// Records service configuration loaded from environment variables.
#[derive(Debug)]
pub struct RecordsConfig {
    /// MongoDB connection URI. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// Database override. Env vars: `MONGODB_DB`, then `DATABASE_NAME`.
    /// When unset the URI's default database is used.
    pub database_name: Option<String>,
    /// TCP port for the HTTP server (default 3114). Env var: `RECORDS_PORT`.
    pub records_port: u16,
    /// Origin allowed by CORS on `/api/*`; any origin when unset.
    /// Env var: `CORS_ALLOWED_ORIGIN`.
    pub cors_allowed_origin: Option<String>,
}

impl RecordsConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            database_name: non_empty_var("MONGODB_DB").or_else(|| non_empty_var("DATABASE_NAME")),
            records_port: std::env::var("RECORDS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3114),
            cors_allowed_origin: non_empty_var("CORS_ALLOWED_ORIGIN"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Warning for development builds pointed at a shared database.
///
/// Staging and test databases are recognised by name in the connection URI;
/// anything else is assumed to be production.
pub fn database_warning(database_url: &str) -> Option<&'static str> {
    if database_url.contains("Test") {
        Some("using the test database in a development build")
    } else if !database_url.contains("Staging") {
        Some("using the production database in a development build")
    } else {
        None
    }
}
