/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3112). Env var: `AUTH_PORT`.
    pub auth_port: u16,
    /// Accept developer identity parameters and expose the diagnostic route.
    /// Env var: `AUTH_DEV_MODE` (`true` or `1`). Never enable in production.
    pub dev_mode: bool,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            auth_port: std::env::var("AUTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3112),
            dev_mode: parse_flag(std::env::var("AUTH_DEV_MODE").ok().as_deref()),
        }
    }
}

fn parse_flag(value: Option<&str>) -> bool {
    value
        .map(str::trim)
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}
