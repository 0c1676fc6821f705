//! Runtime settings from environment variables with hardcoded fallback defaults.

/// Settings read once at startup and carried in [`crate::state::AppState`].
#[derive(Clone, Debug)]
pub struct Settings {
    /// Bind address for the HTTP listener.
    pub bind_addr: String,
    /// User-scoped connection string (row security applies).
    pub database_url: String,
    /// Elevated connection string bypassing row security; falls back to `database_url`.
    pub admin_database_url: String,
    /// Bearer token the upstream identity layer issues for admin calls.
    pub admin_token: String,
    /// Whether the beta program accepts applications at all.
    pub beta_enabled: bool,
    /// Capacity ceiling for beta applications.
    pub beta_max_applications: i64,
    /// Approve applications at insert time instead of leaving them pending.
    pub beta_auto_approve: bool,
    /// Path to the character template fixtures file.
    pub character_templates_path: String,
}

impl Settings {
    pub fn from_env() -> Self {
        let database_url = env_or("DATABASE_URL", "postgres://localhost/fablepress");
        let admin_database_url = std::env::var("ADMIN_DATABASE_URL")
            .unwrap_or_else(|_| database_url.clone());
        Settings {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000"),
            database_url,
            admin_database_url,
            admin_token: env_or("ADMIN_TOKEN", "dev-admin-token"),
            beta_enabled: env_bool("BETA_ENABLED", true),
            beta_max_applications: env_i64("BETA_MAX_APPLICATIONS", 100),
            beta_auto_approve: env_bool("BETA_AUTO_APPROVE", false),
            character_templates_path: env_or(
                "CHARACTER_TEMPLATES_PATH",
                "fixtures/character_templates.json",
            ),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => parse_bool(&v).unwrap_or(default),
        Err(_) => default,
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    match std::env::var(key) {
        Ok(v) => v.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
