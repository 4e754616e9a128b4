//! Environment-driven application configuration.

use std::env;

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Whether requests without an `X-User-Id` header fall back to
    /// `default_user_id` instead of being rejected.
    pub allow_anon: bool,
    /// User id substituted for anonymous requests when `allow_anon` is set.
    pub default_user_id: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            env::var("LOSIENTO_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string());
        let allow_anon = env::var("ALLOW_ANON")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(true);
        let default_user_id =
            env::var("DEFAULT_USER_ID").unwrap_or_else(|_| "local-user".to_string());

        Self {
            bind_addr,
            allow_anon,
            default_user_id,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            allow_anon: true,
            default_user_id: "local-user".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_allows_anonymous_local_use() {
        let cfg = AppConfig::default();
        assert!(cfg.allow_anon);
        assert_eq!(cfg.default_user_id, "local-user");
    }
}
