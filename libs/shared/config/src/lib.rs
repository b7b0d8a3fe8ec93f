use std::env;
use tracing::warn;

pub const DEFAULT_UPSTREAM_API_URL: &str = "https://cetech.roque.tecnm.mx/api";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub upstream_api_url: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub session_cookie_name: String,
    pub session_max_age_secs: i64,
    pub session_cookie_secure: bool,
    pub slot_conflict_rule: String,
    pub slot_deduplicate: bool,
    pub slot_minutes: i64,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstream_api_url: DEFAULT_UPSTREAM_API_URL.to_string(),
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            session_cookie_name: "auth_token".to_string(),
            session_max_age_secs: 60 * 60,
            session_cookie_secure: false,
            slot_conflict_rule: "exact_start".to_string(),
            slot_deduplicate: false,
            slot_minutes: 60,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            upstream_api_url: env::var("UPSTREAM_API_URL")
                .unwrap_or_else(|_| {
                    warn!("UPSTREAM_API_URL not set, using default");
                    defaults.upstream_api_url.clone()
                }),
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session_cookie_name),
            session_max_age_secs: parse_var("SESSION_MAX_AGE_SECS", defaults.session_max_age_secs),
            session_cookie_secure: parse_var("SESSION_COOKIE_SECURE", defaults.session_cookie_secure),
            slot_conflict_rule: env::var("SLOT_CONFLICT_RULE")
                .unwrap_or(defaults.slot_conflict_rule),
            slot_deduplicate: parse_var("SLOT_DEDUPLICATE", defaults.slot_deduplicate),
            slot_minutes: parse_var("SLOT_MINUTES", defaults.slot_minutes),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.upstream_api_url.is_empty()
            && !self.supabase_url.is_empty()
            && !self.supabase_service_key.is_empty()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_upstream_behavior() {
        let config = AppConfig::default();
        assert_eq!(config.upstream_api_url, DEFAULT_UPSTREAM_API_URL);
        assert_eq!(config.session_cookie_name, "auth_token");
        assert_eq!(config.session_max_age_secs, 3600);
        assert_eq!(config.slot_minutes, 60);
        assert_eq!(config.slot_conflict_rule, "exact_start");
        assert!(!config.slot_deduplicate);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        env::set_var("STUDENT_PORTAL_TEST_SLOT", "not-a-number");
        assert_eq!(parse_var("STUDENT_PORTAL_TEST_SLOT", 60i64), 60);
        env::set_var("STUDENT_PORTAL_TEST_SLOT", " 30 ");
        assert_eq!(parse_var("STUDENT_PORTAL_TEST_SLOT", 60i64), 30);
        env::remove_var("STUDENT_PORTAL_TEST_SLOT");
    }
}
