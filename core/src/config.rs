//! Client configuration read from the environment.

/// Environment variable holding the backend origin.
pub const ORIGIN_ENV: &str = "FOODLOG_API_ORIGIN";
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and port of the backend, without the `/api` prefix.
    pub origin: String,
}

impl ClientConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }

    pub fn from_env() -> Self {
        let origin = std::env::var(ORIGIN_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        Self { origin }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        assert_eq!(ClientConfig::default().origin, "http://127.0.0.1:8000");
    }

    #[test]
    fn from_env_reads_origin_and_ignores_blank_values() {
        std::env::set_var(ORIGIN_ENV, "https://food.example.com");
        assert_eq!(ClientConfig::from_env().origin, "https://food.example.com");

        std::env::set_var(ORIGIN_ENV, "   ");
        assert_eq!(ClientConfig::from_env(), ClientConfig::default());

        std::env::remove_var(ORIGIN_ENV);
        assert_eq!(ClientConfig::from_env().origin, DEFAULT_ORIGIN);
    }
}
