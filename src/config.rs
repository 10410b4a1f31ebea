use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_GAZETTEER: &str = "data/ottoman_locations.csv";
pub const DEFAULT_STORE: &str = "data/appointments.csv";

/// Startup settings, read once from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub gazetteer_path: PathBuf,
    pub store_path: PathBuf,
}

impl Config {
    pub fn from_env(port: u16) -> Self {
        Self::from_lookup(port, |key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source
    pub fn from_lookup<F>(port: u16, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            port,
            backend_url: get("MOBILITY_BACKEND_URL", DEFAULT_BACKEND_URL),
            gazetteer_path: PathBuf::from(get("MOBILITY_GAZETTEER", DEFAULT_GAZETTEER)),
            store_path: PathBuf::from(get("MOBILITY_STORE", DEFAULT_STORE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset_or_blank() {
        let config = Config::from_lookup(9000, |key| match key {
            "MOBILITY_STORE" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.port, 9000);
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE));
    }

    #[test]
    fn environment_overrides() {
        let config = Config::from_lookup(DEFAULT_PORT, |key| match key {
            "MOBILITY_BACKEND_URL" => Some("http://ocr.internal:8000".to_string()),
            "MOBILITY_GAZETTEER" => Some("/srv/locations.csv".to_string()),
            _ => None,
        });
        assert_eq!(config.backend_url, "http://ocr.internal:8000");
        assert_eq!(config.gazetteer_path, PathBuf::from("/srv/locations.csv"));
    }
}
