use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "MedifyMe";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tracing filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,medifyme_lib=debug"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),

    #[error("Invalid HOST value: {0}")]
    InvalidHost(String),
}

/// Process configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub cloudinary_base_url: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub ocr_endpoint: String,
    pub ocr_api_key: String,
    pub stripe_base_url: String,
    pub stripe_secret_key: String,
    pub videosdk_api_key: String,
    pub videosdk_secret_key: String,
    pub google_userinfo_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port_raw = var("PORT", "8080");
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port_raw.clone()))?;
        let host_raw = var("HOST", "0.0.0.0");
        let host = host_raw
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(host_raw.clone()))?;

        Ok(Self {
            db_url: var("DB_URL", "medifyme.db"),
            host,
            port,
            openai_api_key: var("OPENAI_API_KEY", ""),
            openai_base_url: var("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            cloudinary_base_url: var("CLOUDINARY_BASE_URL", "https://api.cloudinary.com"),
            cloudinary_cloud_name: var("CLOUDINARY_CLOUD_NAME", ""),
            cloudinary_api_key: var("CLOUDINARY_API_KEY", ""),
            cloudinary_api_secret: var("CLOUDINARY_API_SECRET", ""),
            ocr_endpoint: var("OCR_ENDPOINT", "https://api.ocr.space/parse/image"),
            ocr_api_key: var("OCR_API_KEY", ""),
            stripe_base_url: var("STRIPE_BASE_URL", "https://api.stripe.com"),
            stripe_secret_key: var("STRIPE_SECRET_KEY", ""),
            videosdk_api_key: var("VIDEOSDK_API_KEY", ""),
            videosdk_secret_key: var("VIDEOSDK_SECRET_KEY", ""),
            google_userinfo_url: var(
                "GOOGLE_USERINFO_URL",
                "https://www.googleapis.com/oauth2/v3/userinfo",
            ),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Names of secrets that are unset. Calls depending on them will fail.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        [
            ("OPENAI_API_KEY", &self.openai_api_key),
            ("CLOUDINARY_CLOUD_NAME", &self.cloudinary_cloud_name),
            ("CLOUDINARY_API_KEY", &self.cloudinary_api_key),
            ("CLOUDINARY_API_SECRET", &self.cloudinary_api_secret),
            ("OCR_API_KEY", &self.ocr_api_key),
            ("STRIPE_SECRET_KEY", &self.stripe_secret_key),
            ("VIDEOSDK_API_KEY", &self.videosdk_api_key),
            ("VIDEOSDK_SECRET_KEY", &self.videosdk_secret_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.db_url, "medifyme.db");
        assert_eq!(config.port, 8080);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert_eq!(
            config.google_userinfo_url,
            "https://www.googleapis.com/oauth2/v3/userinfo"
        );
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("DB_URL", ":memory:"),
            ("PORT", "5000"),
            ("HOST", "127.0.0.1"),
            ("STRIPE_SECRET_KEY", "sk_test_1"),
        ])
        .unwrap();
        assert_eq!(config.db_url, ":memory:");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert_eq!(config.stripe_secret_key, "sk_test_1");
    }

    #[test]
    fn unparsable_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(p) if p == "eighty"));
        assert!(config_from(&[("PORT", "70000")]).is_err());
    }

    #[test]
    fn blank_values_fall_back_to_default() {
        let config = config_from(&[("PORT", "  "), ("DB_URL", "")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_url, "medifyme.db");
    }

    #[test]
    fn missing_secrets_are_listed() {
        let config = config_from(&[("OPENAI_API_KEY", "sk")]).unwrap();
        let missing = config.missing_secrets();
        assert!(!missing.contains(&"OPENAI_API_KEY"));
        assert!(missing.contains(&"STRIPE_SECRET_KEY"));
        assert_eq!(missing.len(), 7);
    }

    #[test]
    fn app_name_is_medifyme() {
        assert_eq!(APP_NAME, "MedifyMe");
    }
}
