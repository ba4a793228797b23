//! CORS Configuration
//!
//! Browser front-ends on the configured origins may call every endpoint with
//! credentials, any method and any request header.

use axum::http::HeaderValue;
use serde::Deserialize;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    pub max_age: u64, // seconds
}

impl Default for CorsConfig {
    fn default() -> Self {
        CorsConfig {
            allowed_origins: vec![
                "http://localhost:5173".to_string(), // Vite dev server
                "http://localhost:3000".to_string(),
            ],
            allow_credentials: true,
            max_age: 600,
        }
    }
}

impl CorsConfig {
    /// Check if origin is allowed
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }

    /// Build the tower-http layer.
    ///
    /// Methods and headers are mirrored from the preflight request because a
    /// `*` wildcard is not valid together with credentials.
    pub fn layer(&self) -> Result<CorsLayer, axum::http::header::InvalidHeaderValue> {
        let origins = self
            .allowed_origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(self.allow_credentials)
            .max_age(Duration::from_secs(self.max_age)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_allowed() {
        let config = CorsConfig::default();

        assert!(config.is_origin_allowed("http://localhost:5173"));
        assert!(config.is_origin_allowed("http://localhost:3000"));
        assert!(!config.is_origin_allowed("http://localhost:8080"));
        assert!(!config.is_origin_allowed("https://evil.com"));
    }

    #[test]
    fn test_custom_config() {
        let config = CorsConfig {
            allowed_origins: vec!["https://example.com".to_string()],
            allow_credentials: false,
            max_age: 7200,
        };

        assert_eq!(config.max_age, 7200);
        assert!(!config.allow_credentials);
        assert!(config.is_origin_allowed("https://example.com"));
        assert!(!config.is_origin_allowed("https://other.com"));
        assert!(config.layer().is_ok());
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let config = CorsConfig {
            allowed_origins: vec!["http://bad\norigin".to_string()],
            ..Default::default()
        };
        assert!(config.layer().is_err());
    }
}
