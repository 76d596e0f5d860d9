use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("DATABASE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5432),
            database: std::env::var("DATABASE_NAME").unwrap_or_else(|_| "backoffice".to_string()),
            username: std::env::var("DATABASE_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: if let Ok(path) = std::env::var("DATABASE_PASSWORD_FILE") {
                std::fs::read_to_string(&path)
                    .map(|p| p.trim().to_string())
                    .unwrap_or_else(|e| {
                        panic!("Failed to read DATABASE_PASSWORD_FILE at {}: {}", path, e)
                    })
            } else {
                std::env::var("DATABASE_PASSWORD").unwrap_or_else(|_| "postgres".to_string())
            },
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub exact_matches: Vec<String>,
    pub wildcard_suffixes: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        let raw_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let mut exact_matches = Vec::new();
        let mut wildcard_suffixes = Vec::new();

        for origin in raw_origins.split(',') {
            let s = origin.trim();
            if s.is_empty() {
                continue;
            }

            if let Some(suffix) = s.strip_prefix('*') {
                let safe_suffix = if suffix.starts_with('.') || suffix.starts_with('-') {
                    suffix.to_string()
                } else {
                    format!(".{}", suffix)
                };
                wildcard_suffixes.push(safe_suffix);
            } else {
                exact_matches.push(s.to_string());
            }
        }

        Self {
            exact_matches,
            wildcard_suffixes,
        }
    }
}

/// Configuration for OpenTelemetry metrics export
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Service name for metrics (default: "backoffice-analytics")
    pub service_name: String,
    /// OTLP gRPC endpoint (e.g., "http://localhost:4317")
    /// If not set, metrics export is disabled
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: std::env::var("TELEMETRY_SERVICE_NAME")
                .unwrap_or_else(|_| "backoffice-analytics".to_string()),
            otlp_endpoint: std::env::var("TELEMETRY_OTLP_ENDPOINT").ok(),
        }
    }
}

impl TelemetryConfig {
    /// Returns true if OTLP export is configured
    pub fn is_enabled(&self) -> bool {
        self.otlp_endpoint.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Global log level: "error", "warn", "info", "debug", or "trace".
    pub level: String,
    /// Log output format: "pretty" or "json".
    pub format: String,
    /// Per-module log level overrides.
    pub modules: HashMap<String, String>,
}

impl LoggingConfig {
    /// Render an `EnvFilter`-compatible directive string from the configured
    /// global level and per-module overrides.
    pub fn directives(&self) -> String {
        let mut directives = vec![self.level.clone()];
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort();
        for (module, level) in modules {
            directives.push(format!("{module}={level}"));
        }
        directives.join(",")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut modules = HashMap::new();

        if let Ok(level) = std::env::var("LOG_MODULE_API") {
            modules.insert("api".to_string(), level);
        }
        if let Ok(level) = std::env::var("LOG_MODULE_SERVICES") {
            modules.insert("services".to_string(), level);
        }
        if let Ok(level) = std::env::var("LOG_MODULE_DATABASE") {
            modules.insert("database".to_string(), level);
        }

        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            modules,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub telemetry: TelemetryConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            telemetry: TelemetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_database_config_defaults() {
        std::env::remove_var("DATABASE_HOST");
        std::env::remove_var("DATABASE_PORT");
        std::env::remove_var("DATABASE_NAME");
        let config = DatabaseConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.database, "backoffice");
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    #[serial]
    fn test_database_config_from_env() {
        std::env::set_var("DATABASE_HOST", "db.internal");
        std::env::set_var("DATABASE_PORT", "6432");
        std::env::set_var("DATABASE_NAME", "storefront");
        let config = DatabaseConfig::default();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6432);
        assert_eq!(config.database, "storefront");
        std::env::remove_var("DATABASE_HOST");
        std::env::remove_var("DATABASE_PORT");
        std::env::remove_var("DATABASE_NAME");
    }

    #[test]
    #[serial]
    fn test_database_config_invalid_port_falls_back() {
        std::env::set_var("DATABASE_PORT", "not-a-port");
        let config = DatabaseConfig::default();
        assert_eq!(config.port, 5432);
        std::env::remove_var("DATABASE_PORT");
    }

    #[test]
    #[serial]
    fn test_cors_config_parsing_exact_matches() {
        std::env::set_var(
            "CORS_ALLOWED_ORIGINS",
            "https://example.com,http://test.com",
        );
        let config = CorsConfig::default();
        assert!(config
            .exact_matches
            .contains(&"https://example.com".to_string()));
        assert!(config
            .exact_matches
            .contains(&"http://test.com".to_string()));
        assert!(config.wildcard_suffixes.is_empty());
        std::env::remove_var("CORS_ALLOWED_ORIGINS");
    }

    #[test]
    #[serial]
    fn test_cors_config_parsing_wildcard_with_dot() {
        std::env::set_var("CORS_ALLOWED_ORIGINS", "*.shop.example");
        let config = CorsConfig::default();
        assert_eq!(config.wildcard_suffixes, vec![".shop.example"]);
        assert!(config.exact_matches.is_empty());
        std::env::remove_var("CORS_ALLOWED_ORIGINS");
    }

    #[test]
    #[serial]
    fn test_cors_config_parsing_wildcard_without_dot() {
        std::env::set_var("CORS_ALLOWED_ORIGINS", "*shop.example");
        let config = CorsConfig::default();
        assert_eq!(config.wildcard_suffixes, vec![".shop.example"]);
        std::env::remove_var("CORS_ALLOWED_ORIGINS");
    }

    #[test]
    #[serial]
    fn test_cors_config_parsing_whitespace_and_empty_entries() {
        std::env::set_var(
            "CORS_ALLOWED_ORIGINS",
            " https://example.com ,, *.shop.example , ",
        );
        let config = CorsConfig::default();
        assert_eq!(config.exact_matches, vec!["https://example.com"]);
        assert_eq!(config.wildcard_suffixes, vec![".shop.example"]);
        std::env::remove_var("CORS_ALLOWED_ORIGINS");
    }

    #[test]
    #[serial]
    fn test_telemetry_disabled_without_endpoint() {
        std::env::remove_var("TELEMETRY_OTLP_ENDPOINT");
        let config = TelemetryConfig::default();
        assert!(!config.is_enabled());
        assert_eq!(config.service_name, "backoffice-analytics");
    }

    #[test]
    #[serial]
    fn test_telemetry_enabled_with_endpoint() {
        std::env::set_var("TELEMETRY_OTLP_ENDPOINT", "http://localhost:4317");
        let config = TelemetryConfig::default();
        assert!(config.is_enabled());
        std::env::remove_var("TELEMETRY_OTLP_ENDPOINT");
    }

    #[test]
    #[serial]
    fn test_logging_directives() {
        std::env::remove_var("LOG_LEVEL");
        std::env::set_var("LOG_MODULE_API", "debug");
        std::env::set_var("LOG_MODULE_DATABASE", "warn");
        let config = LoggingConfig::default();
        assert_eq!(config.directives(), "info,api=debug,database=warn");
        std::env::remove_var("LOG_MODULE_API");
        std::env::remove_var("LOG_MODULE_DATABASE");
    }
}
