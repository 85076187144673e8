use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for the contract signup service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Where contract PDFs are written and served from
    pub documents: DocumentsConfig,
    /// Postal code lookup upstream
    pub postal: PostalConfig,
    /// Outgoing mail
    pub smtp: SmtpConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Plan offered when the request leaves it out
    pub plan: PlanConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8000`
    pub bind_address: String,
    /// Origins allowed by CORS; `*` allows any origin
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite file path or connection string)
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Enable automatic migrations
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentsConfig {
    pub contracts_dir: PathBuf,
    /// URL prefix the PDFs are served under
    pub public_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostalConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Defaults to `user` when unset
    pub from_email: Option<String>,
    pub from_name: String,
}

impl SmtpConfig {
    /// Mail is only sent when both credentials are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user, password))
            }
            _ => None,
        }
    }

    pub fn sender_address(&self) -> Option<&str> {
        self.from_email
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.user.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanConfig {
    pub default_name: String,
    pub default_value: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0:8000".to_string(),
                cors_allowed_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "sqlite://database.db".to_string(),
                max_connections: 5,
                auto_migrate: true,
            },
            documents: DocumentsConfig {
                contracts_dir: PathBuf::from("contracts"),
                public_prefix: "/contracts".to_string(),
            },
            postal: PostalConfig {
                base_url: "https://viacep.com.br".to_string(),
                timeout_seconds: 10,
            },
            smtp: SmtpConfig {
                host: "smtp.gmail.com".to_string(),
                port: 587,
                user: None,
                password: None,
                from_email: None,
                from_name: "Sistema de Contratos".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: true,
            },
            plan: PlanConfig {
                default_name: "Plano Premium".to_string(),
                default_value: "R$ 99,90/mês".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (contract-signup.toml)
    /// 3. Environment variables (prefixed with CONTRACT_SIGNUP_, `__` between keys)
    /// 4. Unprefixed DATABASE_URL / SMTP_* variables
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if Path::new("contract-signup.toml").exists() {
            builder = builder.add_source(File::with_name("contract-signup"));
        }

        builder = builder.add_source(
            Environment::with_prefix("CONTRACT_SIGNUP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_allowed_origins")
                .try_parsing(true),
        );

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;
        app_config.apply_legacy_env(|key| std::env::var(key).ok());

        Ok(app_config)
    }

    /// Honor the unprefixed variable names deployments already set.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(host) = lookup("SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Some(port) = lookup("SMTP_PORT").and_then(|p| p.parse().ok()) {
            self.smtp.port = port;
        }
        if let Some(user) = lookup("SMTP_USER") {
            self.smtp.user = Some(user);
        }
        if let Some(password) = lookup("SMTP_PASSWORD") {
            self.smtp.password = Some(password);
        }
        if let Some(from) = lookup("SMTP_FROM_EMAIL") {
            self.smtp.from_email = Some(from);
        }
        if let Some(name) = lookup("SMTP_FROM_NAME") {
            self.smtp.from_name = name;
        }
    }

    /// Render as TOML with secrets masked
    pub fn to_toml_redacted(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.smtp.password.is_some() {
            shown.smtp.password = Some("********".to_string());
        }
        Ok(toml::to_string_pretty(&shown)?)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_legacy_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 587);
        assert!(config.smtp.credentials().is_none());
        assert_eq!(config.documents.public_prefix, "/contracts");
        assert_eq!(config.plan.default_name, "Plano Premium");
    }

    #[test]
    fn test_legacy_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "sqlite://other.db"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USER", "bot@example.com"),
            ("SMTP_PASSWORD", "secret"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_legacy_env(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.database.url, "sqlite://other.db");
        assert_eq!(config.smtp.port, 2525);
        assert_eq!(config.smtp.credentials(), Some(("bot@example.com", "secret")));
        assert_eq!(config.smtp.sender_address(), Some("bot@example.com"));
    }

    #[test]
    fn test_unparseable_port_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_legacy_env(|k| (k == "SMTP_PORT").then(|| "abc".to_string()));
        assert_eq!(config.smtp.port, 587);
    }

    #[test]
    fn test_redacted_toml_hides_password() {
        let mut config = AppConfig::default();
        config.smtp.password = Some("hunter2".to_string());
        let rendered = config.to_toml_redacted().unwrap();
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[smtp]"));
    }
}
