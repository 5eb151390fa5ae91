//! Layered server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the YAML file given
//! with `--config`, `WEB_BASE__*` environment variables (`__` separates
//! nesting levels), then CLI overrides.

use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use web_gate::GateConfig;
use web_messages::MessagesConfig;

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "WEB_BASE__";

/// Gate secret variable; read verbatim, never parsed as a typed value
pub const SECRET_ENV: &str = "WEB_BASE__GATE__SECRET";

/// Figment key of the gate secret
const SECRET_KEY: &str = "gate.secret";

const DEFAULT_PORT: u16 = 8086;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Values from the command line that override every other source
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
}

impl AppConfig {
    /// Load defaults, then the optional YAML file, then the environment.
    ///
    /// The secret variable is taken as a raw string so values such as `007`
    /// or `true` reach the gate unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the merged
    /// configuration is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .split("__")
                .ignore(&[SECRET_KEY]),
        );
        if let Some(secret) = env::var_os(SECRET_ENV) {
            let secret = secret
                .into_string()
                .map_err(|_| anyhow::anyhow!("{SECRET_ENV} is not valid UTF-8"))?;
            figment = figment.merge(Serialized::default(SECRET_KEY, secret));
        }

        let config: AppConfig = figment
            .extract()
            .context("failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.port {
            self.server.bind_addr.set_port(port);
        }
    }

    /// # Errors
    ///
    /// Returns an error describing the first invalid section.
    pub fn validate(&self) -> Result<()> {
        self.gate.validate().context("invalid gate configuration")?;
        self.messages
            .validate()
            .context("invalid messages configuration")?;
        Ok(())
    }

    /// Effective configuration as JSON; the gate secret is redacted.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize configuration")
    }
}
