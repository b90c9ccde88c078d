//! Runtime configuration for fever-chat-backend.
//!
//! Configuration is loaded from a JSON file (every field optional) and can be
//! overridden from the command line.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Persona handed to the generation provider. The fixed-text provider ignores it.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Eres un asistente sanitario en español enfocado EXCLUSIVAMENTE al tema de la fiebre.
INSTRUCCIONES OBLIGATORIAS:
- Responde solo a preguntas relacionadas con la fiebre.
- Si la pregunta está fuera de este ámbito, recházala cortésmente.
- NO proporciones diagnóstico definitivo ni prescripción personalizada.
- Añade: "Esta información no sustituye atención médica profesional"."#;

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "fever-chat-backend", about = "Fixed-answer fever chat backend")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Bind host, overrides `server.host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port, overrides `server.port`.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Assistant persona.
    pub assistant: AssistantConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// System-role instruction forwarded to the provider.
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults for missing fields.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Apply command-line overrides on top of the loaded file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.listen_addr(), "127.0.0.1:5000");
        assert!(cfg.assistant.system_prompt.contains("fiebre"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"server": {{"port": 8081}}}}"#).unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.assistant.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(cfg.server.port, 5000);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["fever-chat-backend", "--host", "0.0.0.0", "--port", "9000"]);
        let mut cfg = Config::default();
        cfg.apply_cli(&cli);
        assert_eq!(cfg.server.listen_addr(), "0.0.0.0:9000");
    }
}
