use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DaemonConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub exec: ExecConfig,
}

impl DaemonConfig {
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path();
        if config_path.exists() {
            let raw = fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read config file {}", config_path.display()))?;
            let parsed: DaemonConfig = toml::from_str(&raw)
                .with_context(|| format!("failed to parse TOML from {}", config_path.display()))?;
            return Ok(parsed);
        }

        Ok(DaemonConfig::default())
    }
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("SUGGESTD_CONFIG") {
        return Path::new(&path).to_path_buf();
    }

    if let Some(base) = dirs::config_dir() {
        return base.join("suggestd").join("config.toml");
    }

    Path::new("/tmp/suggestd.toml").to_path_buf()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = env::var("XDG_RUNTIME_DIR") {
        return Path::new(&runtime_dir).join("suggestd").join("suggestd.sock");
    }
    Path::new("/tmp/suggestd.sock").to_path_buf()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
    #[serde(default = "default_dictionaries_dir")]
    pub dictionaries_dir: PathBuf,
    #[serde(default = "default_processor_dirs")]
    pub processor_dirs: Vec<PathBuf>,
}

impl PathsConfig {
    pub fn custom_words_file(&self) -> PathBuf {
        self.config_dir.join("custom-words.json")
    }

    pub fn history_file(&self) -> PathBuf {
        self.config_dir.join("history.json")
    }

    pub fn ignore_list_file(&self) -> PathBuf {
        self.config_dir.join("ignore.json")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            dictionaries_dir: default_dictionaries_dir(),
            processor_dirs: default_processor_dirs(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    if let Some(base) = dirs::config_dir() {
        return base.join("suggestd");
    }
    Path::new("/tmp/suggestd").to_path_buf()
}

fn default_dictionaries_dir() -> PathBuf {
    Path::new("/usr/share/suggestd/dictionaries").to_path_buf()
}

fn default_processor_dirs() -> Vec<PathBuf> {
    vec![
        default_config_dir().join("processors"),
        Path::new("/usr/share/suggestd/processors").to_path_buf(),
    ]
}

/// Timeout applied to every spawned external command: processors, the
/// input injector, and keyboard-layout detection.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecConfig {
    #[serde(default = "default_exec_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_exec_timeout_ms(),
        }
    }
}

fn default_exec_timeout_ms() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = DaemonConfig::default();
        assert!(config.paths.custom_words_file().ends_with("custom-words.json"));
        assert!(config.paths.history_file().ends_with("history.json"));
        assert!(config.paths.ignore_list_file().ends_with("ignore.json"));
        assert_eq!(config.paths.processor_dirs.len(), 2);
        assert!(config.exec.timeout_ms > 0);
    }

    #[test]
    fn partial_toml_keeps_section_defaults() {
        let config: DaemonConfig = toml::from_str(
            r#"
            [server]
            socket_path = "/tmp/test.sock"

            [paths]
            dictionaries_dir = "/opt/dicts"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.socket_path, Path::new("/tmp/test.sock"));
        assert_eq!(
            config.server.request_timeout_ms,
            default_request_timeout_ms()
        );
        assert_eq!(config.paths.dictionaries_dir, Path::new("/opt/dicts"));
        assert_eq!(config.paths.config_dir, default_config_dir());
    }
}
