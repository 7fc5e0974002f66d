use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub version: u32,
    pub music_root: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_addr: Option<String>,
    pub scan_on_startup: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            music_root: "music".to_string(),
            port: DEFAULT_PORT,
            bind_addr: None,
            scan_on_startup: true,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        let host = self
            .bind_addr
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .unwrap_or(DEFAULT_BIND_ADDR);
        let port = if self.port == 0 { DEFAULT_PORT } else { self.port };
        format!("{}:{}", host, port)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {}", err),
            ConfigError::Yaml(err) => write!(f, "yaml error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

pub fn config_path_from_env() -> PathBuf {
    match env::var("MELODEX_CONFIG") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => default_config_path(),
    }
}

fn default_config_path() -> PathBuf {
    match env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("config.yaml")),
        Err(_) => PathBuf::from("config.yaml"),
    }
}

/// Loads the config, writing the defaults first when the file does not
/// exist. The flag is true when the file was just created.
pub fn load_or_create_config(path: &Path) -> Result<(ServerConfig, bool), ConfigError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let mut config: ServerConfig = serde_yaml::from_str(&contents)?;
        if config.version < CONFIG_VERSION {
            config.version = CONFIG_VERSION;
        }
        if config.port == 0 {
            config.port = DEFAULT_PORT;
        }
        return Ok((config, false));
    }

    let config = ServerConfig::default();
    save_config(path, &config)?;
    Ok((config, true))
}

pub fn save_config(path: &Path, config: &ServerConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Resolves `value` against the directory holding the config file unless it
/// is already absolute.
pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let raw = PathBuf::from(value.trim());
    if raw.is_absolute() {
        return raw;
    }
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    base.join(raw)
}

#[cfg(test)]
mod tests {
    use super::{load_or_create_config, resolve_path, save_config, ServerConfig};
    use std::fs;
    use std::path::Path;

    #[test]
    fn creates_default_config_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let (config, created) = load_or_create_config(&path).unwrap();
        assert!(created);
        assert_eq!(config, ServerConfig::default());
        assert!(path.exists());

        let (again, created) = load_or_create_config(&path).unwrap();
        assert!(!created);
        assert_eq!(again, config);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "music_root: /srv/music\nport: 0\n").unwrap();

        let (config, created) = load_or_create_config(&path).unwrap();
        assert!(!created);
        assert_eq!(config.music_root, "/srv/music");
        assert_eq!(config.port, 3000);
        assert!(config.scan_on_startup);
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "port: [not a number").unwrap();
        assert!(load_or_create_config(&path).is_err());
    }

    #[test]
    fn saved_config_round_trips_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let config = ServerConfig {
            music_root: "/data/flac".to_string(),
            port: 8080,
            bind_addr: Some("127.0.0.1".to_string()),
            scan_on_startup: false,
            ..ServerConfig::default()
        };
        save_config(&path, &config).unwrap();

        let (loaded, _) = load_or_create_config(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn relative_paths_resolve_beside_config() {
        let config_path = Path::new("/etc/melodex/config.yaml");
        assert_eq!(
            resolve_path(config_path, "music"),
            Path::new("/etc/melodex/music")
        );
        assert_eq!(resolve_path(config_path, "/srv/music"), Path::new("/srv/music"));
        assert_eq!(
            resolve_path(Path::new("config.yaml"), "music"),
            Path::new("./music")
        );
    }
}
