use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::core::constants::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
use crate::utils::url::normalize_base_url;

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Gateway base URL (e.g., "http://localhost:8000")
    pub base_url: Option<String>,
    /// Model used when no --model flag is given
    pub default_model: Option<String>,
    /// System prompt that opens every transcript
    pub system_prompt: Option<String>,
}

/// Render a path with `$HOME` shortened to `~` for messages.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(
                    f,
                    "Failed to read config at {}: {}",
                    path_display(path),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse config at {}: {}",
                    path_display(path),
                    source
                )
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        Self::load_from_path(&Self::get_config_path())
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                path: config_path.clone(),
                source,
            })?;
            let config: Config =
                toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: config_path.clone(),
                    source,
                })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to_path(&Self::get_config_path())
    }

    pub(crate) fn save_to_path(
        &self,
        config_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };

        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file
            .persist(config_path)
            .map_err(|err| -> Box<dyn std::error::Error> { Box::new(err) })?;
        Ok(())
    }

    pub(crate) fn get_config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "ods", "vortex")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    /// Gateway base URL after applying precedence: CLI flag, then
    /// `$VORTEX_BASE_URL`, then the config file, then the built-in default.
    /// The result is normalized (no trailing slashes).
    pub fn resolve_base_url(&self, flag: Option<&str>) -> String {
        let raw = flag
            .map(str::to_string)
            .or_else(|| std::env::var("VORTEX_BASE_URL").ok())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        normalize_base_url(&raw)
    }

    pub fn resolve_model(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn resolve_system_prompt(&self) -> String {
        self.system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
    }

    pub fn print_all(&self) {
        println!("Config file: {}", path_display(Self::get_config_path()));
        println!(
            "  base-url: {}",
            self.base_url.as_deref().unwrap_or("(default)")
        );
        println!(
            "  default-model: {}",
            self.default_model.as_deref().unwrap_or("(default)")
        );
        println!(
            "  system-prompt: {}",
            self.system_prompt.as_deref().unwrap_or("(default)")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(config.base_url.is_none());
        assert!(config.default_model.is_none());
        assert!(config.system_prompt.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            base_url: Some("http://10.0.0.5:8000".to_string()),
            default_model: Some("llama3.2:1b".to_string()),
            system_prompt: None,
        };
        config.save_to_path(&path).unwrap();

        let reloaded = Config::load_from_path(&path).unwrap();
        assert_eq!(reloaded.base_url.as_deref(), Some("http://10.0.0.5:8000"));
        assert_eq!(reloaded.default_model.as_deref(), Some("llama3.2:1b"));
        assert!(reloaded.system_prompt.is_none());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = [not toml").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn base_url_precedence_flag_env_config_default() {
        // This test owns VORTEX_BASE_URL; no other test reads it.
        std::env::remove_var("VORTEX_BASE_URL");

        let config = Config {
            base_url: Some("http://from-config:8000/".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_base_url(Some("http://from-flag:8000/")),
            "http://from-flag:8000"
        );
        assert_eq!(config.resolve_base_url(None), "http://from-config:8000");

        std::env::set_var("VORTEX_BASE_URL", "http://from-env:8000/");
        assert_eq!(config.resolve_base_url(None), "http://from-env:8000");
        assert_eq!(
            config.resolve_base_url(Some("http://from-flag:8000")),
            "http://from-flag:8000"
        );
        std::env::remove_var("VORTEX_BASE_URL");

        let empty = Config::default();
        assert_eq!(empty.resolve_base_url(None), DEFAULT_BASE_URL);
    }

    #[test]
    fn model_and_prompt_resolution() {
        let config = Config {
            default_model: Some("llama3.2:1b".to_string()),
            system_prompt: Some("Be terse.".to_string()),
            ..Config::default()
        };
        assert_eq!(config.resolve_model(Some("qwen3:0.6b")), "qwen3:0.6b");
        assert_eq!(config.resolve_model(None), "llama3.2:1b");
        assert_eq!(config.resolve_system_prompt(), "Be terse.");

        let empty = Config::default();
        assert_eq!(empty.resolve_model(None), DEFAULT_MODEL);
        assert_eq!(empty.resolve_system_prompt(), DEFAULT_SYSTEM_PROMPT);
    }
}
