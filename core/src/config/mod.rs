use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::install::{DEFAULT_TARGETS, Installer};

const SKILLINK_DIR: &str = ".skillink";
const DEFAULT_SKILLS_ROOT: &str = "Documents/workspaces/skills";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub skills_root: PathBuf,
    pub targets: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            skills_root: home_dir().join(DEFAULT_SKILLS_ROOT),
            targets: DEFAULT_TARGETS.iter().copied().map(PathBuf::from).collect(),
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }

    pub fn installer(&self) -> Installer {
        Installer::new(self.targets.iter().cloned())
    }

    /// Applies a command-line or environment override for the skills root,
    /// expanding a leading `~` the same way the config file does.
    pub fn with_skills_root(mut self, skills_root: Option<PathBuf>) -> Self {
        if let Some(root) = skills_root {
            self.skills_root = expand_home(&root);
        }
        self
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

pub fn get_skillink_dir() -> PathBuf {
    home_dir().join(SKILLINK_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_skillink_dir().join("config.toml")
}

pub fn ensure_skillink_dir() -> Result<PathBuf> {
    let skillink_dir = get_skillink_dir();

    if !skillink_dir.exists() {
        std::fs::create_dir_all(&skillink_dir).with_context(|| {
            format!(
                "Failed to create skillink directory at {}",
                skillink_dir.display()
            )
        })?;
    }

    Ok(skillink_dir)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.skills_root = expand_home(&config.skills_root);

    if config.targets.is_empty() {
        anyhow::bail!(
            "Config at {} lists no install targets",
            config_path.display()
        );
    }

    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_skillink_dir()?;
    save_config_to(config, &get_config_path())
}

pub fn save_config_to(config: &Config, config_path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}
