use crate::domain::DEFAULT_PRE_RELEASE_TAG;
use crate::error::{BumpError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names looked up inside a directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["verbump.toml", "verbump.json"];

/// Run configuration shared by every project directory.
///
/// Keys are camelCase in both TOML and JSON files, e.g.
///
/// ```toml
/// preReleaseTag = "beta"
/// doPublish = false
/// projectDirs = ["packages/core", "packages/cli"]
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConfig {
    #[serde(default = "default_pre_release_tag")]
    pub pre_release_tag: String,

    #[serde(default = "default_do_publish")]
    pub do_publish: bool,

    #[serde(default = "default_project_dirs")]
    pub project_dirs: Vec<PathBuf>,

    /// Program and arguments used to publish a package
    #[serde(default = "default_publish_command")]
    pub publish_command: Vec<String>,

    /// Remote that release tags are pushed to
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Directory that relative `project_dirs` are resolved against
    #[serde(skip, default = "default_base_dir")]
    pub base_dir: PathBuf,
}

fn default_pre_release_tag() -> String {
    DEFAULT_PRE_RELEASE_TAG.to_string()
}

fn default_do_publish() -> bool {
    true
}

fn default_project_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

fn default_publish_command() -> Vec<String> {
    vec!["npm".to_string(), "publish".to_string()]
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            pre_release_tag: default_pre_release_tag(),
            do_publish: default_do_publish(),
            project_dirs: default_project_dirs(),
            publish_command: default_publish_command(),
            remote: default_remote(),
            base_dir: default_base_dir(),
        }
    }
}

impl ReleaseConfig {
    /// Project directories with relative entries joined onto `base_dir`
    pub fn resolved_dirs(&self) -> Vec<PathBuf> {
        self.project_dirs
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    self.base_dir.join(dir)
                }
            })
            .collect()
    }

    /// Reject configurations that cannot drive a run.
    ///
    /// `publish` is the publish flag in effect for the run, which a command
    /// line override may have changed from `do_publish`.
    pub fn validate(&self, publish: bool) -> Result<()> {
        if self.project_dirs.is_empty() {
            return Err(BumpError::config("projectDirs must list at least one directory"));
        }
        if publish && self.publish_command.is_empty() {
            return Err(BumpError::config("publishCommand must not be empty"));
        }
        if self.remote.is_empty() {
            return Err(BumpError::config("remote must not be empty"));
        }
        Ok(())
    }

    /// Parse a config file's content; `.json` files are JSON, anything else TOML
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut config: ReleaseConfig =
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                serde_json::from_str(&text)
                    .map_err(|e| BumpError::config(format!("{}: {}", path.display(), e)))?
            } else {
                toml::from_str(&text)
                    .map_err(|e| BumpError::config(format!("{}: {}", path.display(), e)))?
            };

        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(default_base_dir);
        Ok(config)
    }
}

/// Where a run takes its configuration from
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Search the current directory, then the user config directory
    Discover,
    /// A config file, or a directory that may contain one
    Path(PathBuf),
    /// A ready-made configuration
    Value(ReleaseConfig),
}

impl ConfigSource {
    pub fn load(self) -> Result<ReleaseConfig> {
        match self {
            ConfigSource::Discover => load_config(None),
            ConfigSource::Path(path) => load_config(Some(path.as_path())),
            ConfigSource::Value(config) => Ok(config),
        }
    }
}

impl From<ReleaseConfig> for ConfigSource {
    fn from(config: ReleaseConfig) -> Self {
        ConfigSource::Value(config)
    }
}

impl From<PathBuf> for ConfigSource {
    fn from(path: PathBuf) -> Self {
        ConfigSource::Path(path)
    }
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path: a file is parsed directly; a directory is searched for
///    `verbump.toml` / `verbump.json` and falls back to defaults
/// 2. `verbump.toml` / `verbump.json` in the current directory
/// 3. `verbump.toml` in the user config directory
/// 4. Default configuration
///
/// # Returns
/// * `Ok(ReleaseConfig)` - Loaded or default configuration
/// * `Err(BumpError::NotFound)` - If a custom path does not exist
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<ReleaseConfig> {
    let found = match config_path {
        Some(path) if path.is_dir() => match find_in_dir(path) {
            Some(file) => Some(file),
            None => {
                debug!("no config file in {}, using defaults", path.display());
                return Ok(ReleaseConfig {
                    base_dir: path.to_path_buf(),
                    ..ReleaseConfig::default()
                });
            }
        },
        Some(path) if path.is_file() => Some(path.to_path_buf()),
        Some(path) => return Err(BumpError::not_found(path)),
        None => return discover_config(Path::new("."), dirs::config_dir().as_deref()),
    };

    load_found(found)
}

/// Search `current_dir` for a config file, then `user_config_dir` for
/// `verbump.toml`, falling back to defaults when neither has one.
pub fn discover_config(
    current_dir: &Path,
    user_config_dir: Option<&Path>,
) -> Result<ReleaseConfig> {
    let found = find_in_dir(current_dir).or_else(|| {
        user_config_dir
            .map(|dir| dir.join(CONFIG_FILE_NAMES[0]))
            .filter(|candidate| candidate.is_file())
    });
    load_found(found)
}

fn load_found(found: Option<PathBuf>) -> Result<ReleaseConfig> {
    match found {
        Some(file) => {
            debug!("loading config from {}", file.display());
            ReleaseConfig::from_file(&file)
        }
        None => Ok(ReleaseConfig::default()),
    }
}
