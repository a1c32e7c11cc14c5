//! Configuration types for the studio runtime.
//!
//! Paths are always derived from the studio root. Everything else can be
//! overridden in `.studio/config.toml`; missing keys keep their defaults.

use crate::agents::Role;
use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-root state directory.
pub const STATE_DIR: &str = ".studio";

/// File name used by the export action.
pub const EXPORT_FILE_NAME: &str = "screenplay_final.txt";

/// Main studio configuration.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Studio root directory.
    pub root: PathBuf,

    /// State directory (`.studio`).
    pub state_dir: PathBuf,

    /// Path to the configuration file (`.studio/config.toml`).
    pub config_file: PathBuf,

    /// SQLite database holding the projects table.
    pub db_path: PathBuf,

    /// Log file used while the TUI owns the terminal.
    pub log_file: PathBuf,

    /// Default export destination for the final script.
    pub export_file: PathBuf,

    /// Directories with prompt template overrides, first match wins.
    pub prompt_dirs: Vec<PathBuf>,

    /// Connection settings for the generative-text service.
    pub agent: AgentConfig,

    /// Retry policy applied to every agent call.
    pub retry: RetryPolicy,

    /// Model settings per role.
    pub roles: RoleModes,
}

impl StudioConfig {
    /// Creates a configuration with defaults rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        let state_dir = root.join(STATE_DIR);
        Self {
            config_file: state_dir.join("config.toml"),
            db_path: state_dir.join("studio.db"),
            log_file: state_dir.join("studio.log"),
            export_file: root.join(EXPORT_FILE_NAME),
            state_dir,
            root,
            prompt_dirs: Vec::new(),
            agent: AgentConfig::default(),
            retry: RetryPolicy::default(),
            roles: RoleModes::default(),
        }
    }

    /// Loads the configuration for `root`, applying `.studio/config.toml` on
    /// top of the defaults when the file exists.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::ConfigParseError`] for malformed TOML and
    /// [`StudioError::InvalidConfig`] for out-of-range values.
    pub fn load(root: PathBuf) -> Result<Self> {
        let mut config = Self::new(root);
        if !config.config_file.exists() {
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config.config_file)?;
        let file: ConfigFile =
            toml::from_str(&content).map_err(|e| StudioError::ConfigParseError {
                path: config.config_file.clone(),
                message: e.to_string(),
            })?;

        config.prompt_dirs = file
            .prompt_dirs
            .into_iter()
            .map(|dir| resolve(&config.root, dir))
            .collect();
        config.agent = file.agent;
        config.retry = file.retry;
        config.roles = file.roles;

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.agent.base_url.trim().is_empty() {
            return Err(StudioError::InvalidConfig("agent.base_url is empty".into()));
        }
        if self.agent.timeout_secs == 0 {
            return Err(StudioError::InvalidConfig(
                "agent.timeout_secs must be positive".into(),
            ));
        }
        self.retry.validate()?;
        for role in Role::ALL {
            let mode = self.roles.for_role(role);
            if !(0.0..=1.0).contains(&mode.temperature) {
                return Err(StudioError::InvalidConfig(format!(
                    "roles.{}.temperature must be within 0.0..=1.0",
                    role.as_str()
                )));
            }
            if mode.max_tokens == 0 {
                return Err(StudioError::InvalidConfig(format!(
                    "roles.{}.max_tokens must be positive",
                    role.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Creates the state directory and writes the current settings to the
    /// config file.
    ///
    /// # Returns
    ///
    /// `false` if a config file already exists and `force` is not set; the
    /// existing file is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the file cannot be written.
    pub fn write_default(&self, force: bool) -> Result<bool> {
        std::fs::create_dir_all(&self.state_dir)?;
        if self.config_file.exists() && !force {
            return Ok(false);
        }
        std::fs::write(&self.config_file, self.to_toml()?)?;
        tracing::info!(path = %self.config_file.display(), "wrote config file");
        Ok(true)
    }

    /// Renders the current settings in config file form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        let file = ConfigFile {
            prompt_dirs: self.prompt_dirs.clone(),
            agent: self.agent.clone(),
            retry: self.retry.clone(),
            roles: self.roles.clone(),
        };
        toml::to_string_pretty(&file).map_err(|e| StudioError::InvalidConfig(e.to_string()))
    }
}

fn resolve(root: &Path, dir: PathBuf) -> PathBuf {
    if dir.is_absolute() { dir } else { root.join(dir) }
}

/// On-disk shape of `.studio/config.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    prompt_dirs: Vec<PathBuf>,
    agent: AgentConfig,
    retry: RetryPolicy,
    roles: RoleModes,
}

/// Connection settings for the generative-text service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Messages endpoint URL.
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com/v1/messages".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

impl AgentConfig {
    /// Reads the API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::SessionUnavailable`] if the variable is unset
    /// or empty.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(StudioError::SessionUnavailable(format!(
                "{} not set; agents cannot authenticate",
                self.api_key_env
            ))),
        }
    }
}

/// Exponential backoff for agent calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Delay before the first retry, in seconds.
    pub initial_secs: f64,

    /// Upper bound on a single delay, in seconds.
    pub max_secs: f64,

    /// Growth factor between consecutive delays.
    pub multiplier: f64,

    /// Total time budget for one call including retries, in seconds.
    pub deadline_secs: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_secs: 1.0,
            max_secs: 60.0,
            multiplier: 2.0,
            deadline_secs: 120.0,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.initial_secs * self.multiplier.powi(exponent);
        secs_to_duration(secs.min(self.max_secs))
    }

    /// Total time budget for one call.
    pub fn deadline(&self) -> Duration {
        secs_to_duration(self.deadline_secs)
    }

    fn validate(&self) -> Result<()> {
        let finite = [
            self.initial_secs,
            self.max_secs,
            self.multiplier,
            self.deadline_secs,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite || self.initial_secs <= 0.0 || self.deadline_secs <= 0.0 {
            return Err(StudioError::InvalidConfig(
                "retry delays and deadline must be positive".into(),
            ));
        }
        if self.multiplier < 1.0 {
            return Err(StudioError::InvalidConfig(
                "retry.multiplier must be at least 1.0".into(),
            ));
        }
        if self.max_secs < self.initial_secs {
            return Err(StudioError::InvalidConfig(
                "retry.max_secs must not be below retry.initial_secs".into(),
            ));
        }
        if self.max_secs > MAX_RETRY_SECS || self.deadline_secs > MAX_RETRY_SECS {
            return Err(StudioError::InvalidConfig(format!(
                "retry.max_secs and retry.deadline_secs must not exceed {MAX_RETRY_SECS}"
            )));
        }
        Ok(())
    }
}

/// Longest retry delay or deadline accepted from the config file, in seconds.
pub const MAX_RETRY_SECS: f64 = 86_400.0;

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_RETRY_SECS))
        .unwrap_or(Duration::from_secs(MAX_RETRY_SECS as u64))
}

/// Model settings for one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentMode {
    /// Model identifier.
    pub model: String,

    /// Sampling temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,

    /// Maximum tokens for the response.
    pub max_tokens: u32,
}

impl Default for AgentMode {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            temperature: 0.7,
            max_tokens: 8192,
        }
    }
}

/// Model settings for every role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleModes {
    /// Research department.
    pub researcher: AgentMode,

    /// Writer's room.
    pub writer: AgentMode,

    /// Editor's desk.
    pub editor: AgentMode,

    /// Art department.
    pub storyboard: AgentMode,
}

impl RoleModes {
    /// Settings for `role`.
    pub fn for_role(&self, role: Role) -> &AgentMode {
        match role {
            Role::Researcher => &self.researcher,
            Role::Writer => &self.writer,
            Role::Editor => &self.editor,
            Role::Storyboard => &self.storyboard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_root() {
        let config = StudioConfig::new(PathBuf::from("/films"));
        assert_eq!(config.state_dir, PathBuf::from("/films/.studio"));
        assert_eq!(config.config_file, PathBuf::from("/films/.studio/config.toml"));
        assert_eq!(config.db_path, PathBuf::from("/films/.studio/studio.db"));
        assert_eq!(
            config.export_file,
            PathBuf::from("/films/screenplay_final.txt")
        );
    }

    #[test]
    fn test_default_retry_policy_backoff() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.backoff(0), Duration::from_secs(1));
        assert_eq!(retry.backoff(1), Duration::from_secs(2));
        assert_eq!(retry.backoff(5), Duration::from_secs(32));
        assert_eq!(retry.backoff(6), Duration::from_secs(60));
        assert_eq!(retry.backoff(40), Duration::from_secs(60));
        assert_eq!(retry.deadline(), Duration::from_secs(120));
    }

    #[test]
    fn test_unvalidated_retry_policy_never_panics() {
        let retry = RetryPolicy {
            initial_secs: 1.0,
            max_secs: 1e30,
            multiplier: 10.0,
            deadline_secs: 1e30,
        };
        assert_eq!(retry.backoff(200), Duration::from_secs(86_400));
        assert_eq!(retry.deadline(), Duration::from_secs(86_400));
        assert!(retry.validate().is_err());
    }

    #[test]
    fn test_default_modes() {
        let modes = RoleModes::default();
        for role in Role::ALL {
            let mode = modes.for_role(role);
            assert_eq!(mode.temperature, 0.7);
            assert_eq!(mode.max_tokens, 8192);
        }
    }

    #[test]
    fn test_missing_api_key_is_session_error() {
        let agent = AgentConfig {
            api_key_env: "STUDIO_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..AgentConfig::default()
        };
        assert!(matches!(
            agent.api_key(),
            Err(StudioError::SessionUnavailable(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = StudioConfig::new(PathBuf::from("/films"));
        assert!(config.validate().is_ok());

        config.roles.editor.temperature = 1.5;
        assert!(config.validate().is_err());

        config.roles.editor.temperature = 0.2;
        config.retry.multiplier = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_toml_round_trips_through_load() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = StudioConfig::new(temp_dir.path().to_path_buf());
        config.roles.editor.temperature = 0.1;

        std::fs::create_dir_all(&config.state_dir).unwrap();
        std::fs::write(&config.config_file, config.to_toml().unwrap()).unwrap();

        let loaded = StudioConfig::load(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(loaded.roles, config.roles);
        assert_eq!(loaded.retry, config.retry);
        assert_eq!(loaded.agent, config.agent);
    }

    #[test]
    fn test_write_default_keeps_existing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = StudioConfig::new(temp_dir.path().to_path_buf());

        assert!(config.write_default(false).unwrap());
        std::fs::write(&config.config_file, "prompt_dirs = [\"mine\"]\n").unwrap();
        assert!(!config.write_default(false).unwrap());
        assert_eq!(
            std::fs::read_to_string(&config.config_file).unwrap(),
            "prompt_dirs = [\"mine\"]\n"
        );
        assert!(config.write_default(true).unwrap());
    }
}
