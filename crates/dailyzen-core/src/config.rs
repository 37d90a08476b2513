use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "DAILYZEN_DATA_DIR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub share: ShareConfig,
    #[serde(default)]
    pub purchases: PurchaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub quotes: QuotesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_reminder_hour")]
    pub hour: u8,
    #[serde(default)]
    pub minute: u8,
    #[serde(default = "default_reminder_title")]
    pub title: String,
    /// `"quote"` puts the day's quote in the body; anything else is literal.
    #[serde(default = "default_reminder_body")]
    pub body: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            hour: default_reminder_hour(),
            minute: 0,
            title: default_reminder_title(),
            body: default_reminder_body(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    #[serde(default = "default_share_signature")]
    pub signature: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            signature: default_share_signature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseConfig {
    #[serde(default = "default_true")]
    pub sandbox: bool,
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            sandbox: default_true(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotesConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub user: UserConfig,
    pub data_dir: PathBuf,
    pub resolved_output: String,
}

/// Location of the user config file, if a config directory exists.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dailyzen/config.toml"))
}

/// Load a config file; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the user config from the platform config directory.
///
/// # Errors
///
/// Returns an error if the config file exists but is invalid.
pub fn load_user_config() -> Result<UserConfig> {
    user_config_path().map_or_else(|| Ok(UserConfig::default()), |p| load_config_file(&p))
}

/// Resolve config, data directory and output mode.
///
/// # Errors
///
/// Returns an error if the config file is invalid or no data directory can
/// be determined.
pub fn resolve_config(cli_json: bool) -> Result<EffectiveConfig> {
    let user = load_user_config()?;
    resolve_with(user, cli_json)
}

/// Resolve an already loaded config against the environment.
///
/// # Errors
///
/// Returns an error if no data directory can be determined.
pub fn resolve_with(user: UserConfig, cli_json: bool) -> Result<EffectiveConfig> {
    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.clone(), env_format);
    let data_dir = resolve_data_dir(
        env::var_os(DATA_DIR_ENV).map(PathBuf::from),
        user.storage.data_dir.clone(),
        dirs::data_dir(),
    )?;

    Ok(EffectiveConfig {
        user,
        data_dir,
        resolved_output,
    })
}

fn resolve_data_dir(
    env_dir: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    platform_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = env_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }
    if let Some(dir) = config_dir {
        return Ok(dir);
    }
    platform_dir
        .map(|dir| dir.join("dailyzen"))
        .with_context(|| format!("No data directory found; set {DATA_DIR_ENV}"))
}

fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_true() -> bool {
    true
}

const fn default_reminder_hour() -> u8 {
    9
}

fn default_reminder_title() -> String {
    "dailyzen".to_string()
}

fn default_reminder_body() -> String {
    "quote".to_string()
}

fn default_share_signature() -> String {
    "via Daily Zen 🪷".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = load_config_file(&dir.path().join("config.toml")).expect("load should succeed");
        assert!(cfg.reminder.enabled);
        assert_eq!(cfg.reminder.hour, 9);
        assert_eq!(cfg.reminder.minute, 0);
        assert_eq!(cfg.reminder.title, "dailyzen");
        assert_eq!(cfg.share.signature, "via Daily Zen 🪷");
        assert!(cfg.purchases.sandbox);
        assert!(cfg.storage.data_dir.is_none());
        assert!(cfg.quotes.path.is_none());
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
output = "json"

[reminder]
hour = 7
minute = 30

[purchases]
sandbox = false
"#,
        )
        .expect("write config");

        let cfg = load_config_file(&path).expect("parse");
        assert_eq!(cfg.output.as_deref(), Some("json"));
        assert_eq!((cfg.reminder.hour, cfg.reminder.minute), (7, 30));
        assert_eq!(cfg.reminder.title, "dailyzen");
        assert!(!cfg.purchases.sandbox);
        assert_eq!(cfg.share.signature, "via Daily Zen 🪷");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reminder\nhour = ").expect("write config");
        assert!(load_config_file(&path).is_err());
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        let output = resolve_output(true, Some("pretty".to_string()), Some("text".to_string()));
        assert_eq!(output, "json");
    }

    #[test]
    fn env_overrides_config_and_aliases_normalize() {
        let output = resolve_output(false, Some("json".to_string()), Some("human".to_string()));
        assert_eq!(output, "pretty");
        let output = resolve_output(false, Some("table".to_string()), None);
        assert_eq!(output, "text");
    }

    #[test]
    fn data_dir_precedence_is_env_then_config_then_platform() {
        let env_dir = PathBuf::from("/env");
        let cfg_dir = PathBuf::from("/cfg");
        let platform = PathBuf::from("/platform");

        assert_eq!(
            resolve_data_dir(Some(env_dir.clone()), Some(cfg_dir.clone()), Some(platform.clone()))
                .expect("resolves"),
            env_dir
        );
        assert_eq!(
            resolve_data_dir(None, Some(cfg_dir.clone()), Some(platform.clone())).expect("resolves"),
            cfg_dir
        );
        assert_eq!(
            resolve_data_dir(Some(PathBuf::new()), None, Some(platform.clone())).expect("resolves"),
            platform.join("dailyzen")
        );
        assert!(resolve_data_dir(None, None, None).is_err());
    }
}
