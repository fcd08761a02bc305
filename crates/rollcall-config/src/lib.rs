use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rollcall_core::{AccessToken, CoreError, GroupId, Normalizer};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

const APP_DIR: &str = "rollcall";
const CONFIG_FILENAME: &str = "config.toml";

pub const ACCESS_TOKEN_ENV: &str = "GROUPME_ACCESS_TOKEN";
pub const GROUP_ID_ENV: &str = "GROUPME_GROUP_ID";
pub const DEFAULT_API_BASE_URL: &str = "https://api.groupme.com/v3";
/// Sent when no token is configured anywhere; the API will reject it.
pub const PLACEHOLDER_ACCESS_TOKEN: &str = "your-access-token";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub group_id: Option<GroupId>,
    pub access_token: Option<AccessToken>,
    pub phone_file: Option<PathBuf>,
    pub normalizer: Normalizer,
    pub skip_blank_lines: bool,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            group_id: None,
            access_token: None,
            phone_file: None,
            normalizer: Normalizer::default(),
            skip_blank_lines: false,
            api: ApiConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_secs: None,
                user_agent: None,
            },
        }
    }
}

impl AppConfig {
    /// Falls back to [`PLACEHOLDER_ACCESS_TOKEN`] with a warning when no token is set.
    pub fn access_token_or_placeholder(&self) -> AccessToken {
        if let Some(token) = &self.access_token {
            return token.clone();
        }
        warn!(
            env = ACCESS_TOKEN_ENV,
            "no access token configured, using placeholder token"
        );
        AccessToken::new(PLACEHOLDER_ACCESS_TOKEN).expect("placeholder token is not blank")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid {field} value: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: CoreError,
    },
    #[error("invalid environment variable {name}: {source}")]
    InvalidEnv {
        name: &'static str,
        #[source]
        source: CoreError,
    },
    #[error("invalid api.timeout_secs value: {0}")]
    InvalidTimeout(u64),
    #[error("invalid api.base_url value: empty")]
    EmptyBaseUrl,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    group_id: Option<String>,
    access_token: Option<String>,
    phone_file: Option<PathBuf>,
    default_country_code: Option<String>,
    skip_blank_lines: Option<bool>,
    api: Option<ApiFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiFile {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

/// Loads the config file (if any) and layers the process environment on top.
pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let config = load_file(config_path)?;
    apply_env(config, |name| env::var(name).ok())
}

pub fn load_file(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

/// Environment values win over the file. Empty variables count as unset.
pub fn apply_env<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(token) = var(ACCESS_TOKEN_ENV) {
        let token = AccessToken::new(&token).map_err(|source| ConfigError::InvalidEnv {
            name: ACCESS_TOKEN_ENV,
            source,
        })?;
        config.access_token = Some(token);
    }

    if let Some(group_id) = var(GROUP_ID_ENV) {
        let group_id = GroupId::new(&group_id).map_err(|source| ConfigError::InvalidEnv {
            name: GROUP_ID_ENV,
            source,
        })?;
        config.group_id = Some(group_id);
    }

    Ok(config)
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed, path.parent())?))
}

fn merge_config(parsed: ConfigFile, base_dir: Option<&Path>) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(group_id) = parsed.group_id {
        let group_id = GroupId::new(&group_id).map_err(|source| ConfigError::InvalidField {
            field: "group_id",
            source,
        })?;
        config.group_id = Some(group_id);
    }

    if let Some(token) = parsed.access_token {
        let token = AccessToken::new(&token).map_err(|source| ConfigError::InvalidField {
            field: "access_token",
            source,
        })?;
        config.access_token = Some(token);
    }

    if let Some(phone_file) = parsed.phone_file {
        // Relative paths are taken from the config file's directory.
        let phone_file = match base_dir {
            Some(dir) if phone_file.is_relative() => dir.join(phone_file),
            _ => phone_file,
        };
        config.phone_file = Some(phone_file);
    }

    if let Some(code) = parsed.default_country_code {
        config.normalizer =
            Normalizer::with_country_code(&code).map_err(|source| ConfigError::InvalidField {
                field: "default_country_code",
                source,
            })?;
    }

    if let Some(skip) = parsed.skip_blank_lines {
        config.skip_blank_lines = skip;
    }

    if let Some(api) = parsed.api {
        if let Some(base_url) = api.base_url {
            let trimmed = base_url.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::EmptyBaseUrl);
            }
            config.api.base_url = trimmed.to_string();
        }
        if let Some(timeout) = api.timeout_secs {
            if timeout == 0 {
                return Err(ConfigError::InvalidTimeout(timeout));
            }
            config.api.timeout_secs = Some(timeout);
        }
        if let Some(user_agent) = api.user_agent {
            let trimmed = user_agent.trim();
            if !trimmed.is_empty() {
                config.api.user_agent = Some(trimmed.to_string());
            }
        }
    }

    Ok(config)
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
