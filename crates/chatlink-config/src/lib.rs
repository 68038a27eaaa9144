use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "chatlink";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_CHUNK_DELAY_MS: u64 = 250;

pub const HUBSPOT_BASE_URL: &str = "https://api.hubapi.com";
pub const HUBSPOT_TOKEN_URL: &str = "https://api.hubapi.com/oauth/v1/token";
pub const HUBSPOT_MAX_CHUNK: usize = 100;
pub const HUBSPOT_PHONE_FIELDS: &[&str] = &[
    "phone",
    "mobilephone",
    "hs_whatsapp_phone_number",
    "hs_searchable_calculated_phone_number",
    "hs_searchable_calculated_mobile_number",
];

pub const ZOHO_BASE_URL: &str = "https://www.zohoapis.com";
pub const ZOHO_TOKEN_URL: &str = "https://accounts.zoho.com/oauth/v2/token";
pub const ZOHO_MAX_CHUNK: usize = 5;
pub const ZOHO_PHONE_FIELDS: &[&str] = &["Phone", "Mobile"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub chunk_delay: Duration,
    pub hubspot: Option<CrmConfig>,
    pub zoho: Option<CrmConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmConfig {
    pub base_url: String,
    pub access_token: String,
    pub refresh: Option<RefreshConfig>,
    pub chunk_size: usize,
    pub phone_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    pub token_url: String,
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chunk_delay: Duration::from_millis(DEFAULT_CHUNK_DELAY_MS),
            hubspot: None,
            zoho: None,
        }
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
    #[error("invalid {section} chunk_size {value}: must be between 1 and {max}")]
    InvalidChunkSize {
        section: &'static str,
        value: usize,
        max: usize,
    },
    #[error("{section}: set exactly one of access_token or access_token_env")]
    AmbiguousToken { section: &'static str },
    #[error("{section}: environment variable {name} is not set")]
    MissingTokenEnv { section: &'static str, name: String },
    #[error("{section}: refresh_token requires client_id and client_secret")]
    IncompleteRefresh { section: &'static str },
    #[error("{section}: phone_fields must not be empty")]
    EmptyPhoneFields { section: &'static str },
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

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    resolution: Option<ResolutionFile>,
    hubspot: Option<CrmFile>,
    zoho: Option<CrmFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResolutionFile {
    chunk_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CrmFile {
    base_url: Option<String>,
    access_token: Option<String>,
    access_token_env: Option<String>,
    refresh_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    token_url: Option<String>,
    chunk_size: Option<usize>,
    phone_fields: Option<Vec<String>>,
}

struct CrmDefaults {
    section: &'static str,
    base_url: &'static str,
    token_url: &'static str,
    max_chunk: usize,
    phone_fields: &'static [&'static str],
}

const HUBSPOT_DEFAULTS: CrmDefaults = CrmDefaults {
    section: "hubspot",
    base_url: HUBSPOT_BASE_URL,
    token_url: HUBSPOT_TOKEN_URL,
    max_chunk: HUBSPOT_MAX_CHUNK,
    phone_fields: HUBSPOT_PHONE_FIELDS,
};

const ZOHO_DEFAULTS: CrmDefaults = CrmDefaults {
    section: "zoho",
    base_url: ZOHO_BASE_URL,
    token_url: ZOHO_TOKEN_URL,
    max_chunk: ZOHO_MAX_CHUNK,
    phone_fields: ZOHO_PHONE_FIELDS,
};

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
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
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(delay_ms) = parsed.resolution.and_then(|resolution| resolution.chunk_delay_ms) {
        config.chunk_delay = Duration::from_millis(delay_ms);
    }
    if let Some(hubspot) = parsed.hubspot {
        config.hubspot = Some(merge_crm(hubspot, &HUBSPOT_DEFAULTS)?);
    }
    if let Some(zoho) = parsed.zoho {
        config.zoho = Some(merge_crm(zoho, &ZOHO_DEFAULTS)?);
    }

    Ok(config)
}

fn merge_crm(file: CrmFile, defaults: &CrmDefaults) -> Result<CrmConfig> {
    let section = defaults.section;
    let access_token = match (file.access_token, file.access_token_env) {
        (Some(token), None) => token,
        (None, Some(name)) => {
            env::var(&name).map_err(|_| ConfigError::MissingTokenEnv { section, name })?
        }
        _ => return Err(ConfigError::AmbiguousToken { section }),
    };

    let chunk_size = file.chunk_size.unwrap_or(defaults.max_chunk);
    if chunk_size == 0 || chunk_size > defaults.max_chunk {
        return Err(ConfigError::InvalidChunkSize {
            section,
            value: chunk_size,
            max: defaults.max_chunk,
        });
    }

    let phone_fields = match file.phone_fields {
        Some(fields) => {
            let fields: Vec<String> = fields
                .into_iter()
                .map(|field| field.trim().to_string())
                .filter(|field| !field.is_empty())
                .collect();
            if fields.is_empty() {
                return Err(ConfigError::EmptyPhoneFields { section });
            }
            fields
        }
        None => defaults
            .phone_fields
            .iter()
            .map(|field| field.to_string())
            .collect(),
    };

    let refresh = match file.refresh_token {
        Some(refresh_token) => match (file.client_id, file.client_secret) {
            (Some(client_id), Some(client_secret)) => Some(RefreshConfig {
                token_url: file
                    .token_url
                    .unwrap_or_else(|| defaults.token_url.to_string()),
                refresh_token,
                client_id,
                client_secret,
            }),
            _ => return Err(ConfigError::IncompleteRefresh { section }),
        },
        None => None,
    };

    Ok(CrmConfig {
        base_url: file
            .base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| defaults.base_url.to_string()),
        access_token,
        refresh,
        chunk_size,
        phone_fields,
    })
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
