use std::path::{Path, PathBuf};
use std::time::Duration;

use chatlink_gateway::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use chatlink_gateway::{Endpoints, GatewayConfig};
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

/// Environment variable consulted for the identity when no flag is given.
pub const IDENTITY_ENV: &str = "CHATLINK_IDENTITY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatlinkConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    pub base_url: String,
    /// Identity remembered from an earlier login, used when neither the
    /// flag nor the environment supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    /// Per-request timeout. Added in v1.
    pub timeout_secs: u64,
    /// Added in v1.
    pub endpoints: Endpoints,
    pub created_at: jiff::Timestamp,
}

impl Default for ChatlinkConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            base_url: DEFAULT_BASE_URL.to_string(),
            identity: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            endpoints: Endpoints::default(),
            created_at: jiff::Timestamp::now(),
        }
    }
}

impl From<&ChatlinkConfig> for GatewayConfig {
    fn from(config: &ChatlinkConfig) -> Self {
        GatewayConfig::new(config.base_url.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_endpoints(config.endpoints.clone())
    }
}

/// Redacted config info safe to print.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigInfo {
    pub path: String,
    pub base_url: String,
    pub identity_hint: Option<String>,
    pub timeout_secs: u64,
    pub created_at: String,
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("com.chatlink.cli"))
}

pub fn config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub fn has_config() -> bool {
    config_path().map(|p| p.exists()).unwrap_or(false)
}

pub fn load_config() -> eyre::Result<ChatlinkConfig> {
    load_config_from(&config_path()?)
}

/// Load the stored config, or the defaults when none has been saved yet.
pub fn load_or_default() -> eyre::Result<ChatlinkConfig> {
    if has_config() {
        load_config()
    } else {
        Ok(ChatlinkConfig::default())
    }
}

pub fn load_config_from(path: &Path) -> eyre::Result<ChatlinkConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = match json.get("config_version").and_then(|v| v.as_u64()) {
        None => 0,
        Some(v) => u32::try_from(v).map_err(|_| newer_version_error(v))?,
    };

    let migrated = migrate(json, on_disk_version)?;
    let config: ChatlinkConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

fn newer_version_error(version: u64) -> eyre::Report {
    eyre::eyre!(
        "config_version {version} is newer than this build supports ({CURRENT_VERSION}). \
         Please update chatlink."
    )
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(newer_version_error(u64::from(from_version)));
    }

    // v0 → v1: add timeout_secs and endpoints with their defaults
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        obj.entry("timeout_secs")
            .or_insert(serde_json::Value::Number(DEFAULT_TIMEOUT.as_secs().into()));
        if !obj.contains_key("endpoints") {
            obj.insert(
                "endpoints".to_string(),
                serde_json::to_value(Endpoints::default())?,
            );
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (added timeout_secs, endpoints)");
    }

    Ok(json)
}

pub fn save_config(config: &ChatlinkConfig) -> eyre::Result<()> {
    save_config_in(&config_dir()?, config)
}

/// Write `config.json` into `dir`, creating it if needed.
pub fn save_config_in(dir: &Path, config: &ChatlinkConfig) -> eyre::Result<()> {
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let path = dir.join("config.json");
    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = dir.join("config.json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    // The file holds the user's identity; keep it private on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, &path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

pub fn delete_config() -> eyre::Result<()> {
    let path = config_path()?;
    if path.exists() {
        std::fs::remove_file(&path)?;
        tracing::info!(path = %path.display(), "config deleted");
    }
    Ok(())
}

/// Pick the session identity: explicit flag, then environment, then the
/// remembered value. Blank candidates are skipped.
pub fn resolve_identity(
    flag: Option<&str>,
    env: Option<&str>,
    config: &ChatlinkConfig,
) -> Option<String> {
    [flag, env, config.identity.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
}

pub fn config_info(config: &ChatlinkConfig, path: &Path) -> ConfigInfo {
    ConfigInfo {
        path: path.display().to_string(),
        base_url: config.base_url.clone(),
        identity_hint: config.identity.as_deref().map(redact_identity),
        timeout_secs: config.timeout_secs,
        created_at: config.created_at.to_string(),
    }
}

/// Keep the first character of the local part and the whole domain.
pub fn redact_identity(identity: &str) -> String {
    match identity.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None if identity.chars().count() <= 2 => "****".to_string(),
        None => {
            let first: String = identity.chars().take(1).collect();
            format!("{first}***")
        }
    }
}
