use std::fmt;

use agsync_config::{CREDENTIALS_RELATIVE_PATH, ENV_ACCESS_TOKEN, ENV_BASE_URL};
use agsync_core::{ServiceRoot, SyncError};
use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// On-disk credential cache written by the platform's auth tooling.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialCache {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub baseurl: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub apikey: Option<String>,
    #[serde(default)]
    pub apisecret: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Written as either a string or an epoch number by different tools.
    #[serde(default)]
    pub expires_at: Option<serde_json::Value>,
}

/// Read-only auth context shared by every request of a run.
#[derive(Clone)]
pub struct Session {
    access_token: String,
    service: ServiceRoot,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("service", &self.service)
            .finish()
    }
}

pub fn default_credentials_path() -> Option<Utf8PathBuf> {
    let dirs = BaseDirs::new()?;
    let home = Utf8PathBuf::from_path_buf(dirs.home_dir().to_path_buf()).ok()?;
    Some(home.join(CREDENTIALS_RELATIVE_PATH))
}

impl Session {
    pub fn new(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            service: ServiceRoot::new(base_url),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn service(&self) -> &ServiceRoot {
        &self.service
    }

    /// Load from the cache file (or `path` when given); environment variables
    /// take precedence over cached values.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self, SyncError> {
        let path = match path {
            Some(p) => p.to_owned(),
            None => default_credentials_path().ok_or_else(|| {
                SyncError::Credentials("cannot determine home directory".into())
            })?,
        };
        let cache = Self::read_cache(&path)?;
        Self::from_parts(
            &path,
            cache,
            std::env::var(ENV_ACCESS_TOKEN).ok(),
            std::env::var(ENV_BASE_URL).ok(),
        )
    }

    fn read_cache(path: &Utf8Path) -> Result<CredentialCache, SyncError> {
        if !path.exists() {
            debug!("No credential cache at {}", path);
            return Ok(CredentialCache::default());
        }
        let data = std::fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
        serde_json::from_str(&data).map_err(|e| {
            SyncError::Credentials(format!("cannot parse credential cache {path}: {e}"))
        })
    }

    pub fn from_parts(
        source: &Utf8Path,
        cache: CredentialCache,
        env_token: Option<String>,
        env_base: Option<String>,
    ) -> Result<Self, SyncError> {
        let token = env_token
            .filter(|t| !t.is_empty())
            .or(cache.access_token)
            .ok_or_else(|| {
                SyncError::Credentials(format!("no access_token in {source} or ${ENV_ACCESS_TOKEN}"))
            })?;
        let base = env_base
            .filter(|b| !b.is_empty())
            .or(cache.baseurl)
            .ok_or_else(|| {
                SyncError::Credentials(format!("no baseurl in {source} or ${ENV_BASE_URL}"))
            })?;
        Ok(Self::new(token, base))
    }
}
