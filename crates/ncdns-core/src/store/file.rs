// # File Credential Store
//
// JSON profile on disk with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: write to `.tmp`, then rename over the profile
// - Automatic backup: the previous profile is copied to `.backup`
// - Corruption detection: a profile that fails to parse falls back to the backup
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "credentials": {
//     "api_user": "alice",
//     "api_key": "...",
//     "user_name": "alice",
//     "client_ip": "203.0.113.7"
//   },
//   "sandbox": false,
//   "saved_at": "2025-01-09T12:00:00Z"
// }
// ```
//
// On Unix the profile is created with mode 0600 since it holds the API key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::Credentials;
use crate::traits::CredentialStore;

/// Profile format version
const PROFILE_VERSION: &str = "1.0";

/// Serializable profile format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfileFile {
    version: String,
    #[serde(default)]
    credentials: Option<Credentials>,
    #[serde(default)]
    sandbox: bool,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
}

/// File-backed credential store
///
/// Every mutation is written through immediately.
///
/// # Example
///
/// ```rust,no_run
/// use ncdns_core::store::FileCredentialStore;
/// use ncdns_core::traits::CredentialStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileCredentialStore::new("/home/alice/.config/ncdns/profile.json").await?;
///     store.set_sandbox(true).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    profile: Arc<RwLock<ProfileFile>>,
}

impl FileCredentialStore {
    /// Open or create a profile
    ///
    /// 1. Load the profile if it exists
    /// 2. On corruption, load the backup and restore it
    /// 3. If both fail, start empty
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create profile directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let profile = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            profile: Arc::new(RwLock::new(profile)),
        })
    }

    /// Location of the profile
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the profile was last written
    pub async fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.profile.read().await.saved_at
    }

    async fn load_with_recovery(path: &Path) -> Result<ProfileFile, Error> {
        match Self::load(path).await {
            Ok(profile) => Ok(profile),
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Profile appears corrupted: {}. Attempting recovery from backup.",
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup profile found. Starting with an empty profile.");
                    return Ok(Self::empty());
                }

                match Self::load(&backup_path).await {
                    Ok(profile) => {
                        tracing::info!("Recovered profile from backup");
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!(
                                "Failed to restore profile from backup: {}",
                                restore_err
                            );
                        }
                        Ok(profile)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also corrupted: {}. Starting with an empty profile.",
                            backup_err
                        );
                        Ok(Self::empty())
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn load(path: &Path) -> Result<ProfileFile, Error> {
        if !path.exists() {
            tracing::debug!("Profile does not exist: {}", path.display());
            return Ok(Self::empty());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::credential_store(format!("Failed to read profile {}: {}", path.display(), e))
        })?;

        let profile: ProfileFile = serde_json::from_str(&content)?;

        if profile.version != PROFILE_VERSION {
            tracing::warn!(
                "Profile version mismatch: expected {}, got {}. Attempting to load anyway.",
                PROFILE_VERSION,
                profile.version
            );
        }

        Ok(profile)
    }

    fn empty() -> ProfileFile {
        ProfileFile {
            version: PROFILE_VERSION.to_string(),
            ..ProfileFile::default()
        }
    }

    /// Mutate the profile and write it through
    async fn update<F>(&self, mutate: F) -> Result<(), Error>
    where
        F: FnOnce(&mut ProfileFile),
    {
        let mut guard = self.profile.write().await;
        let mut next = guard.clone();
        mutate(&mut next);
        next.version = PROFILE_VERSION.to_string();
        next.saved_at = Some(Utc::now());

        self.write(&next).await?;
        *guard = next;
        Ok(())
    }

    async fn write(&self, profile: &ProfileFile) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(profile)?;

        let temp_path = self.temp_path();
        {
            let mut file = Self::create_private(&temp_path).await?;
            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::credential_store(format!("Failed to write {}: {}", temp_path.display(), e))
            })?;
            file.flush().await.map_err(|e| {
                Error::credential_store(format!("Failed to flush {}: {}", temp_path.display(), e))
            })?;
        }

        if self.path.exists() {
            if let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await {
                tracing::warn!("Failed to create profile backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::credential_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Profile written to {}", self.path.display());
        Ok(())
    }

    #[cfg(unix)]
    async fn create_private(path: &Path) -> Result<fs::File, Error> {
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .await
            .map_err(|e| {
                Error::credential_store(format!("Failed to create {}: {}", path.display(), e))
            })
    }

    #[cfg(not(unix))]
    async fn create_private(path: &Path) -> Result<fs::File, Error> {
        fs::File::create(path).await.map_err(|e| {
            Error::credential_store(format!("Failed to create {}: {}", path.display(), e))
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn credentials(&self) -> Result<Option<Credentials>, Error> {
        Ok(self.profile.read().await.credentials.clone())
    }

    async fn is_sandbox(&self) -> Result<bool, Error> {
        Ok(self.profile.read().await.sandbox)
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), Error> {
        credentials.validate()?;
        let credentials = credentials.clone();
        self.update(move |profile| profile.credentials = Some(credentials)).await
    }

    async fn set_sandbox(&self, sandbox: bool) -> Result<(), Error> {
        self.update(|profile| profile.sandbox = sandbox).await
    }

    async fn clear(&self) -> Result<(), Error> {
        self.update(|profile| profile.credentials = None).await
    }
}
