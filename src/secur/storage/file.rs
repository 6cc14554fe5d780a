use super::{cookie_expiry, CookieJar, LocalCache, SessionMedium, StorageError};
use cookie::Cookie;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use time::OffsetDateTime;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileCookie {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<i64>,
}

impl FileCookie {
    fn is_live(&self, now: i64) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Profile {
    #[serde(default)]
    cookies: BTreeMap<String, FileCookie>,
    #[serde(default)]
    local: BTreeMap<String, String>,
}

/// Both storage mediums persisted in one JSON profile file.
///
/// Every mutation rewrites the whole file through a sibling temp file and a
/// rename, so readers never observe a half-applied change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current profile. A missing file is an empty profile and so is one
    /// that no longer parses; any other read failure is an error.
    fn load(&self) -> Result<Profile, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                warn!("Ignoring unreadable profile {}: {err}", self.path.display());
                Profile::default()
            })),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Profile::default()),
            Err(source) => Err(StorageError::Read {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }

    /// Profile for lookups, which cannot fail: an unreadable file reads as
    /// empty.
    fn snapshot(&self) -> Profile {
        self.load().unwrap_or_else(|err| {
            warn!("{err}");
            Profile::default()
        })
    }

    fn save(&self, profile: &Profile) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(profile)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("profile saved to {}", self.path.display());
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Profile),
    {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut profile = self.load()?;
        mutate(&mut profile);
        self.save(&profile)
    }
}

impl CookieJar for FileStorage {
    fn get(&self, name: &str) -> Option<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.snapshot()
            .cookies
            .get(name)
            .filter(|c| c.is_live(now))
            .map(|c| c.value.clone())
    }

    fn set(&self, cookie: Cookie<'static>) -> Result<(), StorageError> {
        let now = OffsetDateTime::now_utc();
        let expires_at = cookie_expiry(&cookie, now).map(OffsetDateTime::unix_timestamp);
        let name = cookie.name().to_string();
        let value = cookie.value().to_string();
        self.update(move |profile| {
            if expires_at.is_some_and(|at| at <= now.unix_timestamp()) {
                profile.cookies.remove(&name);
            } else {
                profile.cookies.insert(name, FileCookie { value, expires_at });
            }
        })
    }
}

impl LocalCache for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.snapshot().local.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        let value = value.to_string();
        self.update(move |profile| {
            profile.local.insert(key, value);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.update(|profile| profile.local.clear())
    }
}

impl SessionMedium for FileStorage {
    fn clear_session(&self, cookies: &[String]) -> Result<(), StorageError> {
        self.update(|profile| {
            for name in cookies {
                profile.cookies.remove(name);
            }
            profile.local.clear();
        })
    }
}
