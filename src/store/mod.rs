//! Client-side persistence: a tiny key-value layer and the profile store on top.

use anyhow::{Context, Result};
use fs_err as fs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::errors::{PlannerError, PlannerResult};
use crate::form::FormState;
use crate::wire::CompanyProfile;

pub const SETTINGS_KEY: &str = "planner-settings";
pub const PROFILES_KEY: &str = "planner-profiles";

/// Names seeded when no profile record exists yet.
pub const SEED_PROFILE_NAMES: &[&str] = &["Personal Use", "My Business", "Client Work"];

/// String values under fixed keys. A missing key is `Ok(None)`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key under a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let p = self.path(key);
        if !p.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&p)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = NamedTempFile::new_in(&self.dir)?;
        fs::write(tmp.path(), value)?;
        tmp.persist(self.path(key))
            .with_context(|| format!("persisting {key}"))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let p = self.path(key);
        if p.exists() {
            fs::remove_file(&p)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.data.lock().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub remember_me: bool,
    pub selected_profile_id: String,
}

/// Profiles plus the current selection, loaded once and written through on
/// every change. Writes are best-effort: failures are logged only.
pub struct ProfileStore {
    kv: Box<dyn KeyValueStore>,
    profiles: Vec<CompanyProfile>,
    settings: Settings,
}

fn seed_profiles() -> Vec<CompanyProfile> {
    SEED_PROFILE_NAMES
        .iter()
        .map(|name| CompanyProfile {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            ..Default::default()
        })
        .collect()
}

impl ProfileStore {
    pub fn open_dir(dir: &Path) -> Self {
        Self::load(Box::new(FileStore::new(dir)))
    }

    pub fn load(kv: Box<dyn KeyValueStore>) -> Self {
        let settings = match kv.get(SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::error!("could not parse saved settings: {e}");
                Settings::default()
            }),
            Ok(None) => Settings::default(),
            Err(e) => {
                log::error!("could not load settings: {e:#}");
                Settings::default()
            }
        };

        let mut seeded = false;
        let profiles = match kv.get(PROFILES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::error!("could not parse saved profiles: {e}");
                Vec::new()
            }),
            Ok(None) => {
                seeded = true;
                seed_profiles()
            }
            Err(e) => {
                log::error!("could not load profiles: {e:#}");
                Vec::new()
            }
        };

        let store = Self { kv, profiles, settings };
        if seeded {
            store.persist_profiles();
        }
        store
    }

    pub fn profiles(&self) -> &[CompanyProfile] {
        &self.profiles
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get(&self, id: &str) -> Option<&CompanyProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Match by id first, then by exact name.
    pub fn find(&self, id_or_name: &str) -> Option<&CompanyProfile> {
        self.get(id_or_name)
            .or_else(|| self.profiles.iter().find(|p| p.name == id_or_name))
    }

    pub fn selected(&self) -> Option<&CompanyProfile> {
        if self.settings.selected_profile_id.is_empty() {
            return None;
        }
        self.get(&self.settings.selected_profile_id)
    }

    /// Upsert by id: existing ids are replaced in place, new ids appended.
    /// An empty id gets a fresh one. The saved profile becomes the selection.
    pub fn save(&mut self, mut profile: CompanyProfile, form: &mut FormState) -> PlannerResult<CompanyProfile> {
        if profile.name.trim().is_empty() {
            return Err(PlannerError::Input("Profile Name cannot be empty.".into()));
        }
        if profile.id.is_empty() {
            profile.id = Uuid::new_v4().to_string();
        }
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(slot) => *slot = profile.clone(),
            None => self.profiles.push(profile.clone()),
        }
        self.persist_profiles();
        self.select(Some(profile.id.as_str()), form);
        Ok(profile)
    }

    /// Remove by id; deleting the selected profile resets the selection.
    pub fn delete(&mut self, id: &str, form: &mut FormState) -> bool {
        let before = self.profiles.len();
        self.profiles.retain(|p| p.id != id);
        let removed = self.profiles.len() != before;
        if removed {
            self.persist_profiles();
        }
        if self.settings.selected_profile_id == id {
            self.select(None, form);
        }
        removed
    }

    /// Copy the profile's fields into the form (or clear them for `None`).
    /// The form is never bound to the stored profile afterwards.
    pub fn select(&mut self, id: Option<&str>, form: &mut FormState) {
        match id.filter(|s| !s.is_empty()) {
            Some(id) => {
                self.settings.selected_profile_id = id.to_string();
                if let Some(profile) = self.get(id) {
                    form.hydrate_from(profile);
                } else {
                    log::warn!("selected profile {id} does not exist");
                }
            }
            None => {
                self.settings.selected_profile_id.clear();
                form.clear_profile_fields();
            }
        }
        self.persist_settings();
    }

    pub fn set_remember_me(&mut self, remember: bool) {
        self.settings.remember_me = remember;
        self.persist_settings();
    }

    fn persist_profiles(&self) {
        let result = serde_json::to_string(&self.profiles)
            .map_err(anyhow::Error::from)
            .and_then(|raw| self.kv.set(PROFILES_KEY, &raw));
        if let Err(e) = result {
            log::warn!("could not save profiles: {e:#}");
        }
    }

    // Settings are only kept while "remember me" is on.
    fn persist_settings(&self) {
        let result = if self.settings.remember_me {
            serde_json::to_string(&self.settings)
                .map_err(anyhow::Error::from)
                .and_then(|raw| self.kv.set(SETTINGS_KEY, &raw))
        } else {
            self.kv.remove(SETTINGS_KEY)
        };
        if let Err(e) = result {
            log::warn!("could not save settings: {e:#}");
        }
    }
}
