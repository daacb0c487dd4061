//=========================================================================
// Settings
//=========================================================================
//
// The merged configuration consumed at scene-start time, plus the
// key-value store it persists through.
//
// Persistence is partitioned:
// - local-only: { enabled }            (machine-specific kill switch)
// - synced:     everything else, as one JSON object whose top level
//               mixes global fields with one sub-object per scene id.
//
// Loading deep-merges stored values over registry defaults, field by
// field, so settings written by a newer or older build (extra scenes,
// missing options) degrade to defaults instead of failing. The merged
// overlay for every registered scene always contains every key of that
// scene's current schema.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

//=== Internal Dependencies ===============================================

use crate::core::options::{OptionMap, OptionValue};
use crate::core::registry::Registry;

//=== PowerMode ===========================================================

/// How aggressively the host may keep the display/system awake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerMode {
    Normal,
    Display,
    System,
}

impl Default for PowerMode {
    fn default() -> Self {
        PowerMode::Normal
    }
}

//=== StoreError ==========================================================

/// Failure talking to the settings store.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Format(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "settings store I/O failed: {}", e),
            Self::Format(e) => write!(f, "settings store data malformed: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Format(e)
    }
}

//=== SettingsStore =======================================================

/// Key-value persistence with a synced and a local-only partition.
///
/// `None` means the partition has never been written; callers fall back
/// to defaults.
pub trait SettingsStore {
    fn load_synced(&self) -> Result<Option<Value>, StoreError>;
    fn load_local(&self) -> Result<Option<Value>, StoreError>;
    fn save_synced(&mut self, value: Value) -> Result<(), StoreError>;
    fn save_local(&mut self, value: Value) -> Result<(), StoreError>;
}

//--- MemoryStore ---------------------------------------------------------

/// In-memory store, used by tests and as the zero-config default.
#[derive(Debug, Default)]
pub struct MemoryStore {
    synced: Option<Value>,
    local: Option<Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load_synced(&self) -> Result<Option<Value>, StoreError> {
        Ok(self.synced.clone())
    }

    fn load_local(&self) -> Result<Option<Value>, StoreError> {
        Ok(self.local.clone())
    }

    fn save_synced(&mut self, value: Value) -> Result<(), StoreError> {
        self.synced = Some(value);
        Ok(())
    }

    fn save_local(&mut self, value: Value) -> Result<(), StoreError> {
        self.local = Some(value);
        Ok(())
    }
}

//--- JsonFileStore -------------------------------------------------------

/// File-backed store: one JSON document per partition.
#[derive(Debug)]
pub struct JsonFileStore {
    synced_path: PathBuf,
    local_path: PathBuf,
}

impl JsonFileStore {
    /// `dir/settings.json` holds the synced partition, `dir/local.json`
    /// the local one.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            synced_path: dir.join("settings.json"),
            local_path: dir.join("local.json"),
        }
    }

    fn read(path: &PathBuf) -> Result<Option<Value>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn write(path: &PathBuf, value: &Value) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn load_synced(&self) -> Result<Option<Value>, StoreError> {
        Self::read(&self.synced_path)
    }

    fn load_local(&self) -> Result<Option<Value>, StoreError> {
        Self::read(&self.local_path)
    }

    fn save_synced(&mut self, value: Value) -> Result<(), StoreError> {
        Self::write(&self.synced_path, &value)
    }

    fn save_local(&mut self, value: Value) -> Result<(), StoreError> {
        Self::write(&self.local_path, &value)
    }
}

//=== Settings ============================================================

/// Fully-merged host configuration.
///
/// Read once per scene start and immutable for the scene's running
/// lifetime; a change while running triggers a full destroy + recreate.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Local partition: whether the host activates at all.
    pub enabled: bool,

    /// A scene id, or the sentinels "random" / "black".
    pub scene_type: String,

    pub power_mode: PowerMode,
    pub idle_minutes: u32,
    pub switch_to_black_minutes: u32,

    /// 0–100 darkening applied over whatever the scene draws.
    pub dim_level: u8,

    /// Rendered-frame cap: 0 (unlimited), 20, 30 or 60.
    pub max_framerate: u32,

    /// Period for re-rolling the random pick while running. 0 disables.
    pub random_cycle_minutes: u32,

    /// Subset of ids eligible for random selection; `None` means all.
    pub enabled_for_random: Option<Vec<String>>,

    /// Per-scene option overlay. For every registered id this contains
    /// every key of that scene's schema.
    pub scene_options: BTreeMap<String, OptionMap>,

    /// Unrecognized top-level synced keys, preserved across save/load so
    /// a newer build's data survives a round trip through this one.
    pub extra: BTreeMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            scene_type: crate::core::registry::BLACK_SCENE.to_string(),
            power_mode: PowerMode::Normal,
            idle_minutes: 5,
            switch_to_black_minutes: 0,
            dim_level: 0,
            max_framerate: 60,
            random_cycle_minutes: 0,
            enabled_for_random: None,
            scene_options: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }
}

//--- Synced field keys ---------------------------------------------------

const KEY_TYPE: &str = "screensaverType";
const KEY_POWER: &str = "powerMode";
const KEY_IDLE: &str = "idleMinutes";
const KEY_BLACK: &str = "switchToBlackMinutes";
const KEY_DIM: &str = "dimLevel";
const KEY_FRAMERATE: &str = "maxFramerate";
const KEY_CYCLE: &str = "randomCycleMinutes";
const KEY_RANDOM_POOL: &str = "enabledForRandom";

const GLOBAL_KEYS: [&str; 8] = [
    KEY_TYPE,
    KEY_POWER,
    KEY_IDLE,
    KEY_BLACK,
    KEY_DIM,
    KEY_FRAMERATE,
    KEY_CYCLE,
    KEY_RANDOM_POOL,
];

impl Settings {
    //--- Defaults ---------------------------------------------------------

    /// Core defaults plus every registered scene's schema defaults.
    pub fn defaults(registry: &Registry) -> Self {
        Self {
            scene_options: registry.get_all_defaults(),
            ..Self::default()
        }
    }

    //--- Load -------------------------------------------------------------

    /// Loads and deep-merges stored values over `defaults(registry)`.
    ///
    /// Every field is extracted individually: a missing or wrong-typed
    /// entry leaves the default in place instead of failing the load.
    pub fn load(store: &dyn SettingsStore, registry: &Registry) -> Result<Self, StoreError> {
        let mut settings = Self::defaults(registry);

        if let Some(Value::Object(local)) = store.load_local()? {
            if let Some(enabled) = local.get("enabled").and_then(Value::as_bool) {
                settings.enabled = enabled;
            }
        }

        let Some(Value::Object(synced)) = store.load_synced()? else {
            return Ok(settings);
        };

        if let Some(v) = synced.get(KEY_TYPE).and_then(Value::as_str) {
            settings.scene_type = v.to_string();
        }
        if let Some(v) = synced.get(KEY_POWER) {
            if let Ok(mode) = serde_json::from_value::<PowerMode>(v.clone()) {
                settings.power_mode = mode;
            }
        }
        if let Some(v) = synced.get(KEY_IDLE).and_then(Value::as_u64) {
            settings.idle_minutes = v as u32;
        }
        if let Some(v) = synced.get(KEY_BLACK).and_then(Value::as_u64) {
            settings.switch_to_black_minutes = v as u32;
        }
        if let Some(v) = synced.get(KEY_DIM).and_then(Value::as_u64) {
            settings.dim_level = v.min(100) as u8;
        }
        if let Some(v) = synced.get(KEY_FRAMERATE).and_then(Value::as_u64) {
            settings.max_framerate = v as u32;
        }
        if let Some(v) = synced.get(KEY_CYCLE).and_then(Value::as_u64) {
            settings.random_cycle_minutes = v as u32;
        }
        if let Some(v) = synced.get(KEY_RANDOM_POOL) {
            settings.enabled_for_random = match v {
                Value::Array(ids) => Some(
                    ids.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                ),
                _ => None,
            };
        }

        // Per-scene overlays: stored keys override schema defaults, and
        // keys added since the settings were written keep their defaults.
        for id in registry.list() {
            let Some(Value::Object(stored)) = synced.get(id.as_str()) else {
                continue;
            };
            let overlay = settings
                .scene_options
                .entry(id.clone())
                .or_insert_with(OptionMap::new);
            for (key, value) in stored {
                if let Ok(value) = serde_json::from_value::<OptionValue>(value.clone()) {
                    overlay.insert(key.clone(), value);
                }
            }
        }

        // Keep whatever we do not understand, verbatim.
        for (key, value) in &synced {
            let known = GLOBAL_KEYS.contains(&key.as_str())
                || registry.list().iter().any(|id| id == key);
            if !known {
                settings.extra.insert(key.clone(), value.clone());
            }
        }

        Ok(settings)
    }

    /// Like [`Settings::load`], but degrades to defaults on store errors
    /// instead of propagating them. The host favors a blank-but-working
    /// surface over failing to start.
    pub fn load_or_defaults(store: &dyn SettingsStore, registry: &Registry) -> Self {
        match Self::load(store, registry) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(target: "settings", "Falling back to defaults: {}", e);
                Self::defaults(registry)
            }
        }
    }

    //--- Save -------------------------------------------------------------

    /// Writes the synced and local partitions.
    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<(), StoreError> {
        let mut synced = Map::new();
        synced.insert(KEY_TYPE.into(), Value::String(self.scene_type.clone()));
        synced.insert(KEY_POWER.into(), serde_json::to_value(self.power_mode)?);
        synced.insert(KEY_IDLE.into(), json!(self.idle_minutes));
        synced.insert(KEY_BLACK.into(), json!(self.switch_to_black_minutes));
        synced.insert(KEY_DIM.into(), json!(self.dim_level));
        synced.insert(KEY_FRAMERATE.into(), json!(self.max_framerate));
        synced.insert(KEY_CYCLE.into(), json!(self.random_cycle_minutes));
        synced.insert(
            KEY_RANDOM_POOL.into(),
            match &self.enabled_for_random {
                Some(ids) => json!(ids),
                None => Value::Null,
            },
        );

        for (id, options) in &self.scene_options {
            synced.insert(id.clone(), serde_json::to_value(options)?);
        }
        for (key, value) in &self.extra {
            synced.entry(key.clone()).or_insert_with(|| value.clone());
        }

        store.save_synced(Value::Object(synced))?;
        store.save_local(json!({ "enabled": self.enabled }))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
