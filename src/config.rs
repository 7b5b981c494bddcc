use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::format::Precision;
use crate::scramble::Event;
use crate::session::{GraphConfig, Session};
use crate::stats::StatKey;
use crate::timer::TimerConfig;

/// Which statistics the panel shows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DataShown {
    pub mo3: bool,
    pub ao5: bool,
    pub ao12: bool,
    pub ao25: bool,
    pub ao50: bool,
    pub ao100: bool,
    pub predict: bool,
}

impl Default for DataShown {
    fn default() -> Self {
        Self {
            mo3: true,
            ao5: true,
            ao12: true,
            ao25: false,
            ao50: false,
            ao100: false,
            predict: false,
        }
    }
}

impl DataShown {
    /// Toggle names in settings order
    pub const FIELDS: [&'static str; 7] = ["mo3", "ao5", "ao12", "ao25", "ao50", "ao100", "predict"];

    /// Whether a stats panel key is switched on. `BEST` is always shown.
    pub fn shows(&self, key: &StatKey) -> bool {
        match key {
            StatKey::Best => true,
            StatKey::Average(spec) => match spec.label().as_str() {
                "MO3" => self.mo3,
                "AO5" => self.ao5,
                "AO12" => self.ao12,
                "AO25" => self.ao25,
                "AO50" => self.ao50,
                "AO100" => self.ao100,
                _ => false,
            },
        }
    }

    pub fn get(&self, field: &str) -> bool {
        match field {
            "mo3" => self.mo3,
            "ao5" => self.ao5,
            "ao12" => self.ao12,
            "ao25" => self.ao25,
            "ao50" => self.ao50,
            "ao100" => self.ao100,
            "predict" => self.predict,
            _ => false,
        }
    }

    pub fn toggle(&mut self, field: &str) {
        let slot = match field {
            "mo3" => &mut self.mo3,
            "ao5" => &mut self.ao5,
            "ao12" => &mut self.ao12,
            "ao25" => &mut self.ao25,
            "ao50" => &mut self.ao50,
            "ao100" => &mut self.ao100,
            "predict" => &mut self.predict,
            _ => return,
        };
        *slot = !*slot;
    }
}

pub fn default_data_order() -> Vec<String> {
    ["BEST", "MO3", "AO5", "AO12", "AO25", "AO50", "AO100"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Global settings. Unknown or missing fields fall back to defaults so
/// older config files keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub precision: Precision,
    /// Signed so hand-edited negative values survive loading; clamped when
    /// the timer is configured.
    pub hold_to_start_ms: i64,
    pub phases: i64,
    pub event: Event,
    pub data_shown: DataShown,
    pub data_order: Vec<String>,
    /// Graphs given to newly created sessions
    pub default_graphs: Vec<GraphConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            precision: Precision::TwoDp,
            hold_to_start_ms: 500,
            phases: 1,
            event: Event::Cube333,
            data_shown: DataShown::default(),
            data_order: default_data_order(),
            default_graphs: GraphConfig::defaults(),
        }
    }
}

/// Settings after applying the active session's overrides
#[derive(Debug, Clone, PartialEq)]
pub struct Effective {
    pub precision: Precision,
    pub timer: TimerConfig,
    pub data_shown: DataShown,
    pub stat_keys: Vec<StatKey>,
}

impl Settings {
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig::sanitized(self.hold_to_start_ms, self.phases)
    }

    pub fn effective(&self, session: &Session) -> Effective {
        let overrides = &session.overrides;

        let (precision, timer) = match overrides.session_timer.as_ref() {
            Some(t) if overrides.use_session_timer => (
                t.precision,
                TimerConfig::sanitized(t.hold_to_start_ms, t.phases),
            ),
            _ => (self.precision, self.timer_config()),
        };

        let (data_shown, order) = if overrides.use_session_data {
            (
                overrides.data_shown.unwrap_or_default(),
                overrides
                    .data_order
                    .clone()
                    .unwrap_or_else(default_data_order),
            )
        } else {
            (self.data_shown, self.data_order.clone())
        };

        // unknown labels in hand-edited files are skipped
        let stat_keys = order
            .iter()
            .filter_map(|label| label.parse::<StatKey>().ok())
            .filter(|key| data_shown.shows(key))
            .collect();

        Effective {
            precision,
            timer,
            data_shown,
            stat_keys,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> crate::error::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "cubik") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("cubik_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(path = %self.path.display(), %err, "no settings file, using defaults");
                return Settings::default();
            }
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "unreadable settings file, using defaults");
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> crate::error::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
