//! On-disk engine configuration. Every field has a serde default so a
//! partial (or absent) file yields a working setup.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cadence::TrackingProfile;
use crate::classify::ClassifierConfig;
use crate::error::EngineError;
use crate::surface::FillStyle;

fn def_profile() -> String {
    "standard".into()
}

fn def_profiles() -> Vec<ProfileConfig> {
    vec![
        ProfileConfig {
            name: "standard".into(),
            idle_ms: 400,
            interaction_ms: 80,
        },
        ProfileConfig {
            name: "high-performance".into(),
            idle_ms: 200,
            interaction_ms: 33,
        },
    ]
}

fn def_fill_opacity() -> f64 {
    0.55
}

fn def_fill_tint() -> [u8; 3] {
    [16, 16, 20]
}

fn def_true() -> bool {
    true
}

fn def_drag_boost_ms() -> u64 {
    1500
}

fn def_release_boost_ms() -> u64 {
    600
}

/// One named polling tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub name: String,
    pub idle_ms: u64,
    pub interaction_ms: u64,
}

impl ProfileConfig {
    pub fn to_profile(&self) -> TrackingProfile {
        TrackingProfile::new(
            self.name.clone(),
            Duration::from_millis(self.idle_ms),
            Duration::from_millis(self.interaction_ms),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Which tier from `profiles` is active.
    #[serde(default = "def_profile")]
    pub profile: String,

    #[serde(default = "def_profiles")]
    pub profiles: Vec<ProfileConfig>,

    /// Opacity of the dimming fill, 0 (invisible) to 1 (opaque).
    #[serde(default = "def_fill_opacity")]
    pub fill_opacity: f64,

    /// RGB tint of the dimming fill.
    #[serde(default = "def_fill_tint")]
    pub fill_tint: [u8; 3],

    /// Whether the blur filter backs the fill; tint-only when off.
    #[serde(default = "def_true")]
    pub blur_enabled: bool,

    /// Whether the overlay windows pass clicks through to what is under
    /// them. Almost always what you want.
    #[serde(default = "def_true")]
    pub click_through: bool,

    #[serde(default = "def_drag_boost_ms")]
    pub drag_boost_ms: u64,

    #[serde(default = "def_release_boost_ms")]
    pub release_boost_ms: u64,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        // Deserializing an empty mapping applies every field default.
        serde_yaml::from_str("{}").expect("default config must deserialize")
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| EngineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The selected tracking profile tier.
    pub fn selected_profile(&self) -> Result<TrackingProfile, EngineError> {
        self.profiles
            .iter()
            .find(|profile| profile.name == self.profile)
            .map(ProfileConfig::to_profile)
            .ok_or_else(|| EngineError::UnknownProfile(self.profile.clone()))
    }

    pub fn fill_style(&self) -> FillStyle {
        FillStyle {
            opacity: self.fill_opacity,
            tint: self.fill_tint,
        }
    }

    pub fn drag_boost(&self) -> Duration {
        Duration::from_millis(self.drag_boost_ms)
    }

    pub fn release_boost(&self) -> Duration {
        Duration::from_millis(self.release_boost_ms)
    }
}
