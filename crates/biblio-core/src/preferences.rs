//! Display preferences
//!
//! Two user-facing settings (colour theme and font scale) persisted to a
//! JSON file under the data directory. The local file is authoritative at
//! startup; the server copy overwrites it only after a successful
//! post-login fetch. Reads never fail: an absent or malformed file yields
//! the defaults. Write failures are logged and swallowed.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;

/// Colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Sepia,
    Ardoise,
    Foret,
}

impl Theme {
    /// All themes, in cycle order
    pub const ALL: [Theme; 4] = [Theme::Dark, Theme::Sepia, Theme::Ardoise, Theme::Foret];

    /// The next theme in cycle order (wrapping)
    pub fn next(self) -> Self {
        match self {
            Theme::Dark => Theme::Sepia,
            Theme::Sepia => Theme::Ardoise,
            Theme::Ardoise => Theme::Foret,
            Theme::Foret => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Sepia => "sepia",
            Theme::Ardoise => "ardoise",
            Theme::Foret => "foret",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "sepia" => Ok(Theme::Sepia),
            "ardoise" => Ok(Theme::Ardoise),
            "foret" => Ok(Theme::Foret),
            other => Err(format!(
                "unknown theme '{}' (expected dark, sepia, ardoise, or foret)",
                other
            )),
        }
    }
}

/// Font scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontScale {
    #[default]
    Normal,
    Large,
    Xlarge,
}

impl FontScale {
    /// The next scale in cycle order (wrapping)
    pub fn next(self) -> Self {
        match self {
            FontScale::Normal => FontScale::Large,
            FontScale::Large => FontScale::Xlarge,
            FontScale::Xlarge => FontScale::Normal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontScale::Normal => "normal",
            FontScale::Large => "large",
            FontScale::Xlarge => "xlarge",
        }
    }
}

impl fmt::Display for FontScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(FontScale::Normal),
            "large" => Ok(FontScale::Large),
            "xlarge" => Ok(FontScale::Xlarge),
            other => Err(format!(
                "unknown font scale '{}' (expected normal, large, or xlarge)",
                other
            )),
        }
    }
}

/// The persisted preference pair
///
/// On disk this is JSON with `theme` and `fontScale` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default, rename = "fontScale")]
    pub font_scale: FontScale,
}

/// Partial preference change
///
/// Serializes to the server's upsert body (snake_case `font_scale`).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PreferencesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_scale: Option<FontScale>,
}

impl PreferencesPatch {
    pub fn theme(theme: Theme) -> Self {
        Self {
            theme: Some(theme),
            font_scale: None,
        }
    }

    pub fn font_scale(font_scale: FontScale) -> Self {
        Self {
            theme: None,
            font_scale: Some(font_scale),
        }
    }
}

/// The server's copy of the preferences
///
/// Extra fields on the server object (id, user id, timestamps) are ignored.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ServerPreferences {
    pub theme: Theme,
    pub font_scale: FontScale,
}

impl From<ServerPreferences> for Preferences {
    fn from(remote: ServerPreferences) -> Self {
        Self {
            theme: remote.theme,
            font_scale: remote.font_scale,
        }
    }
}

/// Durable store for display preferences
pub struct PreferenceStore {
    /// Where the preferences are persisted
    path: PathBuf,
    /// Current values
    current: Preferences,
}

impl PreferenceStore {
    /// Open the store at the configured location
    pub fn open(config: &Config) -> Self {
        Self::with_path(config.preferences_path())
    }

    /// Open the store at a specific path
    ///
    /// Missing or malformed files yield the defaults; fields absent from
    /// the file keep their default values.
    pub fn with_path(path: PathBuf) -> Self {
        let current = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, current }
    }

    /// Current preferences
    pub fn get(&self) -> Preferences {
        self.current
    }

    /// Merge a partial change into the current values and persist
    pub fn update(&mut self, patch: PreferencesPatch) {
        if let Some(theme) = patch.theme {
            self.current.theme = theme;
        }
        if let Some(font_scale) = patch.font_scale {
            self.current.font_scale = font_scale;
        }
        self.persist();
    }

    /// Replace the whole preference pair and persist
    pub fn replace(&mut self, prefs: Preferences) {
        self.current = prefs;
        self.persist();
    }

    /// The active theme marker
    pub fn theme_marker(&self) -> Theme {
        self.current.theme
    }

    /// The active font-scale marker, cleared when the scale is normal
    pub fn font_marker(&self) -> Option<FontScale> {
        match self.current.font_scale {
            FontScale::Normal => None,
            scale => Some(scale),
        }
    }

    /// Persist the full object; failures are logged, never surfaced
    fn persist(&self) {
        let content = match serde_json::to_string(&self.current) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to serialize preferences: {}", e);
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create preferences directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(&self.path, content) {
            warn!("Failed to write preferences to {:?}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = PreferenceStore::with_path(temp_dir.path().join("preferences.json"));

        assert_eq!(store.get().theme, Theme::Dark);
        assert_eq!(store.get().font_scale, FontScale::Normal);
    }

    #[test]
    fn test_defaults_when_file_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("preferences.json");
        fs::write(&path, "not json {{").unwrap();

        let store = PreferenceStore::with_path(path);
        assert_eq!(store.get(), Preferences::default());
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("preferences.json");
        fs::write(&path, r#"{"theme":"sepia"}"#).unwrap();

        let store = PreferenceStore::with_path(path);
        assert_eq!(store.get().theme, Theme::Sepia);
        assert_eq!(store.get().font_scale, FontScale::Normal);
    }

    #[test]
    fn test_update_merges_field_by_field() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("preferences.json");

        let mut store = PreferenceStore::with_path(path.clone());
        store.update(PreferencesPatch::theme(Theme::Foret));
        store.update(PreferencesPatch::font_scale(FontScale::Large));

        assert_eq!(store.get().theme, Theme::Foret);
        assert_eq!(store.get().font_scale, FontScale::Large);

        // Persisted value equals the merged result
        let reopened = PreferenceStore::with_path(path);
        assert_eq!(reopened.get().theme, Theme::Foret);
        assert_eq!(reopened.get().font_scale, FontScale::Large);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("preferences.json");

        let mut store = PreferenceStore::with_path(path.clone());
        store.update(PreferencesPatch::font_scale(FontScale::Xlarge));
        store.replace(Preferences {
            theme: Theme::Ardoise,
            font_scale: FontScale::Normal,
        });

        assert_eq!(store.get().theme, Theme::Ardoise);
        assert_eq!(store.get().font_scale, FontScale::Normal);

        let reopened = PreferenceStore::with_path(path);
        assert_eq!(reopened.get().font_scale, FontScale::Normal);
    }

    #[test]
    fn test_font_marker_cleared_on_normal() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = PreferenceStore::with_path(temp_dir.path().join("preferences.json"));

        assert_eq!(store.font_marker(), None);

        store.update(PreferencesPatch::font_scale(FontScale::Large));
        assert_eq!(store.font_marker(), Some(FontScale::Large));

        store.update(PreferencesPatch::font_scale(FontScale::Normal));
        assert_eq!(store.font_marker(), None);
        assert_eq!(store.theme_marker(), Theme::Dark);
    }

    #[test]
    fn test_persisted_field_names() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("preferences.json");

        let mut store = PreferenceStore::with_path(path.clone());
        store.update(PreferencesPatch::theme(Theme::Sepia));

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, r#"{"theme":"sepia","fontScale":"normal"}"#);
    }

    #[test]
    fn test_server_preferences_ignore_extra_fields() {
        let json = r#"{
            "id": 3,
            "user_id": 1,
            "theme": "foret",
            "font_scale": "xlarge",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;

        let remote: ServerPreferences = serde_json::from_str(json).unwrap();
        let prefs: Preferences = remote.into();
        assert_eq!(prefs.theme, Theme::Foret);
        assert_eq!(prefs.font_scale, FontScale::Xlarge);
    }

    #[test]
    fn test_patch_serializes_snake_case() {
        let patch = PreferencesPatch::font_scale(FontScale::Xlarge);
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"font_scale":"xlarge"}"#);

        let patch = PreferencesPatch::theme(Theme::Dark);
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"theme":"dark"}"#);
    }

    #[test]
    fn test_theme_cycle_covers_all() {
        let mut theme = Theme::Dark;
        for expected in [Theme::Sepia, Theme::Ardoise, Theme::Foret, Theme::Dark] {
            theme = theme.next();
            assert_eq!(theme, expected);
        }
    }

    #[test]
    fn test_parse_from_str() {
        assert_eq!("sepia".parse::<Theme>().unwrap(), Theme::Sepia);
        assert_eq!(" FORET ".parse::<Theme>().unwrap(), Theme::Foret);
        assert!("neon".parse::<Theme>().is_err());

        assert_eq!("xlarge".parse::<FontScale>().unwrap(), FontScale::Xlarge);
        assert!("tiny".parse::<FontScale>().is_err());
    }
}
