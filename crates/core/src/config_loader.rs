use crate::config::AnalysisSettings;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use std::path::{Path, PathBuf};

/// Default location of the persisted settings document.
pub const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// Environment variable prefix for settings overrides (e.g. `N1_MIN_DATA_POINTS`).
pub const ENV_PREFIX: &str = "N1_";

/// Loads and saves [`AnalysisSettings`] as a flat JSON document.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_PATH)
    }
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn figment(&self) -> Figment {
        Figment::from(Serialized::defaults(AnalysisSettings::default()))
            .merge(Json::file(&self.path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads settings by merging defaults, the JSON document and `N1_*`
    /// environment variables. Keys that are not settings are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or a value is out of range.
    pub fn load_strict(&self) -> Result<AnalysisSettings> {
        let settings: AnalysisSettings = self
            .figment()
            .extract()
            .with_context(|| format!("Could not load settings file '{}'", self.path.display()))?;
        settings.validate()?;

        Ok(settings)
    }

    /// Loads settings, falling back to the defaults when the document is
    /// unreadable or invalid.
    #[must_use]
    pub fn load(&self) -> AnalysisSettings {
        match self.load_strict() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("{:#}. Using defaults.", e);
                AnalysisSettings::default()
            }
        }
    }

    /// Writes the settings document as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the file cannot be written.
    pub fn save(&self, settings: &AnalysisSettings) -> Result<()> {
        settings.validate()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json).with_context(|| {
            format!("Could not save settings to '{}'", self.path.display())
        })?;

        tracing::info!("Settings saved to '{}'.", self.path.display());
        Ok(())
    }
}
