use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const APP_FOLDER_NAME: &str = "schoolhub";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UiSettings {
    pub theme: String,
    pub window_size: (f32, f32),
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: "classic_light".to_string(),
            window_size: (480.0, 860.0),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub ai: AiConfig,
    pub ui: UiSettings,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_FOLDER_NAME)
        .join("settings.json")
}

/// Reads settings from `path`, falling back to defaults when the file does not exist.
/// Nothing is written here; the app never persists state on its own.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let mut settings = if path.exists() {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        Settings::default()
    };
    apply_env_overrides(&mut settings, |k| std::env::var(k).ok());
    Ok(settings)
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(model) = var("SCHOOLHUB_AI_MODEL").filter(|v| !v.trim().is_empty()) {
        settings.ai.model = model.trim().to_string();
    }
    if let Some(endpoint) = var("SCHOOLHUB_AI_ENDPOINT").filter(|v| !v.trim().is_empty()) {
        settings.ai.endpoint = endpoint.trim().to_string();
    }
}

/// Writes a settings file. Only used by `--write-default-config`.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<(), SettingsError> {
    let write_err = |source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(write_err)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| write_err(io::Error::new(io::ErrorKind::Other, e)))?;
    fs::write(path, json).map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("schoolhub-test-{}-{name}", std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings(&temp_path("missing")).expect("defaults");
        assert_eq!(settings.ui.theme, "classic_light");
        assert!(settings.ai.endpoint.starts_with("https://"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_path("partial");
        fs::create_dir_all(path.parent().expect("parent")).expect("dir");
        fs::write(&path, r#"{"ui": {"theme": "chalkboard_dark"}}"#).expect("write");

        let settings = load_settings(&path).expect("load");
        assert_eq!(settings.ui.theme, "chalkboard_dark");
        assert_eq!(settings.ui.window_size, UiSettings::default().window_size);
        assert_eq!(settings.ai.timeout_secs, 30);
        let _ = fs::remove_dir_all(path.parent().expect("parent"));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = temp_path("broken");
        fs::create_dir_all(path.parent().expect("parent")).expect("dir");
        fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            load_settings(&path),
            Err(SettingsError::Parse { .. })
        ));
        let _ = fs::remove_dir_all(path.parent().expect("parent"));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = temp_path("saved");
        let mut settings = Settings::default();
        settings.ai.model = "custom-model".to_string();
        save_settings(&settings, &path).expect("save");
        let loaded = load_settings(&path).expect("load");
        // Env overrides may change the model on a developer machine.
        if std::env::var("SCHOOLHUB_AI_MODEL").is_err() {
            assert_eq!(loaded.ai.model, "custom-model");
        }
        let _ = fs::remove_dir_all(path.parent().expect("parent"));
    }

    #[test]
    fn env_overrides_ignore_blank_values() {
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, |k| match k {
            "SCHOOLHUB_AI_MODEL" => Some("  gemini-test ".to_string()),
            "SCHOOLHUB_AI_ENDPOINT" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(settings.ai.model, "gemini-test");
        assert_eq!(settings.ai.endpoint, AiConfig::default().endpoint);
    }
}
