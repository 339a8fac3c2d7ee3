use std::path::Path;

use crate::config::schema::Settings;
use crate::error::ConfigError;

/// Loads settings from a YAML file, or returns the defaults when `path` is `None`.
pub fn load_settings<P: AsRef<Path>>(path: Option<P>) -> Result<Settings, ConfigError> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_settings_from_str(&content)
}

pub fn load_settings_from_str(content: &str) -> Result<Settings, ConfigError> {
    // An empty document deserializes to unit, not to a map
    let settings: Settings = if content.trim().is_empty() {
        Settings::default()
    } else {
        serde_yaml::from_str(content)?
    };

    validate_settings(&settings)?;

    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "host must not be empty".to_string(),
        });
    }

    if settings.port == 0 {
        return Err(ConfigError::Validation {
            message: "port must be greater than 0".to_string(),
        });
    }

    if settings.folder.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "folder must not be empty".to_string(),
        });
    }

    if settings.max_pages == 0 {
        return Err(ConfigError::Validation {
            message: "maxPages must be at least 1".to_string(),
        });
    }

    for (field, name) in [
        ("workDirName", &settings.work_dir_name),
        ("archiveName", &settings.archive_name),
    ] {
        if !is_plain_file_name(name) {
            return Err(ConfigError::Validation {
                message: format!("{} must be a plain file name, got '{}'", field, name),
            });
        }
    }

    Ok(())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}
