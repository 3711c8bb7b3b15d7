//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use petri_layout::{PetriLayoutError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for PetriLayoutError {
    fn from(err: ConfigError) -> Self {
        PetriLayoutError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (petri-layout/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(
    explicit_path: Option<impl AsRef<Path>>,
) -> Result<AppConfig, PetriLayoutError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("petri-layout/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("org", "petri-layout", "petri-layout") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(
                path = system_config.display().to_string();
                "Loading configuration from system path"
            );
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if the file is missing, unreadable or not valid TOML.
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, PetriLayoutError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use petri_layout::LayoutDirection;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_explicit_config() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
[layout]
direction = "vertical"
rank_separation = 200.0

[style]
edge_color = "#1f77b4"
"##,
        )
        .expect("Failed to write config");

        let config = load_config(Some(&path)).expect("Config should load");

        assert_eq!(config.layout().direction(), LayoutDirection::Vertical);
        let spacing = config.layout().spacing(LayoutDirection::Vertical);
        assert_eq!(spacing.rank_separation(), 200.0);
        assert_eq!(spacing.node_separation(), 60.0);
        assert_eq!(
            config.style().edge_color().map(|c| c.to_hex_string()),
            Ok("#1f77b4".to_string())
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("config.toml");
        fs::write(&path, "").expect("Failed to write config");

        let config = load_config(Some(&path)).expect("Config should load");

        assert_eq!(config.layout().direction(), LayoutDirection::Horizontal);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("absent.toml");

        let result = load_config(Some(&path));

        assert!(matches!(result, Err(PetriLayoutError::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout\ndirection = ").expect("Failed to write config");

        let result = load_config(Some(&path));

        assert!(matches!(result, Err(PetriLayoutError::Config(_))));
    }
}
