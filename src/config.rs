//! Settings file loading

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use healthctl_types::Settings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// `<config dir>/healthctl/config.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("healthctl").join("config.toml"))
}

/// Load settings from `path` when given, else from the default location.
///
/// An explicit path must exist; a missing default file means built-in
/// defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_settings_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No settings file, using defaults");
                return Ok(Settings::default());
            }
        },
    };

    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let settings = parse_settings(&text, &path)?;
    info!(path = %path.display(), "loaded settings");
    Ok(settings)
}

fn parse_settings(text: &str, path: &Path) -> Result<Settings, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides_sections() {
        let settings = parse_settings(
            r#"
            [smf]
            namespace = "smf"

            [kargo]
            service = "kargo-lb"
            "#,
            Path::new("config.toml"),
        )
        .unwrap();

        assert_eq!(settings.smf.namespace, "smf");
        assert_eq!(settings.kargo.service, "kargo-lb");
        assert_eq!(settings.kargo.namespace, "fed-paas-helpers");
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse_settings("[redis\nport = 1", Path::new("/etc/healthctl.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("/etc/healthctl.toml"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("healthctl-test-missing-settings.toml");
        let err = load_settings(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_explicit_file() {
        let path = std::env::temp_dir().join(format!(
            "healthctl-test-settings-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "[upf]\nnamespace = \"upf\"\n").unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(settings.upf.namespace, "upf");
        assert_eq!(settings.redis.port, 6379);
    }
}
