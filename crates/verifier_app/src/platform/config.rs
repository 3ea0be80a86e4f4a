use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use verifier_core::FieldId;
use verifier_engine::ClientSettings;
use verifier_logging::verifier_warn;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG: &str = "verifier.ron";

/// Host settings read from a RON file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub storage_dir: PathBuf,
    pub log_destination: LogDestination,
    pub request_timeout_secs: Option<u64>,
    /// Values present when the form opens, keyed by field name.
    pub form: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: ClientSettings::default().base_url,
            storage_dir: PathBuf::from("."),
            log_destination: LogDestination::default(),
            request_timeout_secs: None,
            form: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            ..ClientSettings::default()
        }
    }

    /// Initial form values. Unknown field names are skipped with a warning.
    pub fn initial_values(&self) -> Vec<(FieldId, String)> {
        self.form
            .iter()
            .filter_map(|(name, value)| match FieldId::from_name(name) {
                Some(id) => Some((id, value.clone())),
                None => {
                    verifier_warn!("config names unknown form field {name:?}; ignored");
                    None
                }
            })
            .collect()
    }
}

/// Reads the config file. `Ok(None)` means there is no file and defaults apply.
pub fn load(path: &Path) -> anyhow::Result<Option<AppConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {}", path.display()))
        }
    };
    let config = ron::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_means_defaults() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load(&temp.path().join("verifier.ron")).unwrap(), None);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("verifier.ron");
        fs::write(
            &path,
            r#"(
                base_url: "https://verifier.example",
                request_timeout_secs: Some(45),
                form: {"company_name": "Muster AG", "favourite_color": "blau"},
            )"#,
        )
        .unwrap();

        let config = load(&path).unwrap().unwrap();
        assert_eq!(config.base_url, "https://verifier.example");
        assert_eq!(config.log_destination, LogDestination::File);
        assert_eq!(
            config.client_settings().request_timeout,
            Some(Duration::from_secs(45))
        );
        assert_eq!(
            config.initial_values(),
            vec![(FieldId::CompanyName, "Muster AG".to_string())]
        );
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("verifier.ron");
        fs::write(&path, "(base_url: ").unwrap();
        assert!(load(&path).is_err());
    }
}
