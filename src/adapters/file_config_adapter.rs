//! INI file configuration adapter.
//!
//! Parse failures surface as [`ChartistError::ConfigParse`] carrying the
//! offending path, so the CLI can map them straight to an exit code.

use crate::domain::error::ChartistError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ChartistError> {
        let mut config = Ini::new();
        config
            .load(&path)
            .map_err(|reason| ChartistError::ConfigParse {
                file: path.as_ref().display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, ChartistError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| ChartistError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        match self.config.getint(section, key) {
            Ok(Some(value)) => value,
            _ => default,
        }
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        match self.config.getfloat(section, key) {
            Ok(Some(value)) => value,
            _ => default,
        }
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        let Some(raw) = self.config.get(section, key) else {
            return default;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => true,
            "false" | "no" | "0" | "off" => false,
            _ => default,
        }
    }
}
