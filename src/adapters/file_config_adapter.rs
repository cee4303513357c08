//! INI configuration for the scanner.
//!
//! Section and key names are matched case-insensitively. Values are kept
//! verbatim, so pool display names survive with their spacing and case.

use crate::domain::error::SignalError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::fs;
use std::path::Path;

/// Origin reported in parse errors for configs built from a string.
const INLINE_ORIGIN: &str = "<inline>";

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    /// Reads and parses `path`. An unreadable file is a config error, not an
    /// io error, so the CLI exits with the config status.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SignalError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| SignalError::ConfigParse {
            file: origin.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&origin, content)
    }

    pub fn from_string(content: &str) -> Result<Self, SignalError> {
        Self::parse(INLINE_ORIGIN, content.to_string())
    }

    fn parse(origin: &str, content: String) -> Result<Self, SignalError> {
        let mut config = Ini::new();
        config.read(content).map_err(|reason| SignalError::ConfigParse {
            file: origin.to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    fn parse_flag(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_flag)
            .unwrap_or(default)
    }
}
