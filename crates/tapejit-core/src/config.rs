//! Runtime configuration (`tapejit.toml`)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default tape length in bytes
pub const DEFAULT_TAPE_SIZE: usize = 30_000;

/// Default byte stored by `,` once input is exhausted (C `EOF` truncated to 8 bits)
pub const DEFAULT_EOF_BYTE: u8 = 0xFF;

/// Name of the configuration file looked up by the CLI
pub const CONFIG_FILE_NAME: &str = "tapejit.toml";

/// Errors that can occur when loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for '{0}': {1}")]
    Invalid(&'static str, String),
}

/// Which engine runs the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Translate to native code and execute it in-process
    #[default]
    Jit,
    /// Run the reference interpreter
    Interpreter,
}

/// Settings for one translate-and-execute invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Total addressable tape length in bytes.
    ///
    /// Compiled code never checks the cursor against this.
    pub tape_size: usize,

    /// Byte stored by `,` when the input primitive reports end of input.
    pub eof_byte: u8,

    /// Execution engine.
    pub backend: Backend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tape_size: DEFAULT_TAPE_SIZE,
            eof_byte: DEFAULT_EOF_BYTE,
            backend: Backend::Jit,
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load `path` if it exists, otherwise return the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Set the tape size
    #[must_use]
    pub fn with_tape_size(mut self, tape_size: usize) -> Self {
        self.tape_size = tape_size;
        self
    }

    /// Set the end-of-input byte
    #[must_use]
    pub fn with_eof_byte(mut self, eof_byte: u8) -> Self {
        self.eof_byte = eof_byte;
        self
    }

    /// Set the backend
    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tape_size == 0 {
            return Err(ConfigError::Invalid(
                "tape_size",
                "tape must hold at least one cell".to_string(),
            ));
        }
        if isize::try_from(self.tape_size).is_err() {
            return Err(ConfigError::Invalid(
                "tape_size",
                format!("{} exceeds the addressable range", self.tape_size),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.tape_size, 30_000);
        assert_eq!(config.eof_byte, 0xFF);
        assert_eq!(config.backend, Backend::Jit);
    }

    #[test]
    fn parse_full_config() {
        let config = Config::from_toml(
            r#"
tape_size = 65536
eof_byte = 0
backend = "interpreter"
"#,
        )
        .unwrap();
        assert_eq!(config.tape_size, 65536);
        assert_eq!(config.eof_byte, 0);
        assert_eq!(config.backend, Backend::Interpreter);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = Config::from_toml("tape_size = 100").unwrap();
        assert_eq!(config.tape_size, 100);
        assert_eq!(config.eof_byte, DEFAULT_EOF_BYTE);
        assert_eq!(config.backend, Backend::Jit);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Config::from_toml("tape_size = 10\nbounds_check = true");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn zero_tape_is_rejected() {
        let result = Config::from_toml("tape_size = 0");
        assert!(matches!(result, Err(ConfigError::Invalid("tape_size", _))));
    }

    #[test]
    fn eof_byte_out_of_range_is_rejected() {
        assert!(Config::from_toml("eof_byte = 256").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "tape_size = 512\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.tape_size, 512);
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn builder_methods() {
        let config = Config::default()
            .with_tape_size(8)
            .with_eof_byte(0)
            .with_backend(Backend::Interpreter);
        assert_eq!(config.tape_size, 8);
        assert_eq!(config.eof_byte, 0);
        assert_eq!(config.backend, Backend::Interpreter);
    }
}
