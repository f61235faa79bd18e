//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory, or `--config FILE`
//! 3. `ZIPSWEEP_*` environment variables (`ZIPSWEEP_PARANOID=true`)
//! 4. Command-line flags
//!
//! ```toml
//! chunk_size = 131072
//! compression = "stored"
//! paranoid = false
//! use_trash = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::archive::Compression;
use crate::cli::Cli;
use crate::scanner::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "ZIPSWEEP_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Read buffer size for checksums, in bytes.
    pub chunk_size: usize,
    /// Compression method for new archives.
    pub compression: Compression,
    /// Decompress members and compare content checksums.
    pub paranoid: bool,
    /// Move deleted files to the system trash.
    pub use_trash: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            compression: Compression::default(),
            paranoid: false,
            use_trash: false,
        }
    }
}

/// Errors from loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A layer could not be parsed or had the wrong types
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// A value parsed but is out of range
    #[error("invalid configuration: chunk_size must be greater than zero")]
    ZeroChunkSize,

    /// Chunk size above [`MAX_CHUNK_SIZE`]
    #[error("invalid configuration: chunk_size {0} exceeds the 64 MiB limit")]
    ChunkSizeTooLarge(usize),
}

impl Config {
    /// Load configuration, falling back to defaults on any error.
    ///
    /// `path` overrides the platform config file location.
    pub fn load(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            if !path.exists() {
                log::warn!("Config file {} not found, ignoring", path.display());
            }
        }
        let path = path.map(Path::to_path_buf).or_else(Self::config_path);
        match Self::load_from(path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load configuration from an optional TOML file plus the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer is malformed or a value is invalid.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract().map_err(Box::new)?;
        config.validate()
    }

    /// The layered figment: defaults, then file, then environment.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            log::debug!("Reading config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::ChunkSizeTooLarge(self.chunk_size));
        }
        Ok(self)
    }

    /// Apply command-line overrides.
    ///
    /// Flags can only switch features on; an absent flag keeps the
    /// configured value.
    #[must_use]
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = usize::try_from(chunk_size)
                .unwrap_or(MAX_CHUNK_SIZE)
                .min(MAX_CHUNK_SIZE);
        }
        if let Some(compression) = cli.compression {
            self.compression = compression;
        }
        self.paranoid |= cli.paranoid;
        self.use_trash |= cli.trash;
        self
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "zipsweep", "zipsweep")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
