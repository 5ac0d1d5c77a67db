//! Configuration system for the portal.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/portal/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use portal_proto::message::Sender;

use crate::attachment::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_WIDTH, DownscaleOptions};
use crate::session::SessionConfig;
use crate::storage::DEFAULT_QUOTA_BYTES;
use crate::storage::debounce::DEFAULT_DELAY;
use crate::tasks::list::DEFAULT_DATE_FORMAT;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    image: ImageFileConfig,
    ui: UiFileConfig,
    contact: ContactFileConfig,
}

/// `[storage]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    data_dir: Option<PathBuf>,
    quota_bytes: Option<usize>,
    debounce_ms: Option<u64>,
}

/// `[image]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ImageFileConfig {
    max_width: Option<u32>,
    jpeg_quality: Option<u8>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    date_format: Option<String>,
    role: Option<String>,
}

/// `[contact]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ContactFileConfig {
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    hours: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Static contact card shown beside the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    /// Company or team name.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Email address.
    pub email: String,
    /// Opening hours.
    pub hours: String,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            name: "Customer Support".to_string(),
            phone: "(555) 010-0100".to_string(),
            email: "support@example.com".to_string(),
            hours: "Mon-Fri 8:00-17:00".to_string(),
        }
    }
}

/// Fully resolved portal configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    // -- Storage --
    /// Directory for persisted collections. `None` means in-memory only.
    pub data_dir: Option<PathBuf>,
    /// Storage capacity in bytes.
    pub quota_bytes: usize,
    /// Quiet period before a change is written.
    pub debounce: Duration,

    // -- Image --
    /// Attachments wider than this are shrunk.
    pub max_image_width: u32,
    /// JPEG quality for attachments.
    pub jpeg_quality: u8,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// chrono format for task dates.
    pub date_format: String,
    /// Who messages typed in this session are attributed to.
    pub role: Sender,
    /// Contact card contents.
    pub contact: ContactInfo,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            debounce: DEFAULT_DELAY,
            max_image_width: DEFAULT_MAX_WIDTH,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            poll_timeout: Duration::from_millis(50),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            role: Sender::Customer,
            contact: ContactInfo::default(),
        }
    }
}

impl PortalConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an
    /// error. Otherwise the default path (`~/.config/portal/config.toml`)
    /// is tried and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `PortalConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. Invalid values (unknown role,
    /// unusable date format, zero quality) are logged and replaced by
    /// the default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        let data_dir = if cli.ephemeral {
            None
        } else {
            cli.data_dir
                .clone()
                .or_else(|| file.storage.data_dir.clone())
                .or(defaults.data_dir)
        };

        let role = match cli.role.as_deref().or(file.ui.role.as_deref()) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring configured role");
                defaults.role
            }),
            None => defaults.role,
        };

        let date_format = file
            .ui
            .date_format
            .clone()
            .filter(|f| {
                let ok = is_valid_date_format(f);
                if !ok {
                    tracing::warn!(format = %f, "ignoring invalid date format");
                }
                ok
            })
            .unwrap_or(defaults.date_format);

        let jpeg_quality = file
            .image
            .jpeg_quality
            .filter(|q| (1..=100).contains(q))
            .unwrap_or(defaults.jpeg_quality);

        let contact = ContactInfo {
            name: file.contact.name.clone().unwrap_or(defaults.contact.name),
            phone: file.contact.phone.clone().unwrap_or(defaults.contact.phone),
            email: file.contact.email.clone().unwrap_or(defaults.contact.email),
            hours: file.contact.hours.clone().unwrap_or(defaults.contact.hours),
        };

        Self {
            data_dir,
            quota_bytes: file.storage.quota_bytes.unwrap_or(defaults.quota_bytes),
            debounce: file
                .storage
                .debounce_ms
                .map_or(defaults.debounce, Duration::from_millis),
            max_image_width: file
                .image
                .max_width
                .filter(|w| *w > 0)
                .unwrap_or(defaults.max_image_width),
            jpeg_quality,
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            date_format,
            role,
            contact,
        }
    }

    /// Session settings derived from this configuration.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            debounce: self.debounce,
            date_format: self.date_format.clone(),
        }
    }

    /// Attachment settings derived from this configuration.
    #[must_use]
    pub const fn downscale_options(&self) -> DownscaleOptions {
        DownscaleOptions {
            max_width: self.max_image_width,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Customer portal: tasks, support thread and contact card")]
pub struct CliArgs {
    /// Directory where tasks and messages are stored.
    #[arg(long, env = "PORTAL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing is written to disk.
    #[arg(long)]
    pub ephemeral: bool,

    /// Who typed messages are sent as (customer or support).
    #[arg(long, env = "PORTAL_ROLE")]
    pub role: Option<String>,

    /// Path to config file (default: `~/.config/portal/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "PORTAL_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/portal.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Default data directory (`~/.local/share/portal` on Linux).
fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("portal"))
}

/// Whether chrono can render `format`.
fn is_valid_date_format(format: &str) -> bool {
    use chrono::format::{Item, StrftimeItems};
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("portal").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
