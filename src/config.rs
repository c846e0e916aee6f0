//! Configuration file support for labelgrid.
//!
//! Settings are stored as JSON in the layout the settings editor writes
//! (camelCase keys). Every section falls back to defaults when absent, so a
//! partial settings file still loads.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color_utils::LABEL_PALETTE;
use crate::constants::{DEFAULT_IMAGES_PER_ROW, MAX_LABEL_NAME_LEN, MAX_PATH_LEN, MAX_TITLE_LEN};
use crate::keybindings::parse_key;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Hotkeys and the label catalog
    #[serde(default)]
    pub hotkeys: HotkeysConfig,

    /// Image and metadata locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Grid layout
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Metadata columns shown alongside each image
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

/// Hotkey section: special keys plus the full label catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotkeysConfig {
    /// Key that cycles the current item through all labels
    #[serde(default = "default_rotation_key")]
    pub label_rotation: String,

    /// Key that opens the label picker
    #[serde(default = "default_dropdown_key")]
    pub label_dropdown: String,

    /// Key that opens the comment editor
    #[serde(default = "default_comment_key")]
    pub comment: String,

    /// Label catalog in display order (enabled and disabled)
    #[serde(default = "default_labels")]
    pub labels: Vec<LabelConfig>,
}

fn default_rotation_key() -> String {
    "Enter".to_string()
}

fn default_dropdown_key() -> String {
    "Tab".to_string()
}

fn default_comment_key() -> String {
    "F2".to_string()
}

fn default_labels() -> Vec<LabelConfig> {
    vec![
        LabelConfig::new("NV", "No vains", true),
        LabelConfig::new("S", "Stent", true),
        LabelConfig::new("C", "Coil", true),
        LabelConfig::new("FD", "Flow Diverters", true),
        LabelConfig::new("DA", "Dental Artifacts", true),
        LabelConfig::new("L6", "Label name 6", false),
        LabelConfig::new("L7", "Label name 7", false),
    ]
}

impl Default for HotkeysConfig {
    fn default() -> Self {
        Self {
            label_rotation: default_rotation_key(),
            label_dropdown: default_dropdown_key(),
            comment: default_comment_key(),
            labels: default_labels(),
        }
    }
}

/// One entry of the label catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Short code typed to select the label
    pub acronym: String,
    /// Display name
    pub name: String,
    /// Whether the label takes part in annotation
    #[serde(default)]
    pub enabled: bool,
}

impl LabelConfig {
    /// Create a catalog entry.
    pub fn new(acronym: &str, name: &str, enabled: bool) -> Self {
        Self {
            acronym: acronym.to_string(),
            name: name.to_string(),
            enabled,
        }
    }
}

/// Locations of the images and the metadata CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathsConfig {
    /// Prefix prepended to every encoded file name
    #[serde(default = "default_image_path")]
    pub image_path: String,
    /// Path of the CSV file, relative to the storage root
    #[serde(default = "default_metadata_path")]
    pub metadata_path: String,
}

fn default_image_path() -> String {
    "/images/".to_string()
}

fn default_metadata_path() -> String {
    "/mock_metadata.csv".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            image_path: default_image_path(),
            metadata_path: default_metadata_path(),
        }
    }
}

/// Grid layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Number of grid columns
    #[serde(default = "default_images_per_row")]
    pub images_per_row: usize,
    /// Title shown above the gallery
    #[serde(default = "default_gallery_title")]
    pub gallery_title: String,
}

fn default_images_per_row() -> usize {
    DEFAULT_IMAGES_PER_ROW
}

fn default_gallery_title() -> String {
    "Image Gallery".to_string()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            images_per_row: default_images_per_row(),
            gallery_title: default_gallery_title(),
        }
    }
}

/// Metadata columns loaded into each item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Declared columns, enabled or not
    #[serde(default = "default_metadata_columns")]
    pub columns: Vec<MetadataColumn>,
}

fn default_metadata_columns() -> Vec<MetadataColumn> {
    ["filename", "label", "gender", "age", "description"]
        .iter()
        .map(|name| MetadataColumn {
            name: name.to_string(),
            enabled: true,
        })
        .collect()
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            columns: default_metadata_columns(),
        }
    }
}

impl MetadataConfig {
    /// Names of the enabled columns, in declaration order.
    pub fn enabled_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|column| column.enabled)
            .map(|column| column.name.as_str())
    }
}

/// A declared metadata column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataColumn {
    /// Column header (matched case-insensitively)
    pub name: String,
    /// Whether the column is loaded
    #[serde(default)]
    pub enabled: bool,
}

/// User preferences section of the config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// A settings field that would be rejected by the settings editor.
///
/// Issues are reported, never enforced: the engine keeps running with the
/// settings as loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigIssue {
    /// A required field is empty
    #[error("Empty field: {field}")]
    EmptyField { field: String },

    /// A field exceeds its character limit
    #[error("Field '{field}' has more than {max} characters")]
    TooLong { field: String, max: usize },

    /// Image path does not start and end with '/'
    #[error("Image path must start with / and end with /")]
    InvalidImagePath,

    /// Metadata path does not start with '/' and end with '.csv'
    #[error("Metadata path must start with / and end with .csv")]
    InvalidMetadataPath,

    /// More labels are enabled than there are distinct colors
    #[error("{count} labels enabled, only {max} have distinct colors")]
    TooManyLabels { count: usize, max: usize },

    /// A hotkey name is not a recognized key
    #[error("Unknown key '{value}' for {field}")]
    UnknownKey { field: String, value: String },
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            hotkeys: HotkeysConfig::default(),
            paths: PathsConfig::default(),
            layout: LayoutConfig::default(),
            metadata: MetadataConfig::default(),
            preferences: UserPreferences::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Check every field against the limits of the settings editor.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let mut enabled = 0;
        for (slot, label) in self.hotkeys.labels.iter().enumerate() {
            if !label.enabled {
                continue;
            }
            enabled += 1;
            if label.name.trim().is_empty() {
                issues.push(ConfigIssue::EmptyField {
                    field: format!("Name Label {}", slot + 1),
                });
            }
            if label.acronym.trim().is_empty() {
                issues.push(ConfigIssue::EmptyField {
                    field: format!("Acronym Label {}", slot + 1),
                });
            }
            if label.name.chars().count() > MAX_LABEL_NAME_LEN {
                issues.push(ConfigIssue::TooLong {
                    field: format!("Name Label {}", slot + 1),
                    max: MAX_LABEL_NAME_LEN,
                });
            }
        }
        if enabled > LABEL_PALETTE.len() {
            issues.push(ConfigIssue::TooManyLabels {
                count: enabled,
                max: LABEL_PALETTE.len(),
            });
        }

        for (field, value) in [
            ("Label Rotation", &self.hotkeys.label_rotation),
            ("Label Dropdown", &self.hotkeys.label_dropdown),
            ("Comment", &self.hotkeys.comment),
        ] {
            if parse_key(value).is_none() {
                issues.push(ConfigIssue::UnknownKey {
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }

        let image_path = &self.paths.image_path;
        let metadata_path = &self.paths.metadata_path;
        if image_path.chars().count() > MAX_PATH_LEN {
            issues.push(ConfigIssue::TooLong {
                field: "Image Path".to_string(),
                max: MAX_PATH_LEN,
            });
        }
        if metadata_path.chars().count() > MAX_PATH_LEN {
            issues.push(ConfigIssue::TooLong {
                field: "Metadata Path".to_string(),
                max: MAX_PATH_LEN,
            });
        }
        if self.layout.gallery_title.chars().count() > MAX_TITLE_LEN {
            issues.push(ConfigIssue::TooLong {
                field: "Gallery Title".to_string(),
                max: MAX_TITLE_LEN,
            });
        }
        if !image_path.starts_with('/') || !image_path.ends_with('/') {
            issues.push(ConfigIssue::InvalidImagePath);
        }
        if !metadata_path.starts_with('/') || !metadata_path.ends_with(".csv") {
            issues.push(ConfigIssue::InvalidMetadataPath);
        }

        issues
    }

    /// Get the default filename for the settings file.
    pub fn default_filename() -> &'static str {
        "labelgrid-settings.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("labelgrid").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("labelgrid")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
