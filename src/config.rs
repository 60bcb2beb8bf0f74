/*!
 * Configuration support for the provider finder
 *
 * Provides runtime configuration options for customizing normalization,
 * filtering, aggregation, and export behavior.
 */

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

/// Global configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderConfig {
    /// How the `State` column form (code vs. full name) is detected
    #[serde(default)]
    pub state_form_detection: StateFormDetection,

    /// Which region column the region filter compares against
    #[serde(default)]
    pub region_filter_basis: RegionFilterBasis,

    /// Number of rows in the top-states table
    #[serde(default = "default_top_states_limit")]
    pub top_states_limit: usize,

    /// Number of equal-width bins in the usage histogram
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Whether to skip rows with unusable usage values during loading
    #[serde(default)]
    pub skip_invalid_records: bool,

    /// Whether to show a progress bar while loading
    #[serde(default = "default_enable_progress_bar")]
    pub enable_progress_bar: bool,

    /// Default export format
    #[serde(default)]
    pub default_export_format: crate::ExportFormat,

    /// Directory exports are written to (None = current directory)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

/// Detection of code vs. full-name state values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StateFormDetection {
    /// Classify the whole table by the first row's value length
    #[default]
    FirstRow,
    /// Classify each row by its own value length
    PerRow,
}

/// Column the region filter matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegionFilterBasis {
    /// The `Region` column as uploaded
    #[default]
    Supplied,
    /// The region derived from the state code
    Resolved,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            state_form_detection: StateFormDetection::FirstRow,
            region_filter_basis: RegionFilterBasis::Supplied,
            top_states_limit: default_top_states_limit(),
            histogram_bins: default_histogram_bins(),
            skip_invalid_records: false,
            enable_progress_bar: default_enable_progress_bar(),
            default_export_format: crate::ExportFormat::Csv,
            output_dir: None,
        }
    }
}

// Default value functions for serde
fn default_top_states_limit() -> usize {
    10
}

fn default_histogram_bins() -> usize {
    20
}

fn default_enable_progress_bar() -> bool {
    true
}

fn parse_bool(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl FinderConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - `NPI_FINDER_STATE_FORM`: "first_row" or "per_row"
    /// - `NPI_FINDER_REGION_FILTER`: "supplied" or "resolved"
    /// - `NPI_FINDER_TOP_STATES`: number
    /// - `NPI_FINDER_HISTOGRAM_BINS`: number
    /// - `NPI_FINDER_SKIP_INVALID`: "true" or "false"
    /// - `NPI_FINDER_PROGRESS_BAR`: "true" or "false"
    /// - `NPI_FINDER_EXPORT_FORMAT`: "csv", "excel", "html", or "json"
    /// - `NPI_FINDER_OUTPUT_DIR`: directory path
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `NPI_FINDER_*` environment variables on top of this configuration
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(val) = env_var("STATE_FORM") {
            self.state_form_detection = match val.to_lowercase().as_str() {
                "per_row" | "per-row" => StateFormDetection::PerRow,
                _ => StateFormDetection::FirstRow,
            };
        }

        if let Some(val) = env_var("REGION_FILTER") {
            self.region_filter_basis = match val.to_lowercase().as_str() {
                "resolved" => RegionFilterBasis::Resolved,
                _ => RegionFilterBasis::Supplied,
            };
        }

        if let Some(val) = env_var("TOP_STATES") {
            if let Ok(limit) = val.parse() {
                self.top_states_limit = limit;
            }
        }

        if let Some(val) = env_var("HISTOGRAM_BINS") {
            if let Ok(bins) = val.parse::<usize>() {
                self.histogram_bins = bins.max(1);
            }
        }

        if let Some(val) = env_var("SKIP_INVALID") {
            self.skip_invalid_records = parse_bool(&val);
        }

        if let Some(val) = env_var("PROGRESS_BAR") {
            self.enable_progress_bar = parse_bool(&val);
        }

        if let Some(val) = env_var("EXPORT_FORMAT") {
            self.default_export_format = match val.to_lowercase().as_str() {
                "excel" | "xlsx" => crate::ExportFormat::Excel,
                "html" => crate::ExportFormat::Html,
                "json" => crate::ExportFormat::Json,
                _ => crate::ExportFormat::Csv,
            };
        }

        if let Some(val) = env_var("OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(val));
        }

        self
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| crate::FinderError::Configuration {
                message: format!("Failed to parse config file: {}", e),
                suggestion: Some("Check that the file is valid TOML format".to_string()),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::FinderError::Configuration {
                message: format!("Failed to serialize config: {}", e),
                suggestion: None,
            })?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject settings that would make aggregation meaningless
    pub fn validate(&self) -> crate::Result<()> {
        if self.histogram_bins == 0 {
            return Err(crate::FinderError::Configuration {
                message: "histogram_bins must be at least 1".to_string(),
                suggestion: Some("The default is 20 bins".to_string()),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/npi-finder/config.toml` on Unix-like systems
    /// or `%APPDATA%\npi-finder\config.toml` on Windows
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", crate::constants::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location, environment, or defaults
    ///
    /// The default config file (if it exists) is loaded first and
    /// environment variables are applied on top of it.
    pub fn load() -> Self {
        let base = Self::default_config_path()
            .filter(|path| path.exists())
            .and_then(|path| match Self::from_file(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    log::warn!("Ignoring config file {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default();

        base.with_env_overrides()
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}{}", crate::constants::ENV_PREFIX, name)).ok()
}

// Global configuration support
use std::sync::RwLock;

lazy_static::lazy_static! {
    static ref GLOBAL_CONFIG: RwLock<Option<FinderConfig>> = RwLock::new(None);
}

/// Set the global configuration
pub fn set_global_config(config: FinderConfig) {
    match GLOBAL_CONFIG.write() {
        Ok(mut guard) => *guard = Some(config),
        Err(poisoned) => *poisoned.into_inner() = Some(config),
    }
}

/// Get the global configuration (or the loaded default if not set)
pub fn global_config() -> FinderConfig {
    let current = match GLOBAL_CONFIG.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    current.unwrap_or_else(FinderConfig::load)
}

/// Clear the global configuration
pub fn clear_global_config() {
    match GLOBAL_CONFIG.write() {
        Ok(mut guard) => *guard = None,
        Err(poisoned) => *poisoned.into_inner() = None,
    }
}

/// Builder for customizing configuration
#[derive(Default)]
pub struct ConfigBuilder {
    config: FinderConfig,
}

impl ConfigBuilder {
    /// Start building a new configuration
    pub fn new() -> Self {
        Self {
            config: FinderConfig::default(),
        }
    }

    pub fn state_form_detection(mut self, detection: StateFormDetection) -> Self {
        self.config.state_form_detection = detection;
        self
    }

    pub fn region_filter_basis(mut self, basis: RegionFilterBasis) -> Self {
        self.config.region_filter_basis = basis;
        self
    }

    pub fn top_states_limit(mut self, limit: usize) -> Self {
        self.config.top_states_limit = limit;
        self
    }

    /// Set histogram bin count (at least 1)
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.config.histogram_bins = bins.max(1);
        self
    }

    pub fn skip_invalid_records(mut self, skip: bool) -> Self {
        self.config.skip_invalid_records = skip;
        self
    }

    pub fn progress_bar(mut self, enabled: bool) -> Self {
        self.config.enable_progress_bar = enabled;
        self
    }

    pub fn default_export_format(mut self, format: crate::ExportFormat) -> Self {
        self.config.default_export_format = format;
        self
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Build the configuration
    pub fn build(self) -> FinderConfig {
        self.config
    }
}
