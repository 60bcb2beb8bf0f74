/*!
 * Dataset API for an uploaded provider table
 *
 * Provides a builder for loading an upload and a single handle for the
 * operations a dashboard session performs on it: listing filter choices,
 * querying, rendering reports, and exporting.
 */

use std::path::{Path, PathBuf};

use log::info;

use crate::{
    ExportFormat, FinderError, Result,
    config::FinderConfig,
    dashboard::{self, DashboardReport},
    data_types::ProviderRecord,
    export,
    filter::{FilterOptions, ProviderQuery, Selection},
    reader::ProviderReader,
};

/// Builder for loading a provider upload
///
/// # Example
/// ```no_run
/// # use npi_finder::dataset::ProviderDatasetBuilder;
/// let dataset = ProviderDatasetBuilder::new()
///     .path("providers.xlsx")
///     .skip_invalid_records(true)
///     .build()?;
/// # Ok::<(), npi_finder::FinderError>(())
/// ```
pub struct ProviderDatasetBuilder {
    path: Option<PathBuf>,
    config: FinderConfig,
}

impl Default for ProviderDatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderDatasetBuilder {
    /// Create a new dataset builder
    pub fn new() -> Self {
        Self {
            path: None,
            config: FinderConfig::default(),
        }
    }

    /// Set the path to the uploaded file
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use a configuration for loading and rendering
    pub fn config(mut self, config: FinderConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable skipping invalid records
    pub fn skip_invalid_records(mut self, skip: bool) -> Self {
        self.config.skip_invalid_records = skip;
        self
    }

    /// Enable or disable progress bars
    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.enable_progress_bar = show;
        self
    }

    /// Build the dataset, loading the file
    pub fn build(self) -> Result<ProviderDataset> {
        let path = self.path.ok_or_else(|| FinderError::Custom {
            message: "Upload file path not specified".to_string(),
            suggestion: Some("Use .path() to specify a .csv or .xlsx file".to_string()),
        })?;

        let records = ProviderReader::from_config(&self.config).load(&path)?;
        info!("Loaded {} providers from {}", records.len(), path.display());

        Ok(ProviderDataset {
            records,
            source: Some(path),
            config: self.config,
        })
    }
}

/// A loaded upload
#[derive(Debug, Clone)]
pub struct ProviderDataset {
    /// Rows as uploaded
    pub records: Vec<ProviderRecord>,
    /// File the rows came from, if any
    pub source: Option<PathBuf>,
    pub config: FinderConfig,
}

impl ProviderDataset {
    /// Wrap rows already in memory
    pub fn from_records(records: Vec<ProviderRecord>) -> Self {
        Self {
            records,
            source: None,
            config: FinderConfig::default(),
        }
    }

    /// Load a file with default settings
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        ProviderDatasetBuilder::new().path(path).build()
    }

    pub fn with_config(mut self, config: FinderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Specialty and region choices for this upload
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_records(&self.records)
    }

    /// Start a query over the uploaded rows
    pub fn query(&self) -> ProviderQuery<'_> {
        ProviderQuery::new(&self.records)
    }

    /// Render the dashboard for a selection
    pub fn render(&self, selection: &Selection) -> DashboardReport {
        dashboard::render(&self.records, selection, &self.config)
    }

    /// Render and export in one step, returning the written file
    pub fn export<P: AsRef<Path>>(&self, selection: &Selection, format: ExportFormat, dir: P) -> Result<PathBuf> {
        export::export_report(&self.render(selection), format, dir)
    }
}
