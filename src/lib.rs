/*!
 * # NPI Provider Finder
 *
 * A Rust library for exploring healthcare provider spreadsheets by
 * specialty and region.
 *
 * ## Features
 *
 * - **Spreadsheet Input**: `.csv`, `.xlsx`, `.xls` and `.ods` uploads with a
 *   presence-only schema check
 * - **State Normalization**: two-letter codes or full state names resolved
 *   to a canonical code, display name and census region
 * - **Aggregates**: state and region counts, usage-time means and
 *   statistics, top states, histogram, box-plot and gauge data
 * - **Exports**: CSV, Excel, a standalone HTML choropleth, and JSON
 *
 * ## Quick Start
 *
 * ```no_run
 * use npi_finder::prelude::*;
 *
 * # fn main() -> Result<()> {
 * let dataset = ProviderDataset::load("providers.xlsx")?;
 *
 * // Dropdown choices
 * let options = dataset.filter_options();
 * println!("Specialties: {:?}", options.specialties);
 *
 * // One dashboard request
 * let selection = Selection::new("Cardiology", Some("West"))?;
 * let report = dataset.render(&selection);
 * report.print_summary();
 *
 * // Export the filtered rows
 * dataset.export(&selection, ExportFormat::Excel, "out")?;
 * # Ok(())
 * # }
 * ```
 *
 * ## Processing Order
 *
 * Every request runs Filter, then State Normalizer, then Aggregation:
 *
 * ```no_run
 * # use npi_finder::prelude::*;
 * # fn main() -> Result<()> {
 * # let records: Vec<ProviderRecord> = Vec::new();
 * let filtered = ProviderQuery::new(&records).specialty("Cardiology").execute();
 * let normalized = StateNormalizer::default().normalize(filtered);
 * let analytics = ProviderAnalytics::new(&normalized);
 * println!("{:?}", analytics.region_counts());
 * # Ok(())
 * # }
 * ```
 *
 * By default the region filter matches the `Region` column as uploaded,
 * while charts group by the region resolved from the state. Set
 * `region_filter_basis = "resolved"` to filter on the resolved region.
 *
 * ## Configuration
 *
 * ```no_run
 * # use npi_finder::prelude::*;
 * # use npi_finder::config::StateFormDetection;
 * let config = ConfigBuilder::new()
 *     .state_form_detection(StateFormDetection::PerRow)
 *     .top_states_limit(5)
 *     .skip_invalid_records(true)
 *     .build();
 * npi_finder::config::set_global_config(config);
 * ```
 *
 * Configuration is also read from `config.toml` in the platform config
 * directory and from `NPI_FINDER_*` environment variables.
 */

// Re-export error types from root
pub use error::{ErrorContext, ExportFormat, FinderError, Result};

// Public modules
pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod data_types;
pub mod dataset;
pub mod error;
pub mod export;
pub mod filter;
pub mod normalize;
pub mod reader;
pub mod reference;
pub mod schema;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```
/// use npi_finder::prelude::*;
/// ```
pub mod prelude {
    pub use crate::analytics::{ProviderAnalytics, UsageStatistics};
    pub use crate::config::{ConfigBuilder, FinderConfig};
    pub use crate::dashboard::{render, DashboardReport};
    pub use crate::data_types::*;
    pub use crate::dataset::{ProviderDataset, ProviderDatasetBuilder};
    pub use crate::error::{FinderError, Result};
    pub use crate::export::{CsvExporter, ExcelExporter, HtmlMapExporter, JsonExporter, ReportExporter};
    pub use crate::filter::{FilterOptions, ProviderQuery, Selection, ALL_REGIONS};
    pub use crate::normalize::StateNormalizer;
    pub use crate::reader::ProviderReader;
    pub use crate::reference::{Region, StateCode};
    pub use crate::schema::*;
    pub use crate::ExportFormat;
}

/// Reference data constants
pub mod constants {
    /// States plus the District of Columbia
    pub const STATE_COUNT: usize = 51;

    /// Census regions in the reference table
    pub const REGION_COUNT: usize = 4;

    /// Config directory name and environment variable prefix
    pub const APP_NAME: &str = "npi-finder";
    pub const ENV_PREFIX: &str = "NPI_FINDER_";
}

/// Common recipes and utility functions
pub mod cookbook {
    use crate::prelude::*;
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    /// Number of uploaded rows per specialty, sorted by specialty
    pub fn specialty_counts(dataset: &ProviderDataset) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();

        for provider in &dataset.records {
            *counts.entry(provider.specialty.clone()).or_insert(0) += 1;
        }

        counts
    }

    /// Render once and write every export format into `dir`
    ///
    /// # Example
    /// ```no_run
    /// # use npi_finder::prelude::*;
    /// # use npi_finder::cookbook::export_all;
    /// # fn main() -> Result<()> {
    /// # let dataset = ProviderDataset::load("providers.csv")?;
    /// let selection = Selection::specialty_only("Cardiology")?;
    /// let files = export_all(&dataset, &selection, "out")?;
    /// assert_eq!(files.len(), 4);
    /// # Ok(())
    /// # }
    /// ```
    pub fn export_all<P: AsRef<Path>>(
        dataset: &ProviderDataset,
        selection: &Selection,
        dir: P,
    ) -> Result<Vec<PathBuf>> {
        let report = dataset.render(selection);
        ExportFormat::all()
            .into_iter()
            .map(|format| crate::export::export_report(&report, format, dir.as_ref()))
            .collect()
    }
}
