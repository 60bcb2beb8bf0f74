/*!
 * Dashboard rendering
 *
 * One request maps an uploaded table and a selection to a complete
 * [`DashboardReport`]: Filter, then State Normalizer, then Aggregation.
 * Nothing is cached between requests.
 */

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    analytics::{
        BoxGrouping, BoxPlot, DatasetOverview, Histogram, ProviderAnalytics, RegionCount,
        StateCount, StateShare, TopState, UsageGauge, UsageMean, UsageStatistics,
    },
    config::{FinderConfig, RegionFilterBasis},
    data_types::{NormalizedRecord, ProviderRecord},
    filter::{self, ProviderQuery, Selection},
    normalize::StateNormalizer,
};

/// Grouping used by the mean-usage chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanUsageGrouping {
    Region,
    State,
}

/// Everything shown for one selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub heading: String,
    pub selection: Selection,
    pub generated_at: DateTime<Utc>,
    pub overview: DatasetOverview,
    /// Normalized rows, the content of the CSV and Excel exports
    pub records: Vec<NormalizedRecord>,
    /// Bar chart order: most providers first
    pub state_counts: Vec<StateCount>,
    /// Choropleth data
    pub map_counts: Vec<StateCount>,
    /// Region pie; only without a region filter
    pub region_counts: Option<Vec<RegionCount>>,
    /// State pie; only with a region filter
    pub state_shares: Option<Vec<StateShare>>,
    pub mean_usage_grouping: MeanUsageGrouping,
    pub mean_usage: Vec<UsageMean>,
    pub usage_statistics: Option<UsageStatistics>,
    pub top_states: Vec<TopState>,
    pub histogram: Histogram,
    pub box_plots: Vec<BoxPlot>,
    pub usage_gauge: Option<UsageGauge>,
}

/// Render the dashboard for `selection` over the whole upload
pub fn render(upload: &[ProviderRecord], selection: &Selection, config: &FinderConfig) -> DashboardReport {
    let (overview, records) = match (config.region_filter_basis, &selection.region) {
        (RegionFilterBasis::Resolved, Some(region)) => {
            let by_specialty = ProviderQuery::new(upload)
                .specialty(selection.specialty.as_str())
                .execute();
            let normalized = StateNormalizer::new(config.state_form_detection).normalize(by_specialty);
            let records = filter::filter_by_resolved_region(normalized, region);
            let overview = DatasetOverview::from_providers(records.iter().map(|r| &r.provider));
            (overview, records)
        }
        _ => {
            let filtered = ProviderQuery::new(upload).selection(selection).execute();
            let overview = DatasetOverview::from_providers(filtered.iter().copied());
            let records = StateNormalizer::new(config.state_form_detection).normalize(filtered);
            (overview, records)
        }
    };

    debug!(
        "Rendering '{}': {} uploaded, {} filtered, {} normalized",
        selection.heading(),
        upload.len(),
        overview.total_providers,
        records.len()
    );

    let analytics = ProviderAnalytics::new(&records);
    let region_selected = selection.has_region();

    let (mean_usage_grouping, mean_usage) = if region_selected {
        (MeanUsageGrouping::State, analytics.mean_usage_by_state())
    } else {
        (MeanUsageGrouping::Region, analytics.mean_usage_by_region())
    };
    let box_grouping = if region_selected {
        BoxGrouping::SuppliedState
    } else {
        BoxGrouping::SuppliedRegion
    };

    DashboardReport {
        heading: selection.heading(),
        selection: selection.clone(),
        generated_at: Utc::now(),
        overview,
        state_counts: analytics.state_counts_by_count(),
        map_counts: analytics.map_counts(selection.region.as_deref()),
        region_counts: (!region_selected).then(|| analytics.region_counts()),
        state_shares: region_selected.then(|| analytics.state_shares()),
        mean_usage_grouping,
        mean_usage,
        usage_statistics: analytics.usage_statistics(),
        top_states: analytics.top_states(config.top_states_limit),
        histogram: analytics.histogram(config.histogram_bins),
        box_plots: analytics.box_plots(box_grouping),
        usage_gauge: analytics.usage_gauge(upload),
        records,
    }
}

impl DashboardReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Print a plain-text summary
    pub fn print_summary(&self) {
        println!("=== {} ===", self.heading);
        println!("Total Providers: {}", self.overview.total_providers);
        println!("States Represented: {}", self.overview.states_represented);
        match self.overview.average_usage {
            Some(avg) => println!("Avg. Usage Time: {:.2} mins", avg),
            None => println!("Avg. Usage Time: n/a"),
        }

        if self.is_empty() {
            println!();
            println!("No data available for the selected filters.");
            return;
        }

        if let Some(gauge) = &self.usage_gauge {
            println!(
                "Average vs. all providers: {:.1} vs {:.1} ({:+.1})",
                gauge.value, gauge.reference, gauge.delta
            );
        }

        println!();
        println!("Providers by State:");
        for count in &self.state_counts {
            println!("  {:<4} {:<22} {:>6}", count.state_code, count.state_name, count.count);
        }

        if let Some(regions) = &self.region_counts {
            println!();
            println!("Providers by Region:");
            for region in regions {
                println!("  {:<10} {:>6}  {:>5.1}%", region.region.as_str(), region.count, region.percentage);
            }
        }

        if let Some(shares) = &self.state_shares {
            println!();
            println!("State Breakdown:");
            for share in shares {
                println!("  {:<22} {:>6}  {:>5.1}%", share.state_name, share.count, share.percentage);
            }
        }

        println!();
        match self.mean_usage_grouping {
            MeanUsageGrouping::Region => println!("Avg. Usage Time by Region:"),
            MeanUsageGrouping::State => println!("Avg. Usage Time by State:"),
        }
        for mean in &self.mean_usage {
            println!("  {:<22} {:>8.1}", mean.label, mean.mean_minutes);
        }

        if let Some(stats) = &self.usage_statistics {
            println!();
            println!("Usage Time Statistics:");
            for (label, value) in stats.table_rows() {
                println!("  {:<20} {:>10}", label, value);
            }
        }

        println!();
        println!("Top States:");
        for top in &self.top_states {
            println!("  {:<4} {:<22} {:>6}", top.state_code, top.state_name, top.count);
        }
    }
}
