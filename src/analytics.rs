/*!
 * Aggregation over normalized provider rows
 *
 * Grouped counts, usage-time means, distribution statistics, and the
 * histogram / box-plot / gauge data behind the dashboard charts. Every
 * aggregate is a pure function of its input rows; an empty input produces
 * empty vectors or `None`, never an error.
 */

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    data_types::{NormalizedRecord, ProviderRecord},
    reference::{self, Region},
};

/// Provider count for one resolved state code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateCount {
    pub state_code: String,
    pub state_name: String,
    pub region: Region,
    pub count: usize,
}

/// Provider count for one resolved region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCount {
    pub region: Region,
    pub count: usize,
    /// Share of all rows, rounded to one decimal
    pub percentage: f64,
}

/// Provider count and share for one state inside a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateShare {
    pub state_code: String,
    pub state_name: String,
    pub count: usize,
    pub percentage: f64,
}

/// Mean usage time for one group (region or state)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageMean {
    /// Region name or state code
    pub key: String,
    /// Region name or state display name
    pub label: String,
    /// Rounded to one decimal
    pub mean_minutes: f64,
}

/// Row of the top-states table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopState {
    pub state_code: String,
    /// State value as uploaded
    pub state: String,
    pub state_name: String,
    pub count: usize,
}

/// Usage time distribution, each value rounded to two decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample (N-1) standard deviation; `None` with a single value
    pub std_dev: Option<f64>,
}

impl UsageStatistics {
    /// Compute statistics over a set of usage values
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sorted = sorted(values);

        Some(Self {
            count: values.len(),
            mean: round_to(mean(values)?, 2),
            median: round_to(quantile_sorted(&sorted, 0.5), 2),
            min: round_to(sorted[0], 2),
            max: round_to(sorted[sorted.len() - 1], 2),
            std_dev: sample_std_dev(values).map(|s| round_to(s, 2)),
        })
    }

    /// (label, formatted value) rows for display
    pub fn table_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Mean", format!("{:.2}", self.mean)),
            ("Median", format!("{:.2}", self.median)),
            ("Minimum", format!("{:.2}", self.min)),
            ("Maximum", format!("{:.2}", self.max)),
            (
                "Standard Deviation",
                self.std_dev.map(|s| format!("{:.2}", s)).unwrap_or_else(|| "n/a".to_string()),
            ),
        ]
    }
}

/// Headline numbers for the filtered table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub total_providers: usize,
    /// Distinct `State` values as uploaded
    pub states_represented: usize,
    /// Rounded to two decimals
    pub average_usage: Option<f64>,
}

impl DatasetOverview {
    pub fn from_providers<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ProviderRecord>,
    {
        let mut total_providers = 0;
        let mut states = HashSet::new();
        let mut usage = Vec::new();

        for record in records {
            total_providers += 1;
            if !record.state.is_empty() {
                states.insert(record.state.as_str());
            }
            usage.extend(record.usage_minutes);
        }

        Self {
            total_providers,
            states_represented: states.len(),
            average_usage: mean(&usage).map(|m| round_to(m, 2)),
        }
    }
}

/// One equal-width histogram bin, `[lower, upper)` except the last
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Usage time histogram with a mean marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    pub mean: Option<f64>,
}

impl Histogram {
    pub fn from_values(values: &[f64], bin_count: usize) -> Self {
        let Some((&min, &max)) = values
            .iter()
            .min_by(|a, b| a.total_cmp(b))
            .zip(values.iter().max_by(|a, b| a.total_cmp(b)))
        else {
            return Self { bins: Vec::new(), mean: None };
        };

        let bins = if min == max || bin_count <= 1 {
            vec![HistogramBin { lower: min, upper: max, count: values.len() }]
        } else {
            let width = (max - min) / bin_count as f64;
            let mut bins: Vec<HistogramBin> = (0..bin_count)
                .map(|i| HistogramBin {
                    lower: min + width * i as f64,
                    upper: if i + 1 == bin_count { max } else { min + width * (i + 1) as f64 },
                    count: 0,
                })
                .collect();
            for v in values {
                let idx = (((v - min) / width).floor() as usize).min(bin_count - 1);
                bins[idx].count += 1;
            }
            bins
        };

        Self { bins, mean: mean(values).map(|m| round_to(m, 1)) }
    }
}

/// Five-number summary with 1.5·IQR whiskers for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlot {
    pub group: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxPlot {
    pub fn from_values(group: impl Into<String>, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sorted = sorted(values);
        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = sorted.iter().copied().filter(|v| *v >= low_fence && *v <= high_fence);
        let lower_whisker = inside.clone().next().unwrap_or(sorted[0]);
        let upper_whisker = inside.last().unwrap_or(sorted[sorted.len() - 1]);

        Some(Self {
            group: group.into(),
            count: sorted.len(),
            min: sorted[0],
            q1,
            median: quantile_sorted(&sorted, 0.5),
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers: sorted
                .iter()
                .copied()
                .filter(|v| *v < low_fence || *v > high_fence)
                .collect(),
        })
    }
}

/// Column the box plots are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxGrouping {
    /// The `Region` column as uploaded
    SuppliedRegion,
    /// The `State` column as uploaded
    SuppliedState,
}

/// Colored range on the gauge axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeBand {
    pub from: f64,
    pub to: f64,
}

/// Filtered average usage compared with the whole upload's average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageGauge {
    pub value: f64,
    pub reference: f64,
    pub delta: f64,
    pub axis_max: f64,
    pub bands: Vec<GaugeBand>,
}

impl UsageGauge {
    /// `value` is the filtered mean; reference data is the entire upload
    pub fn new(value: f64, upload: &[ProviderRecord]) -> Option<Self> {
        let all: Vec<f64> = upload.iter().filter_map(|r| r.usage_minutes).collect();
        let reference = mean(&all)?;
        let axis_max = all.iter().copied().fold(f64::NEG_INFINITY, f64::max) * 1.2;

        Some(Self {
            value,
            reference,
            delta: value - reference,
            axis_max,
            bands: vec![
                GaugeBand { from: 0.0, to: reference * 0.7 },
                GaugeBand { from: reference * 0.7, to: reference * 1.3 },
                GaugeBand { from: reference * 1.3, to: axis_max },
            ],
        })
    }
}

/// Analytics engine over normalized rows
pub struct ProviderAnalytics<'a> {
    records: &'a [NormalizedRecord],
}

impl<'a> ProviderAnalytics<'a> {
    pub fn new(records: &'a [NormalizedRecord]) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Usage values present in the rows, blanks skipped
    pub fn usage_values(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.usage_minutes()).collect()
    }

    /// Get provider count by resolved state code
    pub fn provider_count_by_state(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();

        for record in self.records {
            *counts.entry(record.state_code.clone()).or_insert(0) += 1;
        }

        counts
    }

    /// State counts ordered by state code
    pub fn state_counts(&self) -> Vec<StateCount> {
        self.provider_count_by_state()
            .into_iter()
            .map(|(code, count)| StateCount {
                state_name: display_name(&code),
                region: reference::region_for_code(&code),
                state_code: code,
                count,
            })
            .collect()
    }

    /// State counts for the bar chart, most providers first
    pub fn state_counts_by_count(&self) -> Vec<StateCount> {
        let mut counts = self.state_counts();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    /// State counts for the choropleth.
    ///
    /// With a region selected, only that region's member states are kept; a
    /// region name outside the reference table keeps nothing.
    pub fn map_counts(&self, selected_region: Option<&str>) -> Vec<StateCount> {
        let counts = self.state_counts();
        match selected_region {
            None => counts,
            Some(name) => {
                let members = Region::from_name(name).map(|r| r.members()).unwrap_or(&[]);
                counts
                    .into_iter()
                    .filter(|c| members.iter().any(|m| m.as_code() == c.state_code))
                    .collect()
            }
        }
    }

    /// Get provider count by resolved region
    pub fn provider_count_by_region(&self) -> BTreeMap<Region, usize> {
        let mut counts = BTreeMap::new();

        for record in self.records {
            *counts.entry(record.mapped_region).or_insert(0) += 1;
        }

        counts
    }

    /// Region counts with percentage of total, ordered by region name
    pub fn region_counts(&self) -> Vec<RegionCount> {
        let counts = self.provider_count_by_region();
        let total: usize = counts.values().sum();

        counts
            .into_iter()
            .map(|(region, count)| RegionCount {
                region,
                count,
                percentage: percentage(count, total),
            })
            .collect()
    }

    /// Per-state counts and shares, for the pie shown when a region is selected
    pub fn state_shares(&self) -> Vec<StateShare> {
        let counts = self.state_counts();
        let total: usize = counts.iter().map(|c| c.count).sum();

        counts
            .into_iter()
            .map(|c| StateShare {
                percentage: percentage(c.count, total),
                state_code: c.state_code,
                state_name: c.state_name,
                count: c.count,
            })
            .collect()
    }

    /// Mean usage per resolved region, highest first
    pub fn mean_usage_by_region(&self) -> Vec<UsageMean> {
        let mut groups: BTreeMap<Region, Vec<f64>> = BTreeMap::new();
        for record in self.records {
            let values = groups.entry(record.mapped_region).or_default();
            values.extend(record.usage_minutes());
        }

        sorted_means(groups.into_iter().map(|(region, values)| {
            (region.as_str().to_string(), region.as_str().to_string(), values)
        }))
    }

    /// Mean usage per resolved state code, highest first
    pub fn mean_usage_by_state(&self) -> Vec<UsageMean> {
        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for record in self.records {
            let values = groups.entry(record.state_code.clone()).or_default();
            values.extend(record.usage_minutes());
        }

        sorted_means(groups.into_iter().map(|(code, values)| {
            let label = display_name(&code);
            (code, label, values)
        }))
    }

    /// Distribution statistics over all usage values
    pub fn usage_statistics(&self) -> Option<UsageStatistics> {
        UsageStatistics::from_values(&self.usage_values())
    }

    /// Get top N states by provider count.
    ///
    /// Groups by (resolved code, uploaded value); ties keep first-seen order.
    pub fn top_states(&self, limit: usize) -> Vec<TopState> {
        let mut order: Vec<TopState> = Vec::new();
        let mut index: HashMap<(&str, &str), usize> = HashMap::new();

        for record in self.records {
            let key = (record.state_code.as_str(), record.provider.state.as_str());
            match index.get(&key) {
                Some(&i) => order[i].count += 1,
                None => {
                    index.insert(key, order.len());
                    order.push(TopState {
                        state_code: record.state_code.clone(),
                        state: record.provider.state.clone(),
                        state_name: display_name(&record.state_code),
                        count: 1,
                    });
                }
            }
        }

        // sort_by is stable
        order.sort_by(|a, b| b.count.cmp(&a.count));
        order.truncate(limit);
        order
    }

    /// Usage histogram with `bin_count` equal-width bins
    pub fn histogram(&self, bin_count: usize) -> Histogram {
        Histogram::from_values(&self.usage_values(), bin_count)
    }

    /// Box plots grouped by an uploaded column, groups in first-seen order
    pub fn box_plots(&self, grouping: BoxGrouping) -> Vec<BoxPlot> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();

        for record in self.records {
            let key = match grouping {
                BoxGrouping::SuppliedRegion => record.provider.region.as_str(),
                BoxGrouping::SuppliedState => record.provider.state.as_str(),
            };
            let values = groups.entry(key).or_insert_with(|| {
                order.push(key);
                Vec::new()
            });
            values.extend(record.usage_minutes());
        }

        order
            .into_iter()
            .filter_map(|key| BoxPlot::from_values(key, groups.get(key)?))
            .collect()
    }

    /// Gauge comparing these rows' mean usage against the whole upload
    pub fn usage_gauge(&self, upload: &[ProviderRecord]) -> Option<UsageGauge> {
        UsageGauge::new(mean(&self.usage_values())?, upload)
    }
}

fn display_name(code: &str) -> String {
    reference::name_for_code(code)
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

fn sorted_means<I>(groups: I) -> Vec<UsageMean>
where
    I: Iterator<Item = (String, String, Vec<f64>)>,
{
    let mut means: Vec<UsageMean> = groups
        .filter_map(|(key, label, values)| {
            Some(UsageMean { key, label, mean_minutes: round_to(mean(&values)?, 1) })
        })
        .collect();
    means.sort_by(|a, b| b.mean_minutes.total_cmp(&a.mean_minutes));
    means
}

// Numeric helpers

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(count as f64 * 100.0 / total as f64, 1)
}

/// Round to `decimals` places; exact ties go to the even digit
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Linear-interpolation quantile of non-empty sorted values
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::StateNormalizer;

    fn normalized(rows: &[(&str, &str, &str, Option<f64>)]) -> Vec<NormalizedRecord> {
        let providers: Vec<ProviderRecord> = rows
            .iter()
            .enumerate()
            .map(|(i, (state, region, specialty, usage))| {
                ProviderRecord::new(i.to_string(), *specialty, *state, *region, *usage)
            })
            .collect();
        StateNormalizer::default().normalize(&providers)
    }

    fn five_rows() -> Vec<NormalizedRecord> {
        normalized(&[
            ("NY", "Northeast", "Cardiology", Some(45.2)),
            ("CA", "West", "Cardiology", Some(32.7)),
            ("NY", "Northeast", "Cardiology", Some(58.1)),
            ("CA", "West", "Cardiology", Some(41.5)),
            ("NY", "Northeast", "Cardiology", Some(37.8)),
        ])
    }

    #[test]
    fn test_state_and_region_counts() {
        let rows = five_rows();
        let analytics = ProviderAnalytics::new(&rows);

        let states = analytics.provider_count_by_state();
        assert_eq!(states.get("NY"), Some(&3));
        assert_eq!(states.get("CA"), Some(&2));

        let regions = analytics.region_counts();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].region, Region::Northeast);
        assert_eq!(regions[0].count, 3);
        assert_eq!(regions[0].percentage, 60.0);
        assert_eq!(regions[1].region, Region::West);
        assert_eq!(regions[1].count, 2);
        assert_eq!(regions[1].percentage, 40.0);
    }

    #[test]
    fn test_unknown_region_sorts_by_name() {
        let rows = normalized(&[
            ("CA", "West", "Cardiology", None),
            ("PR", "South", "Cardiology", None),
        ]);
        let analytics = ProviderAnalytics::new(&rows);

        let regions: Vec<_> = analytics.region_counts().iter().map(|c| c.region).collect();
        assert_eq!(regions, vec![Region::Unknown, Region::West]);

        let keys: Vec<_> = analytics.provider_count_by_region().into_keys().collect();
        assert_eq!(keys, vec![Region::Unknown, Region::West]);
    }

    #[test]
    fn test_state_shares_within_region() {
        let rows = normalized(&[
            ("WA", "West", "Cardiology", None),
            ("CA", "West", "Cardiology", None),
            ("CA", "West", "Cardiology", None),
        ]);
        let shares = ProviderAnalytics::new(&rows).state_shares();

        assert_eq!(
            shares,
            vec![
                StateShare {
                    state_code: "CA".to_string(),
                    state_name: "California".to_string(),
                    count: 2,
                    percentage: 66.7,
                },
                StateShare {
                    state_code: "WA".to_string(),
                    state_name: "Washington".to_string(),
                    count: 1,
                    percentage: 33.3,
                },
            ]
        );
    }

    #[test]
    fn test_rounding_ties_go_to_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(62.5, 0), 62.0);
        assert_eq!(round_to(63.5, 0), 64.0);

        // 1 of 16 is exactly 6.25%
        let mut rows = vec![("NY", "Northeast", "Cardiology", None)];
        rows.extend(std::iter::repeat(("CA", "West", "Cardiology", None)).take(15));
        let regions = ProviderAnalytics::new(&normalized(&rows)).region_counts();
        assert_eq!(regions[0].region, Region::Northeast);
        assert_eq!(regions[0].percentage, 6.2);
        assert_eq!(regions[1].percentage, 93.8);

        let stats = UsageStatistics::from_values(&[0.25, 0.0]).unwrap();
        assert_eq!(stats.mean, 0.12);
        assert_eq!(stats.median, 0.12);
    }

    #[test]
    fn test_usage_statistics() {
        let stats = UsageStatistics::from_values(&[45.2, 32.7, 58.1, 41.5, 37.8]).unwrap();
        assert_eq!(stats.mean, 43.06);
        assert_eq!(stats.median, 41.5);
        assert_eq!(stats.min, 32.7);
        assert_eq!(stats.max, 58.1);
        assert_eq!(stats.std_dev, Some(9.59));
        assert_eq!(stats.table_rows()[0], ("Mean", "43.06".to_string()));
    }

    #[test]
    fn test_statistics_edge_cases() {
        assert!(UsageStatistics::from_values(&[]).is_none());
        let single = UsageStatistics::from_values(&[12.0]).unwrap();
        assert_eq!(single.median, 12.0);
        assert_eq!(single.std_dev, None);
        let even = UsageStatistics::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(even.median, 2.5);
    }

    #[test]
    fn test_top_states_stable_ties() {
        let rows = normalized(&[
            ("TX", "South", "Cardiology", None),
            ("OH", "Midwest", "Cardiology", None),
            ("FL", "South", "Cardiology", None),
            ("OH", "Midwest", "Cardiology", None),
            ("FL", "South", "Cardiology", None),
            ("TX", "South", "Cardiology", None),
            ("WA", "West", "Cardiology", None),
        ]);
        let top = ProviderAnalytics::new(&rows).top_states(3);

        let codes: Vec<_> = top.iter().map(|t| t.state_code.as_str()).collect();
        assert_eq!(codes, vec!["TX", "OH", "FL"]);
        assert_eq!(top[0].state_name, "Texas");
        assert_eq!(top[0].count, 2);
    }

    #[test]
    fn test_mean_usage_by_region_sorted_desc() {
        let rows = five_rows();
        let means = ProviderAnalytics::new(&rows).mean_usage_by_region();

        assert_eq!(means[0].key, "Northeast");
        assert_eq!(means[0].mean_minutes, 47.0);
        assert_eq!(means[1].key, "West");
        assert_eq!(means[1].mean_minutes, 37.1);
    }

    #[test]
    fn test_map_counts_restricted_to_region() {
        let rows = five_rows();
        let analytics = ProviderAnalytics::new(&rows);

        assert_eq!(analytics.map_counts(None).len(), 2);
        let west = analytics.map_counts(Some("West"));
        assert_eq!(west.len(), 1);
        assert_eq!(west[0].state_code, "CA");
        assert_eq!(west[0].state_name, "California");
        assert!(analytics.map_counts(Some("Pacific")).is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_aggregates() {
        let rows: Vec<NormalizedRecord> = Vec::new();
        let analytics = ProviderAnalytics::new(&rows);

        assert!(analytics.state_counts().is_empty());
        assert!(analytics.region_counts().is_empty());
        assert!(analytics.state_shares().is_empty());
        assert!(analytics.mean_usage_by_region().is_empty());
        assert!(analytics.top_states(10).is_empty());
        assert!(analytics.usage_statistics().is_none());
        assert!(analytics.histogram(20).bins.is_empty());
        assert!(analytics.box_plots(BoxGrouping::SuppliedRegion).is_empty());
        assert!(analytics.usage_gauge(&[]).is_none());
    }

    #[test]
    fn test_histogram_bins() {
        let hist = Histogram::from_values(&[0.0, 1.0, 2.0, 3.0, 4.0, 10.0], 5);
        assert_eq!(hist.bins.len(), 5);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 6);
        assert_eq!(hist.bins[0].count, 2);
        assert_eq!(hist.bins[4].count, 1);
        assert_eq!(hist.bins[4].upper, 10.0);

        let flat = Histogram::from_values(&[5.0, 5.0], 20);
        assert_eq!(flat.bins.len(), 1);
        assert_eq!(flat.bins[0].count, 2);
    }

    #[test]
    fn test_box_plot_whiskers_and_outliers() {
        let plot = BoxPlot::from_values("South", &[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(plot.q1, 2.0);
        assert_eq!(plot.median, 3.0);
        assert_eq!(plot.q3, 4.0);
        assert_eq!(plot.lower_whisker, 1.0);
        assert_eq!(plot.upper_whisker, 4.0);
        assert_eq!(plot.outliers, vec![100.0]);
    }

    #[test]
    fn test_box_plots_group_by_supplied_region() {
        let rows = normalized(&[
            ("NY", "Northeast", "Cardiology", Some(10.0)),
            ("CA", "Northeast", "Cardiology", Some(20.0)),
            ("TX", "South", "Cardiology", Some(30.0)),
        ]);
        let plots = ProviderAnalytics::new(&rows).box_plots(BoxGrouping::SuppliedRegion);

        let groups: Vec<_> = plots.iter().map(|p| p.group.as_str()).collect();
        assert_eq!(groups, vec!["Northeast", "South"]);
        assert_eq!(plots[0].count, 2);
    }

    #[test]
    fn test_usage_gauge() {
        let upload = vec![
            ProviderRecord::new("1", "Cardiology", "NY", "Northeast", Some(40.0)),
            ProviderRecord::new("2", "Pediatrics", "CA", "West", Some(60.0)),
        ];
        let gauge = UsageGauge::new(40.0, &upload).unwrap();

        assert_eq!(gauge.reference, 50.0);
        assert_eq!(gauge.delta, -10.0);
        assert_eq!(gauge.axis_max, 72.0);
        assert_eq!(gauge.bands.len(), 3);
        assert_eq!(gauge.bands[0].to, 35.0);
    }

    #[test]
    fn test_overview_counts_raw_states() {
        let providers = vec![
            ProviderRecord::new("1", "Cardiology", "NY", "Northeast", Some(10.0)),
            ProviderRecord::new("2", "Cardiology", "New York", "Northeast", None),
            ProviderRecord::new("3", "Cardiology", "NY", "Northeast", Some(20.0)),
        ];
        let overview = DatasetOverview::from_providers(&providers);

        assert_eq!(overview.total_providers, 3);
        assert_eq!(overview.states_represented, 2);
        assert_eq!(overview.average_usage, Some(15.0));
    }
}
