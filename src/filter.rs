/*!
 * Filter stage: specialty and region selection
 *
 * Narrows the uploaded table to one specialty and, optionally, one region.
 * Both filters are exact string equality. By default the region filter
 * compares against the `Region` column as uploaded, not the region derived
 * from the state code.
 */

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    Result, FinderError,
    data_types::{NormalizedRecord, ProviderRecord},
};

/// Region dropdown value meaning "no region filter"
pub const ALL_REGIONS: &str = "All Regions";

/// A user's filter choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub specialty: String,
    pub region: Option<String>,
}

impl Selection {
    /// Build a selection from dropdown values.
    ///
    /// A blank specialty is rejected. A blank region or the
    /// `"All Regions"` sentinel means no region filter.
    pub fn new<S: Into<String>>(specialty: S, region: Option<&str>) -> Result<Self> {
        let specialty = specialty.into();
        if specialty.trim().is_empty() {
            return Err(FinderError::missing_specialty());
        }

        let region = region
            .filter(|r| !r.trim().is_empty() && *r != ALL_REGIONS)
            .map(str::to_string);

        Ok(Self { specialty, region })
    }

    pub fn specialty_only<S: Into<String>>(specialty: S) -> Result<Self> {
        Self::new(specialty, None)
    }

    pub fn has_region(&self) -> bool {
        self.region.is_some()
    }

    /// Report heading for this selection
    pub fn heading(&self) -> String {
        match &self.region {
            Some(region) => format!("{} Providers in {} Region", self.specialty, region),
            None => format!("{} Providers Across All Regions", self.specialty),
        }
    }

    /// File stem shared by all exports, e.g. `Cardiology__Northeast`
    pub fn file_stem(&self) -> String {
        let region_part = self
            .region
            .as_ref()
            .map(|r| format!("_{}", r))
            .unwrap_or_default();
        format!("{}_{}", self.specialty, region_part)
    }
}

/// Dropdown choices offered for an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Distinct specialties, sorted
    pub specialties: Vec<String>,
    /// `"All Regions"` followed by the distinct supplied regions, sorted
    pub regions: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[ProviderRecord]) -> Self {
        let specialties: BTreeSet<&str> = records.iter().map(|r| r.specialty.as_str()).collect();
        let regions: BTreeSet<&str> = records.iter().map(|r| r.region.as_str()).collect();

        Self {
            specialties: specialties.into_iter().map(str::to_string).collect(),
            regions: std::iter::once(ALL_REGIONS)
                .chain(regions)
                .map(str::to_string)
                .collect(),
        }
    }

    /// The specialty preselected when nothing has been chosen yet
    pub fn default_specialty(&self) -> Option<&str> {
        self.specialties.first().map(String::as_str)
    }
}

/// Query builder over uploaded provider rows
pub struct ProviderQuery<'a> {
    records: &'a [ProviderRecord],
    filters: Vec<Box<dyn Fn(&ProviderRecord) -> bool + 'a>>,
}

impl<'a> ProviderQuery<'a> {
    /// Create a new query builder
    pub fn new(records: &'a [ProviderRecord]) -> Self {
        Self {
            records,
            filters: Vec::new(),
        }
    }

    /// Filter by exact specialty
    pub fn specialty<S: AsRef<str> + 'a>(mut self, specialty: S) -> Self {
        self.filters.push(Box::new(move |p| p.specialty == specialty.as_ref()));
        self
    }

    /// Filter by exact supplied region
    pub fn region<S: AsRef<str> + 'a>(mut self, region: S) -> Self {
        self.filters.push(Box::new(move |p| p.region == region.as_ref()));
        self
    }

    /// Filter by exact raw state value
    pub fn state<S: AsRef<str> + 'a>(mut self, state: S) -> Self {
        self.filters.push(Box::new(move |p| p.state == state.as_ref()));
        self
    }

    /// Apply a selection against the supplied columns
    pub fn selection(self, selection: &'a Selection) -> Self {
        let query = self.specialty(selection.specialty.as_str());
        match &selection.region {
            Some(region) => query.region(region.as_str()),
            None => query,
        }
    }

    /// Execute the query and return matching rows
    pub fn execute(self) -> Vec<&'a ProviderRecord> {
        self.records
            .iter()
            .filter(|provider| self.filters.iter().all(|filter| filter(provider)))
            .collect()
    }

    /// Execute the query and return owned copies of the matching rows
    pub fn collect_owned(self) -> Vec<ProviderRecord> {
        self.execute().into_iter().cloned().collect()
    }

    /// Execute the query and return count only
    pub fn count(self) -> usize {
        self.execute().len()
    }
}

/// Keep normalized rows whose derived region matches `region` by name
pub fn filter_by_resolved_region(records: Vec<NormalizedRecord>, region: &str) -> Vec<NormalizedRecord> {
    records
        .into_iter()
        .filter(|r| r.mapped_region.as_str() == region)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ProviderRecord> {
        vec![
            ProviderRecord::new("1", "Cardiology", "NY", "Northeast", Some(45.2)),
            ProviderRecord::new("2", "Pediatrics", "CA", "West", Some(32.7)),
            ProviderRecord::new("3", "Cardiology", "TX", "South", Some(58.1)),
            ProviderRecord::new("4", "Cardiology", "FL", "South", Some(41.5)),
            ProviderRecord::new("5", "Neurology", "IL", "Midwest", Some(37.8)),
        ]
    }

    #[test]
    fn test_specialty_filter_ignores_region() {
        let records = sample();
        let selection = Selection::specialty_only("Cardiology").unwrap();
        let rows = ProviderQuery::new(&records).selection(&selection).execute();

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.specialty == "Cardiology"));
    }

    #[test]
    fn test_region_filter_uses_supplied_column() {
        let records = sample();
        let selection = Selection::new("Cardiology", Some("South")).unwrap();
        let rows = ProviderQuery::new(&records).selection(&selection).execute();

        let npis: Vec<_> = rows.iter().map(|r| r.npi.as_str()).collect();
        assert_eq!(npis, vec!["3", "4"]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let records = sample();
        let selection = Selection::specialty_only("Dermatology").unwrap();
        assert_eq!(ProviderQuery::new(&records).selection(&selection).count(), 0);
    }

    #[test]
    fn test_selection_sentinel_and_blank_specialty() {
        let selection = Selection::new("Cardiology", Some(ALL_REGIONS)).unwrap();
        assert!(!selection.has_region());
        assert_eq!(selection.heading(), "Cardiology Providers Across All Regions");
        assert_eq!(selection.file_stem(), "Cardiology_");

        let selection = Selection::new("Cardiology", Some("West")).unwrap();
        assert_eq!(selection.heading(), "Cardiology Providers in West Region");
        assert_eq!(selection.file_stem(), "Cardiology__West");

        assert!(matches!(
            Selection::new("  ", None),
            Err(FinderError::MissingSelection { .. })
        ));
    }

    #[test]
    fn test_filter_options() {
        let options = FilterOptions::from_records(&sample());
        assert_eq!(options.specialties, vec!["Cardiology", "Neurology", "Pediatrics"]);
        assert_eq!(
            options.regions,
            vec!["All Regions", "Midwest", "Northeast", "South", "West"]
        );
        assert_eq!(options.default_specialty(), Some("Cardiology"));
    }
}
