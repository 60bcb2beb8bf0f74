/*!
 * Schema definition for provider uploads
 *
 * The upload must carry five named columns. Their order is free and extra
 * columns are ignored; only presence is checked.
 */

use crate::FinderError;

/// Column names as they appear in the upload header
pub mod columns {
    pub const NPI: &str = "NPI";
    /// Spelling matches the source data; do not correct it
    pub const SPECIALITY: &str = "Speciality";
    pub const STATE: &str = "State";
    pub const REGION: &str = "Region";
    pub const USAGE_TIME: &str = "Usage Time (mins)";

    /// Columns appended to exports by normalization
    pub const STATE_CODE: &str = "StateCode";
    pub const STATE_NAME: &str = "StateName";
    pub const MAPPED_REGION: &str = "MappedRegion";
}

/// Provider upload schema
pub struct ProviderSchema;

/// Position of each required column in the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub npi: usize,
    pub specialty: usize,
    pub state: usize,
    pub region: usize,
    pub usage_time: usize,
}

impl ProviderSchema {
    /// Required column names in canonical order
    pub fn column_names() -> Vec<&'static str> {
        vec![
            columns::NPI,
            columns::SPECIALITY,
            columns::STATE,
            columns::REGION,
            columns::USAGE_TIME,
        ]
    }

    /// Header row written by the CSV and Excel exporters
    pub fn export_column_names() -> Vec<&'static str> {
        let mut names = Self::column_names();
        names.extend([columns::STATE_CODE, columns::STATE_NAME, columns::MAPPED_REGION]);
        names
    }

    pub fn column_count() -> usize {
        5
    }

    /// Check that every required column is present and locate it.
    ///
    /// Header cells are compared after trimming surrounding whitespace.
    pub fn validate_headers(headers: &[String]) -> Result<ColumnIndex, FinderError> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<String> = Self::column_names()
            .into_iter()
            .filter(|name| position(name).is_none())
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            return Err(FinderError::missing_columns(missing, headers));
        }

        // presence was checked above
        let find = |name: &str| position(name).unwrap_or_default();

        Ok(ColumnIndex {
            npi: find(columns::NPI),
            specialty: find(columns::SPECIALITY),
            state: find(columns::STATE),
            region: find(columns::REGION),
            usage_time: find(columns::USAGE_TIME),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_validate_headers_any_order() {
        let idx = ProviderSchema::validate_headers(&headers(&[
            "Region", "Extra", "Usage Time (mins)", "State", " NPI ", "Speciality",
        ]))
        .unwrap();

        assert_eq!(idx.region, 0);
        assert_eq!(idx.usage_time, 2);
        assert_eq!(idx.state, 3);
        assert_eq!(idx.npi, 4);
        assert_eq!(idx.specialty, 5);
    }

    #[test]
    fn test_validate_headers_reports_missing() {
        let err = ProviderSchema::validate_headers(&headers(&["NPI", "Specialty", "State"]))
            .unwrap_err();

        match err {
            FinderError::SchemaMismatch { missing_columns, .. } => {
                assert_eq!(missing_columns, vec!["Speciality", "Region", "Usage Time (mins)"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_export_columns() {
        assert_eq!(ProviderSchema::column_count(), ProviderSchema::column_names().len());
        assert_eq!(ProviderSchema::export_column_names().len(), 8);
    }
}
