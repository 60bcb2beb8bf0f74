/*!
 * Data type definitions for uploaded provider rows
 *
 * A `ProviderRecord` is one row of the upload exactly as supplied. A
 * `NormalizedRecord` adds the state code, display name, and region resolved
 * through the reference tables.
 */

use serde::{Deserialize, Serialize};

use crate::reference::Region;

/// NPI (National Provider Identifier)
///
/// Treated as an opaque string: the upload is not validated beyond column
/// presence, so a malformed NPI is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Npi(pub String);

impl Npi {
    pub fn new<S: Into<String>>(npi: S) -> Self {
        Npi(npi.into())
    }

    /// Get the NPI as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier has the standard 10-digit shape
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 10 && self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl std::fmt::Display for Npi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One provider row as uploaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub npi: Npi,
    /// Medical specialty (`Speciality` column)
    pub specialty: String,
    /// State code or full state name, as supplied
    pub state: String,
    /// Region as supplied; not trusted for charting
    pub region: String,
    /// `Usage Time (mins)`; `None` when the cell is blank
    pub usage_minutes: Option<f64>,
}

impl ProviderRecord {
    pub fn new(
        npi: impl Into<String>,
        specialty: impl Into<String>,
        state: impl Into<String>,
        region: impl Into<String>,
        usage_minutes: Option<f64>,
    ) -> Self {
        Self {
            npi: Npi::new(npi),
            specialty: specialty.into(),
            state: state.into(),
            region: region.into(),
            usage_minutes,
        }
    }
}

/// How the `State` column is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateForm {
    /// Two-letter codes such as "NY"
    Code,
    /// Full names such as "New York"
    FullName,
}

impl StateForm {
    /// Length heuristic: more than two characters means a full name
    pub fn detect(value: &str) -> Self {
        if value.chars().count() > 2 {
            StateForm::FullName
        } else {
            StateForm::Code
        }
    }
}

/// Provider row with resolved state and region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(flatten)]
    pub provider: ProviderRecord,
    /// Canonical code, or the raw value if it could not be mapped
    pub state_code: String,
    /// Display name, or the code itself if unmapped
    pub state_name: String,
    /// Region from the reference table, `Unknown` if the code matches none
    pub mapped_region: Region,
}

impl NormalizedRecord {
    pub fn usage_minutes(&self) -> Option<f64> {
        self.provider.usage_minutes
    }
}
