/*!
 * Static reference tables for US states and census regions
 *
 * Two process-wide, read-only mappings: state code ↔ state name (50 states
 * plus DC) and region → member state codes. The four region member sets are
 * pairwise disjoint and together cover every code in the state table.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// State Code (50 US states plus the District of Columbia)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateCode {
    AK, AL, AR, AZ, CA, CO, CT, DC, DE, FL, GA, HI, IA, ID, IL, IN, KS, KY, LA, MA, MD, ME, MI, MN, MO, MS, MT, NC, ND, NE, NH, NJ, NM, NV, NY, OH, OK, OR, PA, RI, SC, SD, TN, TX, UT, VA, VT, WA, WI, WV, WY,
}

/// One row of the state table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEntry {
    pub code: StateCode,
    pub abbreviation: &'static str,
    pub name: &'static str,
}

const fn row(code: StateCode, abbreviation: &'static str, name: &'static str) -> StateEntry {
    StateEntry { code, abbreviation, name }
}

/// Code ↔ display name table
pub static STATES: [StateEntry; 51] = {
    use StateCode::*;
    [
        row(AL, "AL", "Alabama"), row(AK, "AK", "Alaska"), row(AZ, "AZ", "Arizona"),
        row(AR, "AR", "Arkansas"), row(CA, "CA", "California"), row(CO, "CO", "Colorado"),
        row(CT, "CT", "Connecticut"), row(DE, "DE", "Delaware"), row(FL, "FL", "Florida"),
        row(GA, "GA", "Georgia"), row(HI, "HI", "Hawaii"), row(ID, "ID", "Idaho"),
        row(IL, "IL", "Illinois"), row(IN, "IN", "Indiana"), row(IA, "IA", "Iowa"),
        row(KS, "KS", "Kansas"), row(KY, "KY", "Kentucky"), row(LA, "LA", "Louisiana"),
        row(ME, "ME", "Maine"), row(MD, "MD", "Maryland"), row(MA, "MA", "Massachusetts"),
        row(MI, "MI", "Michigan"), row(MN, "MN", "Minnesota"), row(MS, "MS", "Mississippi"),
        row(MO, "MO", "Missouri"), row(MT, "MT", "Montana"), row(NE, "NE", "Nebraska"),
        row(NV, "NV", "Nevada"), row(NH, "NH", "New Hampshire"), row(NJ, "NJ", "New Jersey"),
        row(NM, "NM", "New Mexico"), row(NY, "NY", "New York"), row(NC, "NC", "North Carolina"),
        row(ND, "ND", "North Dakota"), row(OH, "OH", "Ohio"), row(OK, "OK", "Oklahoma"),
        row(OR, "OR", "Oregon"), row(PA, "PA", "Pennsylvania"), row(RI, "RI", "Rhode Island"),
        row(SC, "SC", "South Carolina"), row(SD, "SD", "South Dakota"), row(TN, "TN", "Tennessee"),
        row(TX, "TX", "Texas"), row(UT, "UT", "Utah"), row(VT, "VT", "Vermont"),
        row(VA, "VA", "Virginia"), row(WA, "WA", "Washington"), row(WV, "WV", "West Virginia"),
        row(WI, "WI", "Wisconsin"), row(WY, "WY", "Wyoming"), row(DC, "DC", "District of Columbia"),
    ]
};

impl StateCode {
    /// Exact, case-sensitive lookup of a two-letter code
    pub fn from_code(code: &str) -> Option<Self> {
        STATES.iter().find(|e| e.abbreviation == code).map(|e| e.code)
    }

    /// Exact, case-sensitive lookup of a full state name
    pub fn from_name(name: &str) -> Option<Self> {
        STATES.iter().find(|e| e.name == name).map(|e| e.code)
    }

    fn entry(&self) -> &'static StateEntry {
        // every variant has exactly one row in STATES
        STATES.iter().find(|e| e.code == *self).unwrap_or(&STATES[0])
    }

    pub fn as_code(&self) -> &'static str {
        self.entry().abbreviation
    }

    /// Display name, e.g. "New York"
    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    /// Region this state belongs to
    pub fn region(&self) -> Region {
        REGIONS
            .iter()
            .find(|def| def.members.contains(self))
            .map(|def| def.region)
            .unwrap_or(Region::Unknown)
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Resolved region derived from a state code
///
/// Variants are declared alphabetically so the derived `Ord` matches name order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Midwest,
    Northeast,
    South,
    Unknown,
    West,
}

impl Region {
    /// The four known regions, in table order
    pub fn known() -> [Region; 4] {
        [Region::Northeast, Region::Midwest, Region::South, Region::West]
    }

    /// Parse one of the four known region names (exact match)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::known().into_iter().find(|r| r.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Northeast => "Northeast",
            Region::Midwest => "Midwest",
            Region::South => "South",
            Region::West => "West",
            Region::Unknown => "Unknown",
        }
    }

    /// Member state codes; empty for `Unknown`
    pub fn members(&self) -> &'static [StateCode] {
        REGIONS
            .iter()
            .find(|def| def.region == *self)
            .map(|def| def.members)
            .unwrap_or(&[])
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Region name paired with its member states
#[derive(Debug, Clone, Copy)]
pub struct RegionDefinition {
    pub region: Region,
    pub members: &'static [StateCode],
}

/// Region → member state codes
pub static REGIONS: [RegionDefinition; 4] = {
    use StateCode::*;
    [
        RegionDefinition {
            region: Region::Northeast,
            members: &[ME, NH, VT, MA, RI, CT, NY, NJ, PA],
        },
        RegionDefinition {
            region: Region::Midwest,
            members: &[OH, MI, IN, IL, WI, MN, IA, MO, ND, SD, NE, KS],
        },
        RegionDefinition {
            region: Region::South,
            members: &[DE, MD, DC, VA, WV, NC, SC, GA, FL, KY, TN, AL, MS, AR, LA, OK, TX],
        },
        RegionDefinition {
            region: Region::West,
            members: &[MT, ID, WY, CO, NM, AZ, UT, NV, WA, OR, CA, AK, HI],
        },
    ]
};

/// Display name for a code, or `None` when the code is not in the table
pub fn name_for_code(code: &str) -> Option<&'static str> {
    StateCode::from_code(code).map(|s| s.name())
}

/// Code for a full state name, or `None` when the name is not in the table
pub fn code_for_name(name: &str) -> Option<&'static str> {
    StateCode::from_name(name).map(|s| s.as_code())
}

/// Region for a resolved code string; `Unknown` if it matches no region
pub fn region_for_code(code: &str) -> Region {
    StateCode::from_code(code)
        .map(|s| s.region())
        .unwrap_or(Region::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_code_name_round_trip() {
        for state in &STATES {
            let name = name_for_code(state.abbreviation).unwrap();
            assert_eq!(code_for_name(name), Some(state.abbreviation));
            assert_eq!(state.code.as_code(), state.abbreviation);
        }
    }

    #[test]
    fn test_regions_partition_states() {
        let mut seen = HashSet::new();
        for def in &REGIONS {
            for code in def.members {
                assert!(seen.insert(*code), "{} appears in two regions", code);
            }
        }
        let all: HashSet<_> = STATES.iter().map(|s| s.code).collect();
        assert_eq!(seen, all);
        assert_eq!(all.len(), 51);
    }

    #[test]
    fn test_lookups() {
        assert_eq!(name_for_code("NY"), Some("New York"));
        assert_eq!(name_for_code("NM"), Some("New Mexico"));
        assert_eq!(name_for_code("ny"), None);
        assert_eq!(code_for_name("District of Columbia"), Some("DC"));
        assert_eq!(region_for_code("NY"), Region::Northeast);
        assert_eq!(region_for_code("CA"), Region::West);
        assert_eq!(region_for_code("PR"), Region::Unknown);
    }

    #[test]
    fn test_region_names() {
        assert_eq!(Region::from_name("South"), Some(Region::South));
        assert_eq!(Region::from_name("Unknown"), None);
        assert!(Region::Unknown.members().is_empty());
        assert_eq!(Region::Midwest.members().len(), 12);
    }
}
