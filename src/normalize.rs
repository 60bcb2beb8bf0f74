/*!
 * State normalization
 *
 * Resolves each row's `State` value (code or full name) to a canonical code,
 * a display name, and a region through the reference tables. Unmappable
 * values fall through unchanged and land in the `Unknown` region; the only
 * rows removed are those whose state is blank.
 */

use std::collections::HashSet;

use log::debug;

use crate::{
    config::StateFormDetection,
    data_types::{NormalizedRecord, ProviderRecord, StateForm},
    reference::{self, Region},
};

/// State normalizer over a filtered table
#[derive(Debug, Clone, Copy, Default)]
pub struct StateNormalizer {
    detection: StateFormDetection,
}

impl StateNormalizer {
    pub fn new(detection: StateFormDetection) -> Self {
        Self { detection }
    }

    /// Normalize a table of provider rows.
    ///
    /// With `FirstRow` detection the first row's value length decides the
    /// form for the whole table, so a table mixing codes and full names is
    /// only partly resolved.
    pub fn normalize<'a, I>(&self, records: I) -> Vec<NormalizedRecord>
    where
        I: IntoIterator<Item = &'a ProviderRecord>,
    {
        let records: Vec<&ProviderRecord> = records.into_iter().collect();
        let Some(first) = records.first().copied() else {
            return Vec::new();
        };

        let valid_states: HashSet<&str> = records
            .iter()
            .copied()
            .map(|r| r.state.as_str())
            .filter(|s| !s.is_empty())
            .collect();

        let table_form = StateForm::detect(&first.state);
        debug!(
            "Normalizing {} rows ({} distinct states, {:?} form by first row)",
            records.len(),
            valid_states.len(),
            table_form
        );

        records
            .into_iter()
            .filter_map(|record| {
                let form = match self.detection {
                    StateFormDetection::FirstRow => table_form,
                    StateFormDetection::PerRow => StateForm::detect(&record.state),
                };
                let state_code = resolve_code(&record.state, form);

                let keep = valid_states.contains(state_code.as_str())
                    || valid_states.contains(record.state.as_str());
                if !keep {
                    return None;
                }

                let state_name = reference::name_for_code(&state_code)
                    .map(str::to_string)
                    .unwrap_or_else(|| state_code.clone());
                let mapped_region = reference::region_for_code(&state_code);

                Some(NormalizedRecord {
                    provider: record.clone(),
                    state_code,
                    state_name,
                    mapped_region,
                })
            })
            .collect()
    }
}

/// Canonical code for a raw value in the given form, identity if unmapped
fn resolve_code(raw: &str, form: StateForm) -> String {
    match form {
        StateForm::FullName => reference::code_for_name(raw)
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string()),
        StateForm::Code => raw.to_string(),
    }
}

/// Whether every resolved region agrees with the reference table
pub fn regions_consistent(records: &[NormalizedRecord]) -> bool {
    records.iter().all(|r| {
        r.mapped_region == Region::Unknown
            || r.mapped_region
                .members()
                .iter()
                .any(|code| code.as_code() == r.state_code)
    })
}
