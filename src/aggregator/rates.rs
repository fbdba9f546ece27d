//! Population-normalized rates.

use super::hierarchy::StagedHierarchy;
use crate::utils::config::RATE_SCALE;
use log::debug;

/// Cases per 100 000 inhabitants
///
/// An area without inhabitants has rate zero rather than NaN or infinity,
/// so every consumer can treat the rate as an ordinary number.
pub fn rate_per_100k(total: u64, population: u64) -> f64 {
    if population == 0 {
        return 0.0;
    }
    total as f64 * RATE_SCALE / population as f64
}

/// Fill in the rate of every case state on every staged area
///
/// Must run after linking, once totals are final.
pub(crate) fn normalize_rates(hierarchy: &mut StagedHierarchy) {
    let mut areas = 0usize;
    for area in hierarchy.areas_mut() {
        area.rates = area
            .totals
            .iter()
            .map(|(case_state, total)| (*case_state, rate_per_100k(*total, area.population)))
            .collect();
        areas += 1;
    }
    debug!("Normalized rates for {} areas", areas);
}
