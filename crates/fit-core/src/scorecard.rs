//! Scorecard computation from wizard answers.
//!
//! - `integration_count`: number of selected systems across all categories.
//! - `goals_matched`: goals the platform has a packaged answer for.
//! - `compatibility_pct`: share of systems and data flows the platform
//!   supports out of the box (brands found in the catalog, protocols with a
//!   native connector).
//! - `complexity`: weighted by system count, realtime flows and protocol mix.

use std::collections::BTreeSet;

use crate::entities::{AssessmentData, ConfigSnapshot, Scorecard};
use crate::enums::ComplexityTier;

/// Goals with a packaged solution.
pub const SUPPORTED_GOALS: &[&str] = &[
    "reduce_downtime",
    "predictive_maintenance",
    "traceability",
    "energy_efficiency",
    "quality_control",
    "inventory_visibility",
    "production_planning",
    "remote_monitoring",
];

/// Protocols with a native connector.
pub const SUPPORTED_PROTOCOLS: &[&str] = &[
    "rest", "mqtt", "opc_ua", "modbus", "sftp", "file", "webhook", "odbc",
];

const LOW_COMPLEXITY_MAX: u32 = 4;
const MEDIUM_COMPLEXITY_MAX: u32 = 10;

/// Compute the scorecard for `data`.
///
/// With a catalog, only brands that resolve through
/// [`ConfigSnapshot::canonical_brand`] count as supported; without one,
/// every named brand does.
#[must_use]
pub fn compute(data: &AssessmentData, catalog: Option<&ConfigSnapshot>) -> Scorecard {
    let integration_count = u32::try_from(data.integrations.len()).unwrap_or(u32::MAX);

    let goals_matched = data
        .goals
        .iter()
        .filter(|goal| SUPPORTED_GOALS.contains(&goal.as_str()))
        .count();

    let supported_systems = data
        .integrations
        .all()
        .filter(|entry| !entry.brand.trim().is_empty())
        .filter(|entry| catalog.is_none_or(|c| c.canonical_brand(&entry.brand).is_some()))
        .count();

    let supported_patterns = data
        .patterns
        .iter()
        .filter(|p| SUPPORTED_PROTOCOLS.contains(&normalize_protocol(&p.protocol).as_str()))
        .count();

    let total = data.integrations.len() + data.patterns.len();
    let compatibility_pct = if total == 0 {
        0
    } else {
        let pct = (supported_systems + supported_patterns) * 100 / total;
        u8::try_from(pct.min(100)).unwrap_or(100)
    };

    Scorecard {
        compatibility_pct,
        integration_count,
        goals_matched: u32::try_from(goals_matched).unwrap_or(u32::MAX),
        complexity: complexity_tier(data),
    }
}

/// Return a copy of `data` with its scorecard recomputed.
#[must_use]
pub fn rescore(data: &AssessmentData, catalog: Option<&ConfigSnapshot>) -> AssessmentData {
    AssessmentData {
        scorecard: compute(data, catalog),
        ..data.clone()
    }
}

fn complexity_tier(data: &AssessmentData) -> ComplexityTier {
    let systems = u32::try_from(data.integrations.len()).unwrap_or(u32::MAX);
    let realtime = u32::try_from(data.patterns.iter().filter(|p| p.realtime).count())
        .unwrap_or(u32::MAX);
    let protocols: BTreeSet<String> = data
        .patterns
        .iter()
        .map(|p| normalize_protocol(&p.protocol))
        .collect();
    let protocol_count = u32::try_from(protocols.len()).unwrap_or(u32::MAX);

    let points = systems
        .saturating_add(realtime.saturating_mul(2))
        .saturating_add(protocol_count);

    match points {
        0..=LOW_COMPLEXITY_MAX => ComplexityTier::Low,
        p if p <= MEDIUM_COMPLEXITY_MAX => ComplexityTier::Medium,
        _ => ComplexityTier::High,
    }
}

fn normalize_protocol(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['-', ' '], "_")
}
