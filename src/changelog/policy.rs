/*!
 * Full vs. incremental translation policy.
 *
 * Every change-detected run bumps a persisted cycle counter. Incremental
 * translation is used while a previous raw document exists, and a full
 * translation is forced once the counter reaches the configured interval so
 * drift from repeated incremental merges gets corrected.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a run translates the whole document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullReason {
    /// No previous raw document to diff against
    FirstRun,
    /// Cycle counter reached the full translation interval
    PeriodicMaintenance,
    /// Incremental extraction found nothing new
    ExtractionFallback,
    /// Requested from the command line
    Forced,
}

impl FullReason {
    pub fn description(&self) -> &'static str {
        match self {
            Self::FirstRun => "first run",
            Self::PeriodicMaintenance => "periodic maintenance",
            Self::ExtractionFallback => "extraction fallback",
            Self::Forced => "forced",
        }
    }
}

/// How much of the document a run translates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy", content = "reason")]
pub enum Strategy {
    /// Translate the (version-capped) document from scratch
    Full(FullReason),
    /// Translate only the newly added leading block
    Incremental,
}

impl Strategy {
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(reason) => write!(f, "full ({})", reason.description()),
            Self::Incremental => write!(f, "incremental"),
        }
    }
}

/// Outcome of the policy for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub strategy: Strategy,
    /// Counter value to persist when the run commits
    pub counter: u32,
}

/// Decide the strategy for a change-detected run.
///
/// A first run keeps the incremented counter; periodic maintenance resets it
/// to 0.
pub fn decide(has_previous_document: bool, counter: u32, full_translation_interval: u32) -> Decision {
    let counter = counter.saturating_add(1);

    if !has_previous_document {
        return Decision {
            strategy: Strategy::Full(FullReason::FirstRun),
            counter,
        };
    }

    if counter >= full_translation_interval {
        return Decision {
            strategy: Strategy::Full(FullReason::PeriodicMaintenance),
            counter: 0,
        };
    }

    Decision {
        strategy: Strategy::Incremental,
        counter,
    }
}

/// Same as [`decide`], except a forced run always translates in full and
/// resets the counter.
pub fn decide_with_override(
    has_previous_document: bool,
    counter: u32,
    full_translation_interval: u32,
    force_full: bool,
) -> Decision {
    let decision = decide(has_previous_document, counter, full_translation_interval);
    if force_full && !decision.strategy.is_full() {
        return Decision {
            strategy: Strategy::Full(FullReason::Forced),
            counter: 0,
        };
    }
    decision
}
