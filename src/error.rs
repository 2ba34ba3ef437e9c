use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::cohort::PositionCategory;

/// Why a percentile could not be produced. Never fatal: display code shows "N/A" and
/// composite scoring drops the metric from both sides of the weighted mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotAvailable {
    MissingMetric,
    NonNumeric,
    EmptyCohort,
}

impl fmt::Display for NotAvailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            NotAvailable::MissingMetric => "metric not in dataset",
            NotAvailable::NonNumeric => "no numeric value",
            NotAvailable::EmptyCohort => "no comparable players",
        };
        write!(f, "N/A ({reason})")
    }
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("profile {profile} has no applicable metrics for the {category:?} cohort")]
    NoApplicableMetrics {
        profile: String,
        category: PositionCategory,
    },

    #[error("{player} has no values for any {profile} metric")]
    MissingPlayerValues { profile: String, player: String },

    #[error("insufficient eligible players for {group}: need {needed}, found {available}")]
    InsufficientCandidates {
        group: String,
        needed: usize,
        available: usize,
    },

    #[error("no player at dataset row {0}")]
    UnknownPlayer(usize),

    #[error("unknown scoring profile: {0}")]
    UnknownProfile(String),

    #[error("profile {profile} has invalid weight {weight} for {metric}")]
    InvalidWeight {
        profile: String,
        metric: String,
        weight: f64,
    },

    #[error("cannot compare a {left:?} with a {right:?}")]
    PositionMismatch {
        left: PositionCategory,
        right: PositionCategory,
    },
}
