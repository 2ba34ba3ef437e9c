use serde::{Deserialize, Serialize};

use crate::error::NotAvailable;
use crate::percentile::{Direction, MetricColumn};
use crate::player_dataset::{PlayerDataset, PlayerRecord};

const LOG_TARGET: &str = "pl_tots::cohort";

pub const LOW_USAGE_MAX_MINUTES: u32 = 700;
pub const HIGH_USAGE_MIN_MINUTES: u32 = 1500;
/// Smaller usage-bucket cohorts fall back to the whole position group.
pub const MIN_COHORT_SIZE: usize = 5;
pub const BEST_XI_MIN_MINUTES: u32 = 2300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PositionCategory {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    Other,
}

impl PositionCategory {
    pub const RANKED: [PositionCategory; 4] = [
        PositionCategory::Goalkeeper,
        PositionCategory::Defender,
        PositionCategory::Midfielder,
        PositionCategory::Forward,
    ];

    /// Labels are multi-valued ("GKP/DEF"); the first matching tag in GKP, DEF, MID, FWD
    /// order wins.
    pub fn from_label(raw: &str) -> Self {
        let s = raw.to_ascii_uppercase();
        if s.contains("GKP") {
            PositionCategory::Goalkeeper
        } else if s.contains("DEF") {
            PositionCategory::Defender
        } else if s.contains("MID") {
            PositionCategory::Midfielder
        } else if s.contains("FWD") {
            PositionCategory::Forward
        } else {
            PositionCategory::Other
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim().to_ascii_lowercase();
        match s.as_str() {
            "goalkeeper" | "gk" | "gkp" => Some(PositionCategory::Goalkeeper),
            "defender" | "def" => Some(PositionCategory::Defender),
            "midfielder" | "mid" => Some(PositionCategory::Midfielder),
            "forward" | "fwd" | "st" => Some(PositionCategory::Forward),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PositionCategory::Goalkeeper => "Goalkeeper",
            PositionCategory::Defender => "Defender",
            PositionCategory::Midfielder => "Midfielder",
            PositionCategory::Forward => "Forward",
            PositionCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageBucket {
    Low,
    Medium,
    High,
}

impl UsageBucket {
    pub fn from_minutes(minutes: u32) -> Self {
        if minutes > HIGH_USAGE_MIN_MINUTES {
            UsageBucket::High
        } else if minutes >= LOW_USAGE_MAX_MINUTES {
            UsageBucket::Medium
        } else {
            UsageBucket::Low
        }
    }

    pub fn contains(self, minutes: u32) -> bool {
        UsageBucket::from_minutes(minutes) == self
    }

    pub fn description(self) -> &'static str {
        match self {
            UsageBucket::High => "High-usage (> 1500 min): compared with other regular starters",
            UsageBucket::Medium => "Medium-usage (700-1500 min): compared with other semi-regulars",
            UsageBucket::Low => "Low-usage (< 700 min): compared with other rotation players",
        }
    }
}

/// Comparison pool for percentiles. Members are dataset indices in dataset order.
#[derive(Debug, Clone)]
pub struct Cohort<'a> {
    dataset: &'a PlayerDataset,
    category: PositionCategory,
    bucket: Option<UsageBucket>,
    relaxed: bool,
    members: Vec<usize>,
}

impl<'a> Cohort<'a> {
    pub fn category(&self) -> PositionCategory {
        self.category
    }

    /// Bucket actually applied; `None` after relaxing or when none was requested.
    pub fn bucket(&self) -> Option<UsageBucket> {
        if self.relaxed { None } else { self.bucket }
    }

    /// True when the usage filter was dropped for being too small.
    pub fn relaxed(&self) -> bool {
        self.relaxed
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.members
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    pub fn members(&self) -> impl Iterator<Item = (usize, &'a PlayerRecord)> + '_ {
        let dataset = self.dataset;
        self.members
            .iter()
            .filter_map(move |&idx| dataset.player(idx).map(|p| (idx, p)))
    }

    pub fn dataset(&self) -> &'a PlayerDataset {
        self.dataset
    }

    /// Sorted numeric values of `metric` across members; members without a value are
    /// left out of the ranking.
    pub fn column(&self, metric: &str) -> Result<MetricColumn, NotAvailable> {
        if !self.dataset.has_column(metric) {
            return Err(NotAvailable::MissingMetric);
        }
        MetricColumn::new(self.members().filter_map(|(_, p)| p.metric(metric)))
    }

    pub fn percentile(
        &self,
        metric: &str,
        value: Option<f64>,
        direction: Direction,
    ) -> Result<u8, NotAvailable> {
        let column = self.column(metric)?;
        let value = value
            .filter(|v| v.is_finite())
            .ok_or(NotAvailable::NonNumeric)?;
        Ok(column.percentile(value, direction))
    }
}

pub fn select_cohort(
    dataset: &PlayerDataset,
    category: PositionCategory,
    bucket: Option<UsageBucket>,
) -> Cohort<'_> {
    let by_position: Vec<usize> = dataset
        .players()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.category() == category)
        .map(|(idx, _)| idx)
        .collect();

    let Some(bucket) = bucket else {
        return Cohort {
            dataset,
            category,
            bucket: None,
            relaxed: false,
            members: by_position,
        };
    };

    let in_bucket: Vec<usize> = by_position
        .iter()
        .copied()
        .filter(|&idx| {
            dataset
                .player(idx)
                .is_some_and(|p| bucket.contains(p.minutes))
        })
        .collect();

    if in_bucket.len() < MIN_COHORT_SIZE {
        log::debug!(
            target: LOG_TARGET,
            "{} {:?} cohort has {} players (< {}), using all {} {}s",
            category.label(),
            bucket,
            in_bucket.len(),
            MIN_COHORT_SIZE,
            by_position.len(),
            category.label().to_lowercase()
        );
        return Cohort {
            dataset,
            category,
            bucket: Some(bucket),
            relaxed: true,
            members: by_position,
        };
    }

    Cohort {
        dataset,
        category,
        bucket: Some(bucket),
        relaxed: false,
        members: in_bucket,
    }
}

/// Best-XI pool: players of `category` with strictly more than `min_minutes`.
pub fn eligibility_cohort(
    dataset: &PlayerDataset,
    category: PositionCategory,
    min_minutes: u32,
) -> Cohort<'_> {
    let members = dataset
        .players()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.category() == category && p.minutes > min_minutes)
        .map(|(idx, _)| idx)
        .collect();
    Cohort {
        dataset,
        category,
        bucket: None,
        relaxed: false,
        members,
    }
}

/// The cohort a player is judged against in the analysis and comparison views.
pub fn usage_cohort_for(dataset: &PlayerDataset, index: usize) -> Option<Cohort<'_>> {
    let player = dataset.player(index)?;
    Some(select_cohort(
        dataset,
        player.category(),
        Some(player.usage_bucket()),
    ))
}
