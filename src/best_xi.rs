use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cohort::{PositionCategory, eligibility_cohort};
use crate::composite::composite_score;
use crate::error::ScoringError;
use crate::player_dataset::PlayerDataset;
use crate::scoring_config::{ScoringConfig, ScoringProfile};

const LOG_TARGET: &str = "pl_tots::best_xi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    GK,
    CB1,
    CB2,
    RB,
    LB,
    CM1,
    CM2,
    RW,
    CAM,
    LW,
    ST,
}

impl Slot {
    pub fn label(self) -> &'static str {
        match self {
            Slot::GK => "GK",
            Slot::CB1 => "CB1",
            Slot::CB2 => "CB2",
            Slot::RB => "RB",
            Slot::LB => "LB",
            Slot::CM1 => "CM1",
            Slot::CM2 => "CM2",
            Slot::RW => "RW",
            Slot::CAM => "CAM",
            Slot::LW => "LW",
            Slot::ST => "ST",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedPlayer {
    pub index: usize,
    pub name: String,
    pub club: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileRanking {
    pub profile: String,
    pub category: PositionCategory,
    pub entries: Vec<RankedPlayer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotAssignment {
    pub slot: Slot,
    pub group: String,
    pub profile: String,
    pub player: usize,
    pub name: String,
    pub club: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestXi {
    pub slots: Vec<SlotAssignment>,
    pub rankings: Vec<ProfileRanking>,
}

impl BestXi {
    pub fn get(&self, slot: Slot) -> Option<&SlotAssignment> {
        self.slots.iter().find(|s| s.slot == slot)
    }

    pub fn player_indices(&self) -> Vec<usize> {
        self.slots.iter().map(|s| s.player).collect()
    }

    pub fn ranking(&self, profile_key: &str) -> Option<&ProfileRanking> {
        self.rankings.iter().find(|r| r.profile == profile_key)
    }
}

/// Every eligible player of the profile's position, best score first. Equal scores keep
/// dataset order. Players with no values for any profile metric are left out.
pub fn rank_profile(
    dataset: &PlayerDataset,
    config: &ScoringConfig,
    profile: &ScoringProfile,
) -> Result<Vec<RankedPlayer>, ScoringError> {
    let cohort = eligibility_cohort(dataset, profile.category, config.eligibility_minutes);

    let scored: Vec<Result<RankedPlayer, ScoringError>> = cohort
        .indices()
        .par_iter()
        .map(|&idx| {
            let score = composite_score(&cohort, idx, profile)?;
            let player = &dataset.players()[idx];
            Ok(RankedPlayer {
                index: idx,
                name: player.name.clone(),
                club: player.club.clone(),
                score: score.value,
            })
        })
        .collect();

    let mut ranked = Vec::with_capacity(scored.len());
    for entry in scored {
        match entry {
            Ok(entry) => ranked.push(entry),
            Err(ScoringError::MissingPlayerValues { profile, player }) => {
                log::warn!(target: LOG_TARGET, "{profile}: leaving out {player} (no values)");
            }
            Err(err) => return Err(err),
        }
    }
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(ranked)
}

pub fn rank_all(
    dataset: &PlayerDataset,
    config: &ScoringConfig,
) -> Result<Vec<ProfileRanking>, ScoringError> {
    config
        .profiles
        .iter()
        .map(|profile| {
            Ok(ProfileRanking {
                profile: profile.key(),
                category: profile.category,
                entries: rank_profile(dataset, config, profile)?,
            })
        })
        .collect()
}

/// Fill the formation group by group from each group's profile ranking. A player already
/// placed by an earlier group is passed over for the next best. A group that cannot be
/// filled fails the whole selection.
pub fn select_best_xi(
    dataset: &PlayerDataset,
    config: &ScoringConfig,
) -> Result<BestXi, ScoringError> {
    config.validate()?;
    let rankings = rank_all(dataset, config)?;

    let mut assigned: HashSet<usize> = HashSet::with_capacity(config.slot_count());
    let mut slots = Vec::with_capacity(config.slot_count());

    for group in &config.formation {
        let profile = config.profile(group.category, &group.profile)?;
        let key = profile.key();
        let ranking = rankings
            .iter()
            .find(|r| r.profile == key)
            .ok_or_else(|| ScoringError::UnknownProfile(key.clone()))?;

        let needed = group.slots.len();
        let picks: Vec<&RankedPlayer> = ranking
            .entries
            .iter()
            .filter(|candidate| {
                let taken = assigned.contains(&candidate.index);
                if taken {
                    log::debug!(
                        target: LOG_TARGET,
                        "{}: skipping {} (already in the XI)",
                        group.label,
                        candidate.name
                    );
                }
                !taken
            })
            .take(needed)
            .collect();

        if picks.len() < needed {
            return Err(ScoringError::InsufficientCandidates {
                group: group.label.clone(),
                needed,
                available: picks.len(),
            });
        }

        for (slot, pick) in group.slots.iter().zip(picks) {
            assigned.insert(pick.index);
            slots.push(SlotAssignment {
                slot: *slot,
                group: group.label.clone(),
                profile: key.clone(),
                player: pick.index,
                name: pick.name.clone(),
                club: pick.club.clone(),
                score: pick.score,
            });
        }
    }

    log::info!(
        target: LOG_TARGET,
        "selected {} players from {} profile rankings",
        slots.len(),
        rankings.len()
    );

    Ok(BestXi { slots, rankings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player_dataset::PlayerRecord;
    use crate::scoring_config::SlotGroup;

    fn back_four_config() -> ScoringConfig {
        let def = ScoringProfile::new(PositionCategory::Defender, "def", &[("Tackles per90", 1.0)]);
        let att = ScoringProfile::new(PositionCategory::Defender, "att", &[("Assists per90", 1.0)]);
        ScoringConfig {
            eligibility_minutes: 2300,
            profiles: vec![def, att],
            formation: vec![
                SlotGroup {
                    label: "Defensive defenders".to_string(),
                    category: PositionCategory::Defender,
                    profile: "def".to_string(),
                    slots: vec![Slot::CB1, Slot::CB2],
                },
                SlotGroup {
                    label: "Attacking defenders".to_string(),
                    category: PositionCategory::Defender,
                    profile: "att".to_string(),
                    slots: vec![Slot::RB, Slot::LB],
                },
            ],
        }
    }

    fn defender(name: &str, tackles: f64, assists: f64) -> PlayerRecord {
        PlayerRecord::new(name, "Club", "ENG", "DEF", 2700)
            .with_metric("Tackles", tackles)
            .with_metric("Assists", assists)
    }

    #[test]
    fn later_group_skips_assigned_players() {
        // "Star" tops both rankings; the attacking group must move past them.
        let ds = PlayerDataset::from_players(vec![
            defender("Star", 90.0, 9.0),
            defender("Stopper", 80.0, 1.0),
            defender("Wingback", 10.0, 8.0),
            defender("Overlap", 20.0, 7.0),
            defender("Spare", 30.0, 2.0),
        ]);
        let xi = select_best_xi(&ds, &back_four_config()).unwrap();

        assert_eq!(xi.get(Slot::CB1).unwrap().name, "Star");
        assert_eq!(xi.get(Slot::CB2).unwrap().name, "Stopper");
        assert_eq!(xi.get(Slot::RB).unwrap().name, "Wingback");
        assert_eq!(xi.get(Slot::LB).unwrap().name, "Overlap");

        let att = xi.ranking("Defender_att").unwrap();
        assert_eq!(att.entries[0].name, "Star");
    }

    #[test]
    fn too_few_unassigned_candidates_fails() {
        let ds = PlayerDataset::from_players(vec![
            defender("A", 90.0, 9.0),
            defender("B", 80.0, 1.0),
            defender("C", 10.0, 8.0),
        ]);
        let err = select_best_xi(&ds, &back_four_config()).unwrap_err();
        match err {
            ScoringError::InsufficientCandidates {
                group,
                needed,
                available,
            } => {
                assert_eq!(group, "Attacking defenders");
                assert_eq!(needed, 2);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ties_keep_dataset_order() {
        let ds = PlayerDataset::from_players(vec![
            defender("First", 50.0, 1.0),
            defender("Second", 50.0, 1.0),
            defender("Third", 10.0, 1.0),
        ]);
        let config = back_four_config();
        let profile = config.profile(PositionCategory::Defender, "def").unwrap();
        let ranked = rank_profile(&ds, &config, profile).unwrap();
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[test]
    fn low_minutes_players_are_not_ranked() {
        let mut bench = defender("Bench", 99.0, 9.0);
        bench.minutes = 2300;
        let ds = PlayerDataset::from_players(vec![bench, defender("Regular", 10.0, 1.0)]);
        let config = back_four_config();
        let profile = config.profile(PositionCategory::Defender, "def").unwrap();
        let ranked = rank_profile(&ds, &config, profile).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "Regular");
    }
}
