use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use crate::cohort::{PositionCategory, UsageBucket};
use crate::per90::{is_per90_metric, per90, per90_name};

const LOG_TARGET: &str = "pl_tots::dataset";

pub const NAME_COLUMN: &str = "Player Name";
pub const CLUB_COLUMN: &str = "Club";
pub const NATIONALITY_COLUMN: &str = "Nationality";
pub const POSITION_COLUMN: &str = "Position";
pub const MINUTES_COLUMN: &str = "Minutes";

const IDENTITY_COLUMNS: [&str; 5] = [
    NAME_COLUMN,
    CLUB_COLUMN,
    NATIONALITY_COLUMN,
    POSITION_COLUMN,
    MINUTES_COLUMN,
];

/// One player's season line. Only finite numeric cells make it into `metrics`; anything
/// else reads back as `None`.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerRecord {
    pub name: String,
    pub club: String,
    pub nationality: String,
    pub position: String,
    pub minutes: u32,
    pub metrics: HashMap<String, f64>,
}

impl PlayerRecord {
    pub fn new(
        name: impl Into<String>,
        club: impl Into<String>,
        nationality: impl Into<String>,
        position: impl Into<String>,
        minutes: u32,
    ) -> Self {
        Self {
            name: name.into(),
            club: club.into(),
            nationality: nationality.into(),
            position: position.into(),
            minutes,
            metrics: HashMap::new(),
        }
    }

    pub fn with_metric(mut self, metric: &str, value: f64) -> Self {
        if value.is_finite() {
            self.metrics.insert(metric.to_string(), value);
        }
        self
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn category(&self) -> PositionCategory {
        PositionCategory::from_label(&self.position)
    }

    pub fn usage_bucket(&self) -> UsageBucket {
        UsageBucket::from_minutes(self.minutes)
    }
}

/// Immutable season snapshot. Per-90 companions of the allowlisted counting stats are
/// derived once here; nothing downstream mutates records.
#[derive(Debug, Clone, Default)]
pub struct PlayerDataset {
    columns: BTreeSet<String>,
    players: Vec<PlayerRecord>,
}

impl PlayerDataset {
    pub fn new<I, S>(columns: I, mut players: Vec<PlayerRecord>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns: BTreeSet<String> = columns.into_iter().map(Into::into).collect();
        let rate_sources: Vec<String> = columns
            .iter()
            .filter(|c| is_per90_metric(c))
            .cloned()
            .collect();

        for player in &mut players {
            player.metrics.retain(|_, v| v.is_finite());
            for metric in &rate_sources {
                let rate = player
                    .metric(metric)
                    .and_then(|raw| per90(raw, player.minutes));
                match rate {
                    Some(rate) => {
                        player.metrics.insert(per90_name(metric), rate);
                    }
                    None => {
                        player.metrics.remove(&per90_name(metric));
                    }
                }
            }
        }
        for metric in rate_sources {
            columns.insert(per90_name(&metric));
        }

        Self { columns, players }
    }

    /// Column set is the union of every metric any player carries.
    pub fn from_players(players: Vec<PlayerRecord>) -> Self {
        let columns: BTreeSet<String> = players
            .iter()
            .flat_map(|p| p.metrics.keys().cloned())
            .collect();
        Self::new(columns, players)
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&PlayerRecord> {
        self.players.get(index)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Column to read for `metric`: the per-90 form when the dataset has one, else the
    /// metric itself, else `None`.
    pub fn resolve_column(&self, metric: &str) -> Option<String> {
        let rate = per90_name(metric);
        if self.has_column(&rate) {
            Some(rate)
        } else if self.has_column(metric) {
            Some(metric.to_string())
        } else {
            None
        }
    }

    /// Case-insensitive name lookup, first match in dataset order.
    pub fn find_player(&self, name: &str, club: Option<&str>) -> Option<usize> {
        let name = name.trim();
        self.players.iter().position(|p| {
            p.name.trim().eq_ignore_ascii_case(name)
                && club.is_none_or(|c| p.club.trim().eq_ignore_ascii_case(c.trim()))
        })
    }
}

pub fn load_players_csv(path: &Path) -> Result<PlayerDataset> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    parse_players_csv(file).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_players_csv<R: Read>(rdr: R) -> Result<PlayerDataset> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let headers = reader.headers().context("read csv header")?.clone();

    let find = |name: &str| headers.iter().position(|h| h == name);
    let name_idx = find(NAME_COLUMN).ok_or_else(|| anyhow!("missing column {NAME_COLUMN}"))?;
    let club_idx = find(CLUB_COLUMN).ok_or_else(|| anyhow!("missing column {CLUB_COLUMN}"))?;
    let position_idx =
        find(POSITION_COLUMN).ok_or_else(|| anyhow!("missing column {POSITION_COLUMN}"))?;
    let minutes_idx =
        find(MINUTES_COLUMN).ok_or_else(|| anyhow!("missing column {MINUTES_COLUMN}"))?;
    let nationality_idx = find(NATIONALITY_COLUMN);

    // Unnamed leading column is the pandas row index.
    let metric_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.is_empty() && !IDENTITY_COLUMNS.contains(h))
        .map(|(idx, h)| (idx, h.to_string()))
        .collect();

    let mut players = Vec::new();
    let mut skipped = 0usize;
    for (row_idx, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("read csv row {}", row_idx + 1))?;
        let name = row.get(name_idx).unwrap_or_default().to_string();
        let minutes = row
            .get(minutes_idx)
            .and_then(parse_number)
            .filter(|m| *m >= 0.0);
        let Some(minutes) = minutes else {
            log::warn!(
                target: LOG_TARGET,
                "skipping '{name}' (row {}): invalid minutes",
                row_idx + 1
            );
            skipped += 1;
            continue;
        };

        let mut player = PlayerRecord::new(
            name,
            row.get(club_idx).unwrap_or_default(),
            nationality_idx
                .and_then(|idx| row.get(idx))
                .unwrap_or_default(),
            row.get(position_idx).unwrap_or_default(),
            minutes.round() as u32,
        );
        for (idx, column) in &metric_columns {
            if let Some(v) = row.get(*idx).and_then(parse_number) {
                player.metrics.insert(column.clone(), v);
            }
        }
        players.push(player);
    }

    log::info!(
        target: LOG_TARGET,
        "loaded {} players ({} skipped, {} metric columns)",
        players.len(),
        skipped,
        metric_columns.len()
    );

    Ok(PlayerDataset::new(
        metric_columns.into_iter().map(|(_, c)| c),
        players,
    ))
}

/// Lenient numeric cell parse: tolerates `%` suffixes and thousands separators, treats
/// empty cells and `-` as missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_end_matches('%').trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let cleaned = s.replace(',', "");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
