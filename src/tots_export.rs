use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::best_xi::{BestXi, ProfileRanking, SlotAssignment};
use crate::player_dataset::PlayerDataset;
use crate::scoring_config::ScoringConfig;

pub struct ExportReport {
    pub slots: usize,
    pub rankings: usize,
    pub ranked_rows: usize,
    pub weight_rows: usize,
}

/// Writes the XI, one sheet per profile ranking and the weight table to `path`.
pub fn export_tots_workbook(
    path: &Path,
    dataset: &PlayerDataset,
    config: &ScoringConfig,
    best_xi: &BestXi,
) -> Result<ExportReport> {
    let summary_rows = vec![
        vec!["Generated (UTC)".to_string(), Utc::now().format("%Y-%m-%d %H:%M").to_string()],
        vec!["Players in dataset".to_string(), dataset.len().to_string()],
        vec![
            "Eligibility".to_string(),
            format!("> {} minutes", config.eligibility_minutes),
        ],
        vec!["Formation".to_string(), "4-2-3-1".to_string()],
    ];

    let mut xi_rows = vec![vec![
        "Slot".to_string(),
        "Group".to_string(),
        "Profile".to_string(),
        "Player".to_string(),
        "Club".to_string(),
        "Nationality".to_string(),
        "Minutes".to_string(),
        "Score".to_string(),
    ]];
    xi_rows.extend(best_xi.slots.iter().map(|s| slot_row(dataset, s)));

    let mut weight_rows = vec![vec![
        "Profile".to_string(),
        "Metric".to_string(),
        "Weight".to_string(),
        "Direction".to_string(),
    ]];
    for profile in &config.profiles {
        for m in &profile.metrics {
            weight_rows.push(vec![
                profile.key(),
                m.metric.clone(),
                format!("{:.2}", m.weight),
                format!("{:?}", m.direction),
            ]);
        }
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TeamOfTheSeason")?;
        write_rows(sheet, &xi_rows)?;
    }
    let mut ranked_rows = 0usize;
    for ranking in &best_xi.rankings {
        let rows = ranking_rows(ranking);
        ranked_rows += rows.len().saturating_sub(1);
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&ranking.profile)
            .with_context(|| format!("name sheet {}", ranking.profile))?;
        write_rows(sheet, &rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Weights")?;
        write_rows(sheet, &weight_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        slots: best_xi.slots.len(),
        rankings: best_xi.rankings.len(),
        ranked_rows,
        weight_rows: weight_rows.len().saturating_sub(1),
    })
}

fn slot_row(dataset: &PlayerDataset, slot: &SlotAssignment) -> Vec<String> {
    let player = dataset.player(slot.player);
    vec![
        slot.slot.label().to_string(),
        slot.group.clone(),
        slot.profile.clone(),
        slot.name.clone(),
        slot.club.clone(),
        player.map(|p| p.nationality.clone()).unwrap_or_default(),
        opt_to_string(player.map(|p| p.minutes)),
        format!("{:.2}", slot.score),
    ]
}

fn ranking_rows(ranking: &ProfileRanking) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Rank".to_string(),
        "Player".to_string(),
        "Club".to_string(),
        "Score".to_string(),
    ]];
    rows.extend(ranking.entries.iter().enumerate().map(|(pos, entry)| {
        vec![
            (pos + 1).to_string(),
            entry.name.clone(),
            entry.club.clone(),
            format!("{:.2}", entry.score),
        ]
    }));
    rows
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
