pub mod best_xi;
pub mod cohort;
pub mod composite;
pub mod error;
pub mod per90;
pub mod percentile;
pub mod player_dataset;
pub mod player_report;
pub mod scoring_config;
pub mod tots_export;
