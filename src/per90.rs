pub const PER90_SUFFIX: &str = " per90";

/// Counting stats that get a per-90 companion column. Percentages and stats that are
/// already rates (Saves %, Passes%, Clean Sheets, ...) are left alone.
pub const PER90_METRICS: [&str; 27] = [
    "Goals",
    "Assists",
    "Shots",
    "Touches",
    "Passes",
    "Successful Passes",
    "Through Balls",
    "Progressive Carries",
    "fThird Passes",
    "Successful fThird Passes",
    "Tackles",
    "Interceptions",
    "Blocks",
    "Clearances",
    "Clearances Off Line",
    "Possession Won",
    "Ground Duels",
    "Aerial Duels",
    "Fouls",
    "Saves",
    "Penalties Saved",
    "Goals Conceded",
    "Own Goals",
    "Punches",
    "High Claims",
    "Goals Prevented",
    "Big Chances Missed",
];

/// `value / minutes * 90`. `None` for zero minutes, so callers never see NaN or inf.
pub fn per90(value: f64, minutes: u32) -> Option<f64> {
    if minutes == 0 {
        return None;
    }
    let rate = value / minutes as f64 * 90.0;
    rate.is_finite().then_some(rate)
}

pub fn is_per90_metric(metric: &str) -> bool {
    PER90_METRICS.contains(&metric)
}

pub fn per90_name(metric: &str) -> String {
    format!("{metric}{PER90_SUFFIX}")
}

/// "Goals per90" -> "Goals"; names without the suffix come back unchanged.
pub fn base_metric_name(metric: &str) -> &str {
    metric.strip_suffix(PER90_SUFFIX).unwrap_or(metric)
}
