//! EXP goal calculator: parse "19B"-style amounts and report progress toward a target.

use serde::Serialize;

/// How far `current` is from `goal`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GoalProgress {
    pub needed: f64,
    /// `current / goal * 100`.
    pub percentage: f64,
}

/// Parse an amount with an optional `K`/`M`/`B` suffix (case-insensitive, commas and spaces
/// ignored). Empty or unreadable input is 0.
pub fn parse_exp_amount(text: &str) -> f64 {
    let clean: String = text
        .to_lowercase()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if clean.is_empty() {
        return 0.0;
    }

    let (number, scale) = if clean.contains('k') {
        (clean.replacen('k', "", 1), 1e3)
    } else if clean.contains('m') {
        (clean.replacen('m', "", 1), 1e6)
    } else if clean.contains('b') {
        (clean.replacen('b', "", 1), 1e9)
    } else {
        (clean, 1.0)
    };

    match number.parse::<f64>() {
        Ok(v) if v.is_finite() => v * scale,
        _ => 0.0,
    }
}

/// Short human form: `20.0B`, `1.5M`, `2.5K`; amounts below one thousand are printed as-is.
pub fn format_exp(value: f64) -> String {
    if value >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        plain(value)
    }
}

/// `Some` only while the goal is still ahead of a non-negative current amount.
pub fn goal_progress(current: f64, goal: f64) -> Option<GoalProgress> {
    if current >= 0.0 && goal > current {
        Some(GoalProgress {
            needed: goal - current,
            percentage: current / goal * 100.0,
        })
    } else {
        None
    }
}

fn plain(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", (value * 100.0).round() / 100.0)
    }
}
