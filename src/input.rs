//! Clamping and lenient parsing applied to user-entered numbers before they
//! reach the engine. The engine itself never validates.

use tracing::warn;

pub const MIN_EFFORT_WEEKS: f64 = 0.5;
pub const MAX_EFFORT_WEEKS: f64 = 52.0;
pub const MAX_PROBABILITY: f64 = 100.0;
pub const MAX_ANNUAL_DECAY_RATE: f64 = 20.0;

pub fn clamp_effort(weeks: f64) -> f64 {
    clamp_range(weeks, MIN_EFFORT_WEEKS, MAX_EFFORT_WEEKS)
}

pub fn clamp_probability(percent: f64) -> f64 {
    clamp_range(percent, 0.0, MAX_PROBABILITY)
}

pub fn clamp_decay_rate(percent: f64) -> f64 {
    clamp_range(percent, 0.0, MAX_ANNUAL_DECAY_RATE)
}

pub fn clamp_non_negative(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0)
}

fn clamp_range(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

/// Parses a number the way a form field would accept it, falling back on failure.
pub fn parse_or(raw: &str, fallback: f64) -> f64 {
    let sanitized: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | '_') && !c.is_whitespace())
        .collect();
    match sanitized.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => fallback,
    }
}

/// Parses a comma separated list of delay durations, dropping bad entries.
pub fn parse_delay_list(raw: &str) -> Vec<f64> {
    let mut out = Vec::new();
    for piece in raw.split(',') {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.parse::<f64>() {
            Ok(weeks) if weeks.is_finite() && weeks >= 0.0 => out.push(weeks),
            _ => warn!("ignoring invalid delay duration: {trimmed}"),
        }
    }
    out
}
