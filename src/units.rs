//! Conversions between raw node telemetry and human-readable units.
//!
//! Hash rates are always carried in GH/s, power in watts, and best
//! difficulty as a suffixed string such as `"123.45M"`.

use crate::constants::DIFFICULTY_SUFFIXES;
use crate::errors::ScoutError;

const STEP: f64 = 1000.0;

/// Parse a suffixed difficulty (`<number>[k|M|G|T|P]?`) into its numeric value
pub fn parse_difficulty(text: &str) -> Result<f64, ScoutError> {
    let text = text.trim();
    let (number, exponent) = match text.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => {
            let exponent = DIFFICULTY_SUFFIXES
                .iter()
                .position(|s| s.len() == 1 && s.starts_with(c))
                .ok_or_else(|| ScoutError::DifficultyFormat(text.to_string()))?;
            (&text[..idx], exponent)
        }
        Some(_) => (text, 0),
        None => return Err(ScoutError::DifficultyFormat(text.to_string())),
    };

    if !is_plain_number(number) {
        return Err(ScoutError::DifficultyFormat(text.to_string()));
    }

    let value: f64 = number
        .parse()
        .map_err(|_| ScoutError::DifficultyFormat(text.to_string()))?;
    Ok(value * STEP.powi(exponent as i32))
}

/// Lenient variant used by aggregation: anything unparseable counts as zero
pub fn difficulty_or_zero(text: &str) -> f64 {
    parse_difficulty(text).unwrap_or(0.0)
}

/// Digits with at most one decimal point, e.g. "12", "1.5", ".5"
fn is_plain_number(s: &str) -> bool {
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in s.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

pub fn format_difficulty(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }
    let mut value = value;
    let mut idx = 0;
    while value >= STEP && idx < DIFFICULTY_SUFFIXES.len() - 1 {
        value /= STEP;
        idx += 1;
    }
    format!("{:.2}{}", value, DIFFICULTY_SUFFIXES[idx])
}

/// Format a GH/s value, switching to TH/s from 1000 GH/s upwards
pub fn format_hash_rate(value_ghs: f64) -> String {
    let value = if value_ghs.is_finite() { value_ghs } else { 0.0 };
    if value >= STEP {
        format!("{:.2} TH/s", value / STEP)
    } else {
        format!("{:.2} GH/s", value)
    }
}

pub fn format_power(value_w: Option<f64>) -> String {
    match value_w {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => "0.00".to_string(),
    }
}
