// src/config/duration.rs

use std::time::Duration;

use crate::errors::{ReconrunError, Result};

/// Parse a duration string like `"500ms"`, `"30s"`, `"10m"`, `"1h"`.
///
/// The number must be a non-negative integer and the unit is required.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ReconrunError::DurationError(
            "empty duration string".to_string(),
        ));
    }

    // Find the boundary between digits and suffix.
    let idx = s.chars().position(|c| !c.is_ascii_digit()).ok_or_else(|| {
        ReconrunError::DurationError(format!("duration '{s}' is missing a unit suffix"))
    })?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part.parse().map_err(|e| {
        ReconrunError::DurationError(format!("invalid duration number '{num_part}': {e}"))
    })?;
    let unit = unit_part.trim().to_lowercase();

    let secs = |mult: u64| {
        value.checked_mul(mult).map(Duration::from_secs).ok_or_else(|| {
            ReconrunError::DurationError(format!("duration '{s}' is too large"))
        })
    };

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => secs(1),
        "m" => secs(60),
        "h" => secs(60 * 60),
        _ => Err(ReconrunError::DurationError(format!(
            "unsupported duration unit '{unit}'; expected ms, s, m, or h"
        ))),
    }
}

/// Like [`parse_duration`], but zero is rejected.
pub fn parse_positive_duration(s: &str) -> Result<Duration> {
    let d = parse_duration(s)?;
    if d.is_zero() {
        return Err(ReconrunError::DurationError(format!(
            "duration '{}' must be greater than zero",
            s.trim()
        )));
    }
    Ok(d)
}
