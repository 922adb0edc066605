// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compact duration strings (`90s`, `15m`, `1h30m`, `2d`).

use std::time::Duration;

/// Parses a duration made of `<number><unit>` groups, units `s`, `m`, `h`, `d`.
/// A bare number is read as seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration is empty".to_string());
    }

    if let Ok(secs) = input.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for ch in input.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let multiplier = match ch {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            other => return Err(format!("unknown unit `{other}` (use s, m, h or d)")),
        };
        if digits.is_empty() {
            return Err(format!("unit `{ch}` is missing a number"));
        }
        let value: u64 = digits
            .parse()
            .map_err(|_| format!("number `{digits}` is too large"))?;
        total = value
            .checked_mul(multiplier)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| "duration overflows".to_string())?;
        digits.clear();
    }

    if !digits.is_empty() {
        return Err(format!("trailing number `{digits}` has no unit"));
    }

    Ok(Duration::from_secs(total))
}
