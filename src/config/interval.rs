//! Human-friendly intervals such as `"30m"`, `"1h"` or `"1d"`.

use std::time::Duration;

use serde::{de, Deserialize, Deserializer};

/// Parse an interval string into seconds.
///
/// Accepts `s`, `m`, `h` and `d` suffixes, or a bare number of seconds.
pub fn parse_interval(s: &str) -> Result<u64, String> {
    let s = s.trim().to_lowercase();

    if let Some(hours) = s.strip_suffix('h') {
        scaled(hours, 3600, "hours")
    } else if let Some(minutes) = s.strip_suffix('m') {
        scaled(minutes, 60, "minutes")
    } else if let Some(days) = s.strip_suffix('d') {
        scaled(days, 86400, "days")
    } else if let Some(secs) = s.strip_suffix('s') {
        scaled(secs, 1, "seconds")
    } else {
        s.parse::<u64>()
            .map_err(|_| format!("Invalid interval: {}. Use format like '1h', '30m', '1d'", s))
    }
}

fn scaled(value: &str, unit: u64, name: &str) -> Result<u64, String> {
    value
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(unit))
        .ok_or_else(|| format!("Invalid {}: {}", name, value))
}

pub fn parse_duration(s: &str) -> Result<Duration, String> {
    parse_interval(s).map(Duration::from_secs)
}

/// Format seconds using the largest unit that divides evenly.
pub fn format_interval(secs: u64) -> String {
    if secs >= 86400 && secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

pub(crate) fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("1h").unwrap(), 3600);
        assert_eq!(parse_interval("30m").unwrap(), 1800);
        assert_eq!(parse_interval("1d").unwrap(), 86400);
        assert_eq!(parse_interval("60s").unwrap(), 60);
        assert_eq!(parse_interval("3600").unwrap(), 3600);
        assert_eq!(parse_interval(" 2H ").unwrap(), 7200);
        assert!(parse_interval("invalid").is_err());
        assert!(parse_interval("h").is_err());
    }

    #[test]
    fn test_parse_interval_rejects_overflow() {
        assert_eq!(
            parse_interval("99999999999999999h"),
            Err("Invalid hours: 99999999999999999".to_string())
        );
        assert!(parse_interval("999999999999999999m").is_err());
        assert!(parse_interval("999999999999999d").is_err());
        assert!(parse_interval("99999999999999999999").is_err());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(3600), "1h");
        assert_eq!(format_interval(1800), "30m");
        assert_eq!(format_interval(86400), "1d");
        assert_eq!(format_interval(90), "90s");
        assert_eq!(format_interval(7200), "2h");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }
}
