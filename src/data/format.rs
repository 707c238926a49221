//! Display formatting and fallbacks shared by every view.

/// Shown when an identity or status field is missing.
pub const UNKNOWN: &str = "Unknown";

/// Shown when an optional measurement is missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Clamp a percentage to `0..=100`. Missing and NaN values become 0.
pub fn clamp_percent(value: Option<f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v.clamp(0.0, 100.0),
        _ => 0.0,
    }
}

/// Text value, or "Unknown" when missing or blank.
pub fn or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format a byte count with binary units: "512 B", "1.5 KB", "3.2 GB".
pub fn format_bytes(bytes: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 B".to_string();
    }

    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{:.0} {}", value, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Format a transfer speed in bytes per second, or "N/A" when missing.
pub fn format_speed(bytes_per_sec: Option<f64>) -> String {
    match bytes_per_sec {
        Some(v) if v.is_finite() && v >= 0.0 => format!("{}/s", format_bytes(v)),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Format an already clamped percentage: "42%" or "7.5%".
pub fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 || value >= 10.0 {
        format!("{:.0}%", value)
    } else {
        format!("{:.1}%", value)
    }
}

/// Format a latency in milliseconds.
pub fn format_latency(ms: f64) -> String {
    if !ms.is_finite() || ms <= 0.0 {
        "0ms".to_string()
    } else if ms < 1_000.0 {
        format!("{:.0}ms", ms)
    } else {
        format!("{:.2}s", ms / 1_000.0)
    }
}

/// Truncate to `max_len` characters, ending with an ellipsis if shortened.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(Some(42.0)), 42.0);
        assert_eq!(clamp_percent(Some(150.0)), 100.0);
        assert_eq!(clamp_percent(Some(-5.0)), 0.0);
        assert_eq!(clamp_percent(Some(f64::NAN)), 0.0);
        assert_eq!(clamp_percent(Some(f64::INFINITY)), 100.0);
        assert_eq!(clamp_percent(None), 0.0);
    }

    #[test]
    fn test_or_unknown() {
        assert_eq!(or_unknown(Some("node-1")), "node-1");
        assert_eq!(or_unknown(Some("  ")), "Unknown");
        assert_eq!(or_unknown(None), "Unknown");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234), "1.2K");
        assert_eq!(format_count(1_234_567), "1.2M");
    }

    #[test]
    fn test_format_bytes_and_speed() {
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(1536.0), "1.5 KB");
        assert_eq!(format_bytes(1_048_576.0), "1.0 MB");
        assert_eq!(format_bytes(-1.0), "0 B");
        assert_eq!(format_speed(Some(2048.0)), "2.0 KB/s");
        assert_eq!(format_speed(None), "N/A");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(42.0), "42%");
        assert_eq!(format_percent(7.5), "7.5%");
        assert_eq!(format_percent(99.6), "100%");
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(35.4), "35ms");
        assert_eq!(format_latency(1500.0), "1.50s");
        assert_eq!(format_latency(f64::NAN), "0ms");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-node-id", 8), "a-very-…");
    }
}
