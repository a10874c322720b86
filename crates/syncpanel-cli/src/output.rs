/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter {
    /// Drop `info` lines, keeping only outcomes and problems
    pub quiet: bool,
}

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(json: bool, quiet: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter { quiet })
    }
}

const BYTE_UNITS: &[&str] = &["bytes", "kB", "MB", "GB", "TB", "PB"];

/// Human-readable size with one decimal: `1536` gives `1.5 kB`.
///
/// Zero is printed as `0`; sizes below one kB keep the `bytes` unit.
pub fn format_bytes(bytes: f64) -> String {
    format_bytes_with_precision(bytes, 1)
}

pub fn format_bytes_with_precision(bytes: f64, precision: usize) -> String {
    if bytes == 0.0 {
        return "0".to_string();
    }
    if !bytes.is_finite() || bytes < 0.0 {
        return bytes.to_string();
    }
    let mut unit = 0;
    let mut scaled = bytes;
    while scaled >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    format!("{:.*} {}", precision, scaled, BYTE_UNITS[unit])
}

/// Human-readable duration: `3725` gives `1h 2min`, `42` gives `42s`.
///
/// Seconds are dropped once the duration reaches a minute. The agent's
/// "unknown" marker `-1` is printed as `N/A`.
pub fn format_seconds(seconds: f64) -> String {
    if seconds == -1.0 {
        return "N/A".to_string();
    }
    if !seconds.is_finite() || seconds < 0.0 {
        return seconds.to_string();
    }
    let total = seconds.round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours == 0 && minutes == 0 {
        return format!("{}s", secs);
    }
    let mut parts = Vec::with_capacity(2);
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}min", minutes));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_zero() {
        assert_eq!(format_bytes(0.0), "0");
    }

    #[test]
    fn test_format_bytes_small_values_keep_bytes_unit() {
        assert_eq!(format_bytes(512.0), "512.0 bytes");
        assert_eq!(format_bytes(1.0), "1.0 bytes");
    }

    #[test]
    fn test_format_bytes_scales_by_1024() {
        assert_eq!(format_bytes(1536.0), "1.5 kB");
        assert_eq!(format_bytes(1_048_576.0), "1.0 MB");
        assert_eq!(format_bytes(5.5 * 1024.0 * 1024.0 * 1024.0), "5.5 GB");
    }

    #[test]
    fn test_format_bytes_caps_at_largest_unit() {
        let huge = 2048.0 * 1024f64.powi(5);
        assert_eq!(format_bytes(huge), "2048.0 PB");
    }

    #[test]
    fn test_format_bytes_precision() {
        assert_eq!(format_bytes_with_precision(1536.0, 0), "2 kB");
        assert_eq!(format_bytes_with_precision(1536.0, 2), "1.50 kB");
    }

    #[test]
    fn test_format_bytes_fraction_below_one() {
        assert_eq!(format_bytes(0.5), "0.5 bytes");
    }

    #[test]
    fn test_format_seconds_unknown() {
        assert_eq!(format_seconds(-1.0), "N/A");
    }

    #[test]
    fn test_format_seconds_under_a_minute() {
        assert_eq!(format_seconds(0.0), "0s");
        assert_eq!(format_seconds(42.4), "42s");
        assert_eq!(format_seconds(59.4), "59s");
    }

    #[test]
    fn test_format_seconds_drops_seconds_past_a_minute() {
        assert_eq!(format_seconds(60.0), "1min");
        assert_eq!(format_seconds(125.0), "2min");
        assert_eq!(format_seconds(3725.0), "1h 2min");
        assert_eq!(format_seconds(7200.0), "2h");
    }

    #[test]
    fn test_format_seconds_rounds_up_into_minutes() {
        assert_eq!(format_seconds(59.6), "1min");
    }

    #[test]
    fn test_format_seconds_keeps_hours_past_a_day() {
        assert_eq!(format_seconds(26.0 * 3600.0 + 60.0), "26h 1min");
    }
}
