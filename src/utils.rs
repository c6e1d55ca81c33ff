//! Number formatting for log lines.

/// Group the digits of `count` in threes, so address totals stay exact.
///
/// ```
/// use embargo::utils::format_count;
/// assert_eq!(format_count(42), "42");
/// assert_eq!(format_count(16_777_216), "16,777,216");
/// assert_eq!(format_count(1 << 32), "4,294,967,296");
/// ```
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Archive size with a binary unit, one decimal above bytes.
///
/// ```
/// use embargo::utils::format_size;
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(3_355_443), "3.2 MiB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count_groups() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(123_456), "123,456");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_count_whole_address_space() {
        // A 0.0.0.0/0 selection overflows u32
        assert_eq!(format_count(1u64 << 32), "4,294,967,296");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KiB");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.0 GiB");
    }
}
