//! Small helpers: human-readable sizes and rates.

use crate::consts::{BYTES_PER_GB, BYTES_PER_KB, BYTES_PER_MB};

/// 1024-based units; two decimals above bytes.
pub fn format_size(bytes: f64) -> String {
    if bytes >= BYTES_PER_GB {
        format!("{:.2} GB", bytes / BYTES_PER_GB)
    } else if bytes >= BYTES_PER_MB {
        format!("{:.2} MB", bytes / BYTES_PER_MB)
    } else if bytes >= BYTES_PER_KB {
        format!("{:.2} KB", bytes / BYTES_PER_KB)
    } else {
        format!("{bytes:.0} B")
    }
}

pub fn format_speed(bytes_per_sec: f64) -> String {
    format!("{}/s", format_size(bytes_per_sec))
}

/// Bytes to GiB rounded to two decimals, as sensors report them.
pub fn bytes_to_gb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_GB * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_scale_by_1024() {
        assert_eq!(format_size(500.0), "500 B");
        assert_eq!(format_size(2048.0), "2.00 KB");
        assert_eq!(format_size(5.0 * 1024.0 * 1024.0), "5.00 MB");
        assert_eq!(format_size(3.0 * 1024.0 * 1024.0 * 1024.0), "3.00 GB");
    }

    #[test]
    fn unit_thresholds_are_inclusive() {
        assert_eq!(format_size(0.0), "0 B");
        assert_eq!(format_size(1023.0), "1023 B");
        assert_eq!(format_size(1024.0), "1.00 KB");
        assert_eq!(format_size(1024.0 * 1024.0), "1.00 MB");
    }

    #[test]
    fn speeds_carry_a_per_second_suffix() {
        assert_eq!(format_speed(1_500_000.0), "1.43 MB/s");
        assert_eq!(format_speed(0.0), "0 B/s");
    }

    #[test]
    fn gigabytes_round_to_two_places() {
        assert_eq!(bytes_to_gb(0), 0.0);
        assert_eq!(bytes_to_gb(1024 * 1024 * 1024), 1.0);
        assert_eq!(bytes_to_gb(8_000_000_000), 7.45);
    }
}
