/// Formats a byte count for display.
///
/// Zero yields an empty string. Below 1000 the count is shown in bytes;
/// above that it is divided by 1024 until it drops under 1000 and shown with
/// one decimal in KB, MB or GB. Anything from 1000 GB upwards is `UNKNOWN`.
///
/// ```
/// use dcs_format::human_size;
/// assert_eq!(human_size(0), "");
/// assert_eq!(human_size(999), "999 Bytes");
/// assert_eq!(human_size(1000), "1.0 KB");
/// assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
/// ```
pub fn human_size(bytes: u64) -> String {
    if bytes == 0 {
        return String::new();
    }
    if bytes < 1000 {
        return format!("{bytes} Bytes");
    }
    let mut value = bytes as f64;
    for unit in ["KB", "MB", "GB"] {
        value /= 1024.0;
        if value < 1000.0 {
            return format!("{:.1} {unit}", round_half_up(value));
        }
    }
    "UNKNOWN".to_string()
}

/// Rounds to one decimal place with ties going up (`1.25` becomes `1.3`).
fn round_half_up(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
