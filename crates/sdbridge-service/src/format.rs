//! Human-readable byte sizes.

const UNITS: [&str; 9] = ["bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count with a 1024-based unit ladder.
///
/// Values past the first step that are below 10 keep one decimal
/// (`1.5 KB`); everything else is rounded to an integer (`10 KB`,
/// `1023 bytes`).
pub fn nice_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if value < 10.0 && unit > 0 {
        // Round half up, then print the single decimal.
        let rounded = (value * 10.0).round() / 10.0;
        format!("{rounded:.1} {}", UNITS[unit])
    } else {
        format!("{} {}", value.round() as u64, UNITS[unit])
    }
}
