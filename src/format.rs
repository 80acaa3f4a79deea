//! Human-readable durations and status lines.

use std::time::Duration;

use crate::sandbox::SandboxProgress;

const UNITS: [(u64, &str, &str); 4] = [
    (86_400, "day", "days"),
    (3_600, "hour", "hours"),
    (60, "minute", "minutes"),
    (1, "second", "seconds"),
];

/// `3725` -> `"1 hour 2 minutes 5 seconds"`. Zero components are left out.
pub fn seconds_to_human(seconds: u64) -> String {
    if seconds == 0 {
        return "0 seconds".to_string();
    }
    let mut remaining = seconds;
    let mut parts = Vec::new();
    for (size, singular, plural) in UNITS {
        let count = remaining / size;
        remaining %= size;
        if count > 0 {
            let unit = if count == 1 { singular } else { plural };
            parts.push(format!("{} {}", count, unit));
        }
    }
    parts.join(" ")
}

/// Like [`seconds_to_human`], but durations under a second print as milliseconds.
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        return format!("{} ms", duration.as_millis());
    }
    seconds_to_human(duration.as_secs())
}

/// Remaining time extrapolated linearly from `elapsed` at `percent` done.
pub fn estimate_remaining(elapsed: Duration, percent: u8) -> Option<Duration> {
    if percent == 0 || percent >= 100 {
        return None;
    }
    let percent = u64::from(percent);
    let elapsed_secs = elapsed.as_secs();
    Some(Duration::from_secs(elapsed_secs * (100 - percent) / percent))
}

/// One-line status for a sandbox request, e.g.
/// `Sandbox dev1 (0GR...) is Processing (42% completed). Elapsed: 3 minutes. Estimated remaining: 4 minutes 8 seconds.`
pub fn sandbox_status_line(progress: &SandboxProgress, elapsed: Duration) -> String {
    let mut line = format!("Sandbox {}", progress.sandbox_name);
    if let Some(id) = &progress.id {
        line.push_str(&format!(" ({})", id));
    }
    line.push_str(&format!(
        " is {} ({}% completed). Elapsed: {}.",
        progress.status,
        progress.copy_progress,
        seconds_to_human(elapsed.as_secs())
    ));
    if let Some(remaining) = estimate_remaining(elapsed, progress.copy_progress) {
        line.push_str(&format!(
            " Estimated remaining: {}.",
            seconds_to_human(remaining.as_secs())
        ));
    }
    if let Some(error) = &progress.error {
        line.push_str(&format!(" Error: {}", error));
    }
    line
}
