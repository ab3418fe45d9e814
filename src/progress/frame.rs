//! Pure rendering of a progress sample into display lines.
//! No I/O here; the reporter decides where the lines go.

use std::time::Duration;

use super::state::Sample;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

/// Columns reserved around the bar (brackets plus slack for narrow terminals).
const BAR_MARGIN: usize = 10;
const MIN_BAR: usize = 10;

/// Completion in percent by bytes; 0 when there is nothing to move.
pub fn percent(moved_bytes: u64, total_bytes: u64) -> f64 {
    if total_bytes == 0 {
        return 0.0;
    }
    (moved_bytes as f64 / total_bytes as f64 * 100.0).min(100.0)
}

/// ETA from the average rate since the run started.
/// `None` until something has been moved.
pub fn eta(moved_bytes: u64, total_bytes: u64, elapsed: Duration) -> Option<Duration> {
    let secs = elapsed.as_secs_f64();
    if moved_bytes == 0 || secs <= 0.0 {
        return None;
    }
    let avg = moved_bytes as f64 / secs;
    let remaining = total_bytes.saturating_sub(moved_bytes) as f64;
    Some(Duration::from_secs_f64(remaining / avg))
}

/// Events per second over `window`; 0 for an empty window.
pub fn per_second(count: u64, window: Duration) -> f64 {
    let secs = window.as_secs_f64();
    if secs <= 0.0 { 0.0 } else { count as f64 / secs }
}

/// `H:MM:SS`, hours unbounded.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// Byte rate with a binary unit picked by magnitude.
pub fn format_rate(bytes_per_sec: f64) -> String {
    if bytes_per_sec > GIB {
        format!("{:.2} GiB/s", bytes_per_sec / GIB)
    } else if bytes_per_sec > MIB {
        format!("{:.2} MiB/s", bytes_per_sec / MIB)
    } else if bytes_per_sec > KIB {
        format!("{:.2} KiB/s", bytes_per_sec / KIB)
    } else {
        format!("{:.2} B/s", bytes_per_sec)
    }
}

fn gb(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

/// The bar plus its brackets never exceeds `width`, so a frame row never wraps.
fn bar(pct: f64, width: usize) -> String {
    let len = width
        .saturating_sub(BAR_MARGIN)
        .max(MIN_BAR)
        .min(width.saturating_sub(2));
    let filled = ((len as f64 * pct / 100.0) as usize).min(len);
    format!("[{}{}]", "█".repeat(filled), "-".repeat(len - filled))
}

/// Cut `s` to at most `width` chars, marking the cut.
fn fit(s: String, width: usize) -> String {
    if s.chars().count() <= width {
        return s;
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// Keep the tail of a path, which is the part that identifies the file.
fn shorten_left(name: &str, max: usize) -> String {
    let count = name.chars().count();
    if count <= max {
        return name.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let tail: String = name.chars().skip(count - (max - 1)).collect();
    format!("…{tail}")
}

/// Five status lines sized for a terminal `width` columns wide.
pub fn render(sample: &Sample, width: u16) -> Vec<String> {
    let width = width as usize;
    let s = &sample.snapshot;
    let pct = percent(s.moved_bytes, s.total_bytes);
    let remaining_files = s.total_files.saturating_sub(s.moved_files);
    let remaining_bytes = s.total_bytes.saturating_sub(s.moved_bytes);
    let eta = eta(s.moved_bytes, s.total_bytes, sample.elapsed)
        .map(format_duration)
        .unwrap_or_else(|| "--:--:--".to_string());
    let byte_rate = per_second(sample.window_bytes, sample.window);
    let file_rate = per_second(sample.window_files, sample.window);

    let size_part = format!(" ({:.2} MB)", s.current_file_size as f64 / MIB);
    let label = "Current File: ";
    let room = width.saturating_sub(label.len() + size_part.len());

    vec![
        bar(pct, width),
        fit(
            format!(
                "{pct:6.2}% ({}/{} files), {:.2} GB / {:.2} GB",
                s.moved_files,
                s.total_files,
                gb(s.moved_bytes),
                gb(s.total_bytes)
            ),
            width,
        ),
        fit(
            format!(
                "ETA: {eta}, {remaining_files} remaining, {:.2} GB",
                gb(remaining_bytes)
            ),
            width,
        ),
        fit(
            format!("Rate: {}, {file_rate:.2} files/s", format_rate(byte_rate)),
            width,
        ),
        fit(
            format!("{label}{}{size_part}", shorten_left(&s.current_file, room)),
            width,
        ),
    ]
}

/// One-line form for logs and non-interactive output.
pub fn plain_line(sample: &Sample) -> String {
    let s = &sample.snapshot;
    let eta = eta(s.moved_bytes, s.total_bytes, sample.elapsed)
        .map(format_duration)
        .unwrap_or_else(|| "--:--:--".to_string());
    format!(
        "{:.2}% ({}/{} files, {:.2}/{:.2} GB) ETA {eta} elapsed {}",
        percent(s.moved_bytes, s.total_bytes),
        s.moved_files,
        s.total_files,
        gb(s.moved_bytes),
        gb(s.total_bytes),
        format_duration(sample.elapsed),
    )
}
