//! Terminal progress for the matching phase.
//!
//! Bars draw to stderr and are hidden when stderr is not a terminal or when
//! verbose logging is on, so log lines don't interleave with redraws.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Whether bars should be drawn at all
pub fn should_draw(verbose: bool) -> bool {
    !verbose && std::io::stderr().is_terminal()
}

/// Format duration in human-readable format
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Progress bar over the input tracks
pub fn create_progress_bar(len: u64, msg: &str, draw: bool) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if draw {
        pb.set_style(bar_style());
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.set_message(msg.to_string());
    pb
}
