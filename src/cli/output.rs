//! Output formatting for CLI commands
//!
//! Provides utilities for formatting command output in human-readable
//! or JSON formats. Supports colored output (respects NO_COLOR env var).

use crate::core::language::{Anchor, Language};
use crate::core::types::GeocodingResult;

/// Color scheme for CLI output
pub mod colors {
    use crate::core::session::SessionStatus;
    use crate::core::theme::Theme;
    use colored::{ColoredString, Colorize};

    /// Style for labels/headers
    pub fn label(s: &str) -> ColoredString {
        s.bold()
    }

    /// Title accent; darker on light backgrounds
    pub fn accent(s: &str, theme: Theme) -> ColoredString {
        match theme {
            Theme::Light => s.blue().bold(),
            Theme::Dark => s.bright_cyan().bold(),
        }
    }

    /// Style for coordinates
    pub fn coord(s: &str) -> ColoredString {
        s.cyan()
    }

    /// Style for numbers/counts
    pub fn number(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Style for success messages
    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    /// Style for warning messages
    pub fn warning(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Style for error messages
    pub fn error(s: &str) -> ColoredString {
        s.red().bold()
    }

    /// Style for dim/secondary text
    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }

    /// Style for similarity scores and distances
    pub fn score(s: &str) -> ColoredString {
        s.magenta()
    }

    /// Style for rank numbers
    pub fn rank(s: &str) -> ColoredString {
        s.green().bold()
    }

    pub fn status(status: SessionStatus) -> ColoredString {
        let s = status.as_str();
        match status {
            SessionStatus::Idle => s.dimmed(),
            SessionStatus::Loading => s.yellow(),
            SessionStatus::Ready => s.green().bold(),
            SessionStatus::Error => s.red().bold(),
        }
    }
}

/// Format bytes into human-readable size
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    let gb_val = bytes as f64 / GB as f64;
    let mb_val = bytes as f64 / MB as f64;
    let kb_val = bytes as f64 / KB as f64;

    if bytes >= GB {
        format!("{gb_val:.1} GB")
    } else if bytes >= MB {
        format!("{mb_val:.1} MB")
    } else if bytes >= KB {
        format!("{kb_val:.1} KB")
    } else {
        format!("{bytes} B")
    }
}

/// Format duration into human-readable string
pub fn format_duration(secs: f64) -> String {
    if secs >= 60.0 {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs - (mins * 60.0);
        format!("{mins:.0}m {remaining_secs:.1}s")
    } else if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        let ms = secs * 1000.0;
        format!("{ms:.0}ms")
    }
}

/// Format a distance in meters
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{meters:.0} m")
    }
}

/// Format relative time (e.g., "2h ago", "3d ago")
pub fn format_relative_time(timestamp: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let duration = now.signed_duration_since(*timestamp);

    let secs = duration.num_seconds();
    if secs < 0 {
        return "in the future".to_string();
    }

    let mins = duration.num_minutes();
    let hours = duration.num_hours();
    let days = duration.num_days();

    if days > 0 {
        format!("{days}d ago")
    } else if hours > 0 {
        format!("{hours}h ago")
    } else if mins > 0 {
        format!("{mins}m ago")
    } else {
        "just now".to_string()
    }
}

/// Main display line for a result in the active language
pub fn result_title(result: &GeocodingResult, language: Language) -> String {
    if let Some(full) = language.pick(
        result.full_address_en.as_deref(),
        result.full_address_ar.as_deref(),
    ) {
        return full.to_string();
    }

    let parts: Vec<&str> = [
        result.number.as_deref(),
        result.street.as_deref(),
        language.pick(result.district_en.as_deref(), result.district_ar.as_deref()),
        result.city.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        format!("{:.5}, {:.5}", result.latitude, result.longitude)
    } else {
        parts.join(", ")
    }
}

/// Print ranked geocoding results
pub fn print_results(results: &[GeocodingResult], language: Language) {
    for (i, result) in results.iter().enumerate() {
        let mut metrics = Vec::new();
        if let Some(distance) = result.distance_m {
            metrics.push(format_distance(distance));
        }
        if let Some(similarity) = result.similarity {
            metrics.push(format!("similarity {similarity:.2}"));
        }
        let metrics = if metrics.is_empty() {
            String::new()
        } else {
            format!(" {}", colors::score(&format!("({})", metrics.join(", "))))
        };

        println!(
            "[{}] {}{}",
            colors::rank(&(i + 1).to_string()),
            result_title(result, language),
            metrics
        );

        let mut details = Vec::new();
        if let Some(postcode) = &result.postcode {
            details.push(format!("postcode {postcode}"));
        }
        if let Some(number) = &result.number {
            details.push(format!("no. {number}"));
        }
        let region = language.pick(result.region_en.as_deref(), result.region_ar.as_deref());
        if let Some(region) = region {
            details.push(region.to_string());
        }
        if !details.is_empty() {
            println!("    {}", colors::dim(&details.join(" · ")));
        }
        println!(
            "    {}",
            colors::coord(&format!("{:.6}, {:.6}", result.latitude, result.longitude))
        );
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{}", colors::success(message));
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{}: {}", colors::warning("Warning"), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{}: {}", colors::error("Error"), message);
}

const NOTICE_WIDTH: usize = 80;

/// Place a notification on the anchored side of the line
pub fn anchor_notice(message: &str, anchor: Anchor) -> String {
    match anchor {
        Anchor::BottomRight => format!("{:>width$}", message, width = NOTICE_WIDTH),
        Anchor::BottomLeft => message.to_string(),
    }
}

/// Print a notification to stderr
pub fn print_notice(message: &str, anchor: Anchor) {
    eprintln!("{}", anchor_notice(message, anchor));
}
