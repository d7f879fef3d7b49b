use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::egress::{format_bytes, EgressLogEntry, EgressSummary, OperationKind};
use crate::results::{classify_maturity, derive_best_worst, DiagnosticResult, MaturityTier, PerformanceBand};
use crate::scoring::PillarScore;

const BAR_WIDTH: usize = 20;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a score with at most one decimal ("15", "12.5")
pub fn format_score(score: f64) -> String {
    let formatted = format!("{:.1}", score);
    formatted
        .strip_suffix(".0")
        .map(str::to_string)
        .unwrap_or(formatted)
}

/// Format a percentage with no decimals ("75%")
pub fn format_percentage(percentage: f64) -> String {
    format!("{:.0}%", percentage)
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// Horizontal bar for a 0..100 percentage
fn percentage_bar(percentage: f64) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn paint_band(text: &str, band: PerformanceBand, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match band {
        PerformanceBand::Strong => text.green().to_string(),
        PerformanceBand::Good => text.cyan().to_string(),
        PerformanceBand::Fair => text.yellow().to_string(),
        PerformanceBand::Weak => text.red().to_string(),
    }
}

fn paint_tier(tier: MaturityTier, use_colors: bool) -> String {
    let label = tier.label().to_uppercase();
    if !use_colors {
        return label;
    }
    match tier {
        MaturityTier::Initial => label.red().bold().to_string(),
        MaturityTier::Developing => label.yellow().bold().to_string(),
        MaturityTier::Consolidated => label.green().bold().to_string(),
    }
}

/// One pillar line: name, bar, score/max and percentage
fn format_pillar_line(pillar: &PillarScore, name_width: usize, use_colors: bool) -> String {
    let band = PerformanceBand::from_percentage(pillar.percentage_score);
    format!(
        "  {:<width$}  {}  {:>5}/{:<5} {:>4}",
        pillar.pillar_name,
        paint_band(&percentage_bar(pillar.percentage_score), band, use_colors),
        format_score(pillar.score),
        format_score(pillar.max_possible_score),
        format_percentage(pillar.percentage_score),
        width = name_width
    )
}

/// Full diagnostic report for one result.
///
/// Pillars are listed in stored (catalog) order. Best/worst and the
/// recommendation are derived from the result on every call.
pub fn format_report(result: &DiagnosticResult, use_colors: bool) -> String {
    // Reports classify the total as shown to the reader, in whole points
    let maturity = classify_maturity(result.total_score().round());
    let mut lines = Vec::new();

    let title = format!("Diagnostic report: {}", result.company.name);
    lines.push(if use_colors { title.bold().to_string() } else { title });

    let mut details = vec![format!("  Date: {}", result.date.format("%Y-%m-%d %H:%M UTC"))];
    if let Some(ref sector) = result.company.sector {
        details.push(format!("  Sector: {}", sector));
    }
    if let Some(ref id) = result.id {
        details.push(format!("  Id: {}", id));
    }
    lines.extend(details);
    lines.push(String::new());

    lines.push(format!(
        "Total score: {} / {} ({})",
        format_score(result.total_score()),
        format_score(result.scores.max_possible_score),
        format_percentage(result.percentage_score())
    ));
    lines.push(format!("Maturity: {}", paint_tier(maturity.tier, use_colors)));
    lines.push(format!("  {}", maturity.description));
    lines.push(String::new());

    if !result.scores.pillar_scores.is_empty() {
        lines.push("Pillars:".to_string());
        let name_width = result
            .scores
            .pillar_scores
            .iter()
            .map(|p| p.pillar_name.chars().count())
            .max()
            .unwrap_or(0);
        for pillar in &result.scores.pillar_scores {
            lines.push(format_pillar_line(pillar, name_width, use_colors));
        }
        lines.push(String::new());
    }

    if let Some(best_worst) = derive_best_worst(result) {
        lines.push(format!(
            "Strongest pillar: {} ({})",
            best_worst.best.pillar_name,
            format_percentage(best_worst.best.percentage_score)
        ));
        lines.push(format!(
            "Weakest pillar: {} ({})",
            best_worst.worst.pillar_name,
            format_percentage(best_worst.worst.percentage_score)
        ));
        lines.push(String::new());
        lines.push("Recommendation:".to_string());
        lines.push(format!(
            "  Start with {} and keep building on {}. {}",
            best_worst.worst.pillar_name,
            best_worst.best.pillar_name,
            maturity.tier.recommendation()
        ));
    } else {
        lines.push("Recommendation:".to_string());
        lines.push(format!("  {}", maturity.tier.recommendation()));
    }

    lines.join("\n")
}

/// Format stored results as one numbered line each:
/// index, date, age, score, percentage, tier, company
pub fn format_results_list(results: &[DiagnosticResult], now: DateTime<Utc>, use_colors: bool) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let term_width = get_terminal_width();

    results
        .iter()
        .enumerate()
        .map(|(idx, result)| {
            let index_str = format!("{:>2}.", idx + 1);
            let date = result.date.format("%Y-%m-%d").to_string();
            let age = format_age(now.signed_duration_since(result.date));
            let score = format!("{:>6}", format_score(result.total_score()));
            let percentage = format!("{:>4}", format_percentage(result.percentage_score()));
            let tier = MaturityTier::for_score(result.total_score().round());
            let tier_str = format!("{:<12}", tier.label().to_uppercase());

            // index + date + age + score + percentage + tier + separators
            let fixed_width = 3 + 1 + 10 + 2 + 4 + 2 + 6 + 2 + 4 + 2 + 12 + 2;
            let company = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate(&result.company.name, width - fixed_width)
                }
                Some(_) => truncate(&result.company.name, 20),
                None => result.company.name.clone(),
            };

            if use_colors {
                format!(
                    "{} {}  {:>4}  {}  {}  {}  {}",
                    index_str.dimmed(),
                    date,
                    age.dimmed(),
                    score.bold(),
                    percentage,
                    paint_tier_padded(tier, &tier_str),
                    company
                )
            } else {
                format!(
                    "{} {}  {:>4}  {}  {}  {}  {}",
                    index_str, date, age, score, percentage, tier_str, company
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn paint_tier_padded(tier: MaturityTier, padded: &str) -> String {
    match tier {
        MaturityTier::Initial => padded.red().to_string(),
        MaturityTier::Developing => padded.yellow().to_string(),
        MaturityTier::Consolidated => padded.green().to_string(),
    }
}

/// Egress usage over a window, one line per operation kind seen
pub fn format_egress_summary(summary: &EgressSummary, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let title = format!("Egress ({})", summary.window_description);
    lines.push(if use_colors { title.bold().to_string() } else { title });
    lines.push(format!(
        "  Total: {} ({:.2} MB, {:.4} GB)",
        format_bytes(summary.total_bytes),
        summary.total_mb,
        summary.total_gb
    ));

    if summary.per_operation.is_empty() {
        lines.push("  No egress recorded.".to_string());
        return lines.join("\n");
    }

    lines.push(String::new());
    for (operation, stats) in &summary.per_operation {
        let label = format!("{:<14}", operation.label());
        lines.push(format!(
            "  {}  {:>6} ops  {:>10}",
            if use_colors { label.cyan().to_string() } else { label },
            stats.count,
            format_bytes(stats.bytes)
        ));
    }

    lines.join("\n")
}

/// Log entries as one line each: time, operation, size, endpoint
pub fn format_egress_entries(entries: &[&EgressLogEntry], use_colors: bool) -> String {
    if entries.is_empty() {
        return "No egress entries found.".to_string();
    }

    entries
        .iter()
        .map(|entry| {
            let time = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
            let operation = format!("{:<13}", entry.operation.as_str());
            let size = format!("{:>10}", format_bytes(entry.size_bytes));
            let timing = entry
                .response_time_ms
                .map(|ms| format!("  {}ms", ms))
                .unwrap_or_default();
            let failed = entry.status_code >= 400 || entry.error_message.is_some();

            if use_colors {
                let operation = if failed {
                    operation.red().to_string()
                } else {
                    paint_operation(entry.operation, &operation)
                };
                format!("{}  {}  {}  {}{}", time.dimmed(), operation, size.bold(), entry.endpoint, timing)
            } else {
                format!("{}  {}  {}  {}{}", time, operation, size, entry.endpoint, timing)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn paint_operation(operation: OperationKind, text: &str) -> String {
    match operation {
        OperationKind::Read => text.cyan().to_string(),
        OperationKind::Write => text.yellow().to_string(),
        OperationKind::FileExport | OperationKind::FileDownload => text.magenta().to_string(),
        OperationKind::Auth | OperationKind::Settings => text.blue().to_string(),
    }
}
