use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::analyzer::InfraSource;
use crate::pipeline::{PortfolioReport, ScoredRegion};
use crate::scoring::Classification;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score in compact notation (1.5k, 847, 41.4).
/// If degraded is true, appends asterisk: the score rests on partial or
/// neutral infrastructure data.
pub fn format_score(score: f64, degraded: bool) -> String {
    let formatted = if score >= 1_000.0 {
        format!("{:.1}k", score / 1_000.0).replace(".0k", "k")
    } else {
        format!("{:.1}", score)
    };

    if degraded {
        format!("{}*", formatted)
    } else {
        formatted
    }
}

fn classification_tag(classification: Classification, use_colors: bool) -> String {
    if !use_colors {
        return format!("{:<5}", classification.label());
    }
    match classification {
        Classification::Buy => format!("{:<5}", classification.label().green().bold()),
        Classification::Watch => format!("{:<5}", classification.label().yellow()),
        Classification::Pass => format!("{:<5}", classification.label().dimmed()),
    }
}

fn is_degraded(scored: &ScoredRegion) -> bool {
    !matches!(
        scored.infrastructure.map(|a| a.source),
        Some(InfraSource::Live) | Some(InfraSource::Fallback)
    )
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn format_region_line(index: usize, scored: &ScoredRegion, use_colors: bool) -> String {
    let score = format_score(scored.result.final_score, is_degraded(scored));
    let tag = classification_tag(scored.result.classification, use_colors);

    // Index 3 chars, score 7 chars; the rest of the line gets the name.
    let name_width = get_terminal_width()
        .map(|w| w.saturating_sub(3 + 1 + 7 + 2 + 5 + 2 + scored.region.key.len() + 3))
        .unwrap_or(usize::MAX)
        .max(12);
    let name = truncate_name(scored.region.display_name(), name_width);

    if use_colors {
        format!(
            "{:>3} {:>7}  {} {} ({})",
            format!("{}.", index),
            score,
            tag,
            name.bold(),
            scored.region.key.cyan()
        )
    } else {
        format!(
            "{:>3} {:>7}  {} {} ({})",
            format!("{}.", index),
            score,
            tag,
            name,
            scored.region.key
        )
    }
}

/// Format the full three-way report: BUY section first, then WATCH, then
/// PASS, then unscored regions with their reasons, then a summary line.
pub fn format_report(report: &PortfolioReport, use_colors: bool) -> String {
    if report.scored_len() == 0 && report.unscored.is_empty() {
        return "No regions analyzed.".to_string();
    }

    let mut lines = Vec::new();
    let mut index = 0;

    for (title, list) in [
        ("Buy recommendations", &report.buy_recommendations),
        ("Watch list", &report.watch_list),
        ("Pass", &report.pass_list),
    ] {
        if list.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("{}:", title));
        for scored in list {
            index += 1;
            lines.push(format_region_line(index, scored, use_colors));
        }
    }

    if !report.unscored.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Not scored:".to_string());
        for unscored in &report.unscored {
            lines.push(format!("  ! {}: {}", unscored.region.key, unscored.reason));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{} buy / {} watch / {} pass ({} analyzed, {} not scored)",
        report.buy_recommendations.len(),
        report.watch_list.len(),
        report.pass_list.len(),
        report.regions_analyzed.len(),
        report.unscored.len()
    ));

    lines.join("\n")
}

/// Detailed multi-line output for a single region (the `show` subcommand).
pub fn format_region_detail(scored: &ScoredRegion, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let heading = format!(
        "{} ({})",
        scored.region.display_name(),
        scored.region.key
    );
    if use_colors {
        lines.push(heading.bold().to_string());
    } else {
        lines.push(heading);
    }

    match scored.infrastructure {
        Some(assessment) => {
            let record = assessment.record;
            lines.push(format!(
                "  Infrastructure: score {} ({} data) - {} highways, {} airports, {} railways, {} ports",
                record.infra_score,
                assessment.source.label(),
                record.highways,
                record.airports,
                record.railways,
                record.ports
            ));
        }
        None => lines.push("  Infrastructure: no signal (scored neutral)".to_string()),
    }
    lines.push(format!("  Market trend: {:+.1}%", scored.market_trend_pct));

    lines.push(format!("  Base score: {:.1}", scored.result.breakdown.base_score));
    for factor in &scored.result.breakdown.factors {
        lines.push(format!(
            "  {}: {} ({:.1} -> {:.1})",
            factor.label, factor.description, factor.before, factor.after
        ));
    }

    let classification = if use_colors {
        classification_tag(scored.result.classification, true)
    } else {
        scored.result.classification.label().to_string()
    };
    lines.push(format!(
        "  Final: {} -> {}",
        format_score(scored.result.final_score, is_degraded(scored)),
        classification.trim_end()
    ));

    lines.join("\n")
}
