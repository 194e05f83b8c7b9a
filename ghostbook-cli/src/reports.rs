use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use ghostbook_engine::{
    Evidence, Ghost, GhostCatalog, Investigation, SearchHints, Selections, SortOrder, TimerSnapshot,
    TriState, UniqueEvidenceTable, format_clock, is_choice_impossible,
};
use serde::Serialize;
use std::io::Write;

use crate::util::format_number;

#[derive(Debug, Clone, Serialize)]
pub struct GhostRow {
    pub name: String,
    pub evidence: Vec<Evidence>,
    /// Evidence the ghost hides on nightmare difficulty.
    pub nightmare_evidence: Vec<Evidence>,
    pub speed: String,
    pub has_los: Option<bool>,
    pub hunt_sanity: String,
    pub unique_evidence: Vec<String>,
    pub search_match: bool,
}

impl GhostRow {
    fn new(ghost: &Ghost, investigation: &Investigation, table: &UniqueEvidenceTable) -> Self {
        Self {
            name: ghost.name.clone(),
            evidence: ghost.evidence.clone(),
            nightmare_evidence: ghost
                .evidence
                .iter()
                .copied()
                .filter(|ev| ghost.is_nightmare_evidence(*ev))
                .collect(),
            speed: speed_summary(ghost),
            has_los: ghost.has_los,
            hunt_sanity: sanity_summary(ghost),
            unique_evidence: table.for_ghost(&ghost.name).map(|e| e.label.clone()).collect(),
            search_match: investigation.is_search_match(ghost),
        }
    }
}

/// `1.7 m/s`, `1.5-1.9 m/s`, with any alternate speed in brackets.
pub fn speed_summary(ghost: &Ghost) -> String {
    let range = match (ghost.min_speed, ghost.max_speed) {
        (Some(min), Some(max)) if (min - max).abs() < f64::EPSILON => format_number(min),
        (Some(min), Some(max)) => format!("{}-{}", format_number(min), format_number(max)),
        (Some(one), None) | (None, Some(one)) => format_number(one),
        (None, None) => return "varies".to_string(),
    };
    match ghost.alt_speed {
        Some(alt) => format!("{range} m/s (alt {})", format_number(alt)),
        None => format!("{range} m/s"),
    }
}

/// Defined hunt thresholds in low/mid/high order, e.g. `40/60%`.
pub fn sanity_summary(ghost: &Ghost) -> String {
    let parts: Vec<String> = [ghost.hunt_sanity_low, ghost.hunt_sanity, ghost.hunt_sanity_high]
        .into_iter()
        .flatten()
        .map(format_number)
        .collect();
    if parts.is_empty() {
        "unknown".to_string()
    } else {
        format!("{}%", parts.join("/"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterReport {
    pub generated_at: String,
    pub catalog_size: usize,
    pub selections: Selections,
    pub excluded_ghosts: Vec<String>,
    pub search: String,
    pub sort: SortOrder,
    pub ghosts: Vec<GhostRow>,
    pub impossible_evidence: Vec<Evidence>,
    #[serde(skip_serializing_if = "SearchHints::is_empty")]
    pub search_hints: SearchHints,
}

impl FilterReport {
    pub fn build(
        catalog: &GhostCatalog,
        table: &UniqueEvidenceTable,
        investigation: &Investigation,
    ) -> Self {
        let ghosts = investigation
            .visible_ghosts(&catalog.ghosts, table)
            .into_iter()
            .map(|ghost| GhostRow::new(ghost, investigation, table))
            .collect();
        let impossible_evidence = Evidence::ALL
            .into_iter()
            .filter(|ev| investigation.selections.evidence.get(ev) == TriState::Neutral)
            .filter(|ev| is_choice_impossible(*ev, &investigation.selections, &catalog.ghosts, table))
            .collect();
        Self {
            generated_at: Utc::now().to_rfc3339(),
            catalog_size: catalog.len(),
            selections: investigation.selections.clone(),
            excluded_ghosts: investigation.excluded.iter().cloned().collect(),
            search: investigation.search.clone(),
            sort: investigation.sort,
            ghosts,
            impossible_evidence,
            search_hints: investigation.search_hints(&catalog.ghosts, table),
        }
    }
}

pub fn generate_json_report<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

fn active_keys<K: std::fmt::Display>(
    entries: impl Iterator<Item = (K, TriState)>,
) -> Vec<String> {
    entries
        .map(|(key, state)| match state {
            TriState::Excluded => format!("-{key}"),
            _ => format!("+{key}"),
        })
        .collect()
}

fn selection_lines(selections: &Selections) -> Vec<(&'static str, Vec<String>)> {
    vec![
        ("Evidence", active_keys(selections.evidence.active())),
        ("Speed", active_keys(selections.speed.active())),
        ("Sanity", active_keys(selections.sanity.active())),
        ("Unique", active_keys(selections.unique.active())),
    ]
    .into_iter()
    .filter(|(_, keys)| !keys.is_empty())
    .collect()
}

fn evidence_list(evidence: &[Evidence]) -> String {
    evidence.iter().map(|e| e.tag()).collect::<Vec<_>>().join(", ")
}

/// Card evidence with nightmare-hidden entries starred.
fn card_evidence(ghost: &GhostRow) -> String {
    ghost
        .evidence
        .iter()
        .map(|ev| {
            if ghost.nightmare_evidence.contains(ev) {
                format!("{}*", ev.tag())
            } else {
                ev.tag().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn generate_console_report(
    out: &mut dyn Write,
    report: &FilterReport,
    verbose: bool,
) -> Result<()> {
    writeln!(out, "{}", "👻 Ghostbook Filter Results".bright_cyan().bold())?;
    writeln!(out, "{}", "===========================".cyan())?;
    for (facet, keys) in selection_lines(&report.selections) {
        writeln!(out, "{facet}: {}", keys.join(", "))?;
    }
    if !report.excluded_ghosts.is_empty() {
        writeln!(out, "Ruled out: {}", report.excluded_ghosts.join(", ").red())?;
    }
    if !report.search.is_empty() {
        writeln!(out, "Search: \"{}\"", report.search)?;
    }
    writeln!(
        out,
        "Remaining: {}/{} (sorted by {})",
        report.ghosts.len().to_string().green(),
        report.catalog_size,
        report.sort
    )?;
    writeln!(out)?;

    for ghost in &report.ghosts {
        let name = if ghost.search_match {
            ghost.name.bright_yellow().bold()
        } else {
            ghost.name.bold()
        };
        writeln!(out, "• {name}  [{}]", card_evidence(ghost))?;
        if verbose {
            writeln!(out, "   Speed: {}", ghost.speed)?;
            writeln!(out, "   Hunt sanity: {}", ghost.hunt_sanity)?;
            for tell in &ghost.unique_evidence {
                writeln!(out, "   ◦ {}", tell.dimmed())?;
            }
        }
    }
    if report.ghosts.is_empty() {
        writeln!(out, "{}", "No ghost matches these selections.".yellow())?;
    }

    if !report.impossible_evidence.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "Impossible evidence: {}",
            evidence_list(&report.impossible_evidence).red()
        )?;
    }
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &FilterReport) -> Result<()> {
    writeln!(out, "# Ghostbook Filter Results\n")?;
    writeln!(out, "_Generated {}_\n", report.generated_at)?;
    writeln!(out, "## Selections\n")?;
    let lines = selection_lines(&report.selections);
    if lines.is_empty() {
        writeln!(out, "- _none_")?;
    }
    for (facet, keys) in lines {
        writeln!(out, "- **{facet}**: {}", keys.join(", "))?;
    }
    if !report.excluded_ghosts.is_empty() {
        writeln!(out, "- **Ruled out**: {}", report.excluded_ghosts.join(", "))?;
    }
    if !report.search.is_empty() {
        writeln!(out, "- **Search**: {}", report.search)?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "## Remaining ghosts ({}/{})\n",
        report.ghosts.len(),
        report.catalog_size
    )?;
    if report.ghosts.is_empty() {
        writeln!(out, "_No ghost matches these selections._")?;
    } else {
        writeln!(out, "| Ghost | Evidence | Speed | Hunt sanity |")?;
        writeln!(out, "| --- | --- | --- | --- |")?;
        for ghost in &report.ghosts {
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                ghost.name,
                card_evidence(ghost),
                ghost.speed,
                ghost.hunt_sanity
            )?;
        }
        if report.ghosts.iter().any(|g| !g.nightmare_evidence.is_empty()) {
            writeln!(out, "\n\\* hidden on nightmare")?;
        }
    }
    if !report.impossible_evidence.is_empty() {
        writeln!(
            out,
            "\n**Impossible evidence**: {}",
            evidence_list(&report.impossible_evidence)
        )?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct UniqueRow {
    pub id: String,
    pub label: String,
    pub ghosts: Vec<String>,
    pub state: TriState,
    pub filtered_out: bool,
    pub label_match: bool,
}

/// The unique-evidence panel for `investigation`, in display order.
pub fn unique_rows(
    catalog: &GhostCatalog,
    table: &UniqueEvidenceTable,
    investigation: &Investigation,
    label_query: &str,
) -> Vec<UniqueRow> {
    investigation
        .unique_evidence_rows(&catalog.ghosts, table, label_query)
        .into_iter()
        .map(|row| UniqueRow {
            id: row.entry.id.clone(),
            label: row.entry.label.clone(),
            ghosts: row.entry.ghosts().map(str::to_string).collect(),
            state: row.state,
            filtered_out: row.filtered_out,
            label_match: row.label_match,
        })
        .collect()
}

fn state_marker(state: TriState) -> &'static str {
    match state {
        TriState::Included => "+",
        TriState::Excluded => "-",
        TriState::Neutral => " ",
    }
}

pub fn generate_unique_console(out: &mut dyn Write, rows: &[UniqueRow]) -> Result<()> {
    writeln!(out, "{}", "🔎 Unique Evidence".bright_cyan().bold())?;
    writeln!(out, "{}", "==================".cyan())?;
    for row in rows {
        let line = format!(
            "{} {:24} {} → {}",
            state_marker(row.state),
            row.id,
            row.label,
            row.ghosts.join(", ")
        );
        if row.filtered_out {
            writeln!(out, "{}", line.dimmed())?;
        } else if row.label_match {
            writeln!(out, "{}", line.bright_yellow().bold())?;
        } else {
            writeln!(out, "{line}")?;
        }
    }
    if rows.is_empty() {
        writeln!(out, "{}", "No unique evidence listed.".yellow())?;
    }
    Ok(())
}

pub fn generate_unique_markdown(out: &mut dyn Write, rows: &[UniqueRow]) -> Result<()> {
    writeln!(out, "# Unique Evidence\n")?;
    writeln!(out, "| Id | Tell | Ghosts | Selected | Status |")?;
    writeln!(out, "| --- | --- | --- | --- | --- |")?;
    for row in rows {
        let selected = match row.state {
            TriState::Included => "included",
            TriState::Excluded => "excluded",
            TriState::Neutral => "",
        };
        let status = if row.filtered_out {
            "ruled out"
        } else if row.label_match {
            "match"
        } else {
            ""
        };
        writeln!(
            out,
            "| `{}` | {} | {} | {selected} | {status} |",
            row.id,
            row.label,
            row.ghosts.join(", ")
        )?;
    }
    Ok(())
}

fn snapshot_status(snapshot: &TimerSnapshot) -> String {
    if snapshot.is_finished() {
        "finished".to_string()
    } else if snapshot.is_paused() {
        "paused".to_string()
    } else if snapshot.is_stopped() {
        "stopped".to_string()
    } else if snapshot.is_reset() {
        "reset".to_string()
    } else {
        snapshot
            .time_left
            .map_or_else(|| "-".to_string(), format_clock)
    }
}

pub fn generate_timer_console(out: &mut dyn Write, timeline: &[TimerSnapshot]) -> Result<()> {
    writeln!(out, "{}", "⏱️  Ghostbook Timers".bright_cyan().bold())?;
    writeln!(out, "{}", "===================".cyan())?;
    for snapshot in timeline.iter().filter(|s| s.is_finished()) {
        writeln!(
            out,
            "{} finished after {}",
            snapshot.timer_id.green(),
            format_clock(snapshot.total_elapsed.unwrap_or_default())
        )?;
    }
    writeln!(out, "Updates received: {}", timeline.len())?;
    Ok(())
}

pub fn generate_timer_markdown(out: &mut dyn Write, timeline: &[TimerSnapshot]) -> Result<()> {
    writeln!(out, "# Ghostbook Timers\n")?;
    writeln!(out, "| Timer | Left | Elapsed | Status |")?;
    writeln!(out, "| --- | --- | --- | --- |")?;
    for snapshot in timeline {
        writeln!(
            out,
            "| {} | {} | {} | {} |",
            snapshot.timer_id,
            snapshot.time_left.map_or_else(|| "-".to_string(), format_clock),
            snapshot.total_elapsed.map_or_else(|| "-".to_string(), format_clock),
            snapshot_status(snapshot)
        )?;
    }
    Ok(())
}
