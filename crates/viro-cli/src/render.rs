//! Terminal rendering of session state.

use chrono::Local;
use colored::Colorize;
use viro_core::history::{HistoryEntry, TopicGroup};

fn timestamp(entry: &HistoryEntry) -> String {
    entry
        .created_at()
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Formats grouped history as lines: a header per topic, then one line
/// per entry with the position `show` and `delete` expect. Results are
/// cut to their first line.
pub fn history_lines(groups: &[TopicGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!("{} ({})", group.topic, group.entries.len()));
        for positioned in &group.entries {
            let preview = positioned.entry.result().lines().next().unwrap_or_default();
            lines.push(format!(
                "  [{}] {} {}",
                positioned.position,
                timestamp(&positioned.entry),
                preview
            ));
        }
    }
    lines
}

/// Formats one entry in full: a header, then every line of the result.
pub fn entry_lines(position: usize, entry: &HistoryEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "[{}] {} ({})",
        position,
        entry.topic(),
        timestamp(entry)
    )];
    lines.extend(entry.result().lines().map(str::to_string));
    lines
}

pub fn print_entry(position: usize, entry: &HistoryEntry) {
    let lines = entry_lines(position, entry);
    let (header, body) = lines.split_at(1);
    println!("{}", header[0].bright_cyan().bold());
    print_result(&body.join("\n"));
}

pub fn print_history(groups: &[TopicGroup]) {
    if groups.is_empty() {
        println!("{}", "Historial vacío".bright_black());
        return;
    }
    println!("{}", "Historial".bright_magenta().bold());
    for line in history_lines(groups) {
        if line.starts_with("  ") {
            println!("{}", line);
        } else {
            println!("{}", line.bright_cyan().bold());
        }
    }
}

pub fn print_result(text: &str) {
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}

pub fn print_info(message: &str) {
    println!("{}", message.bright_black());
}
