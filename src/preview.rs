//! Dry-run rendering.
//!
//! Kept out of the core so stripping can be used as a library without
//! printing side effects.

use std::collections::BTreeSet;

use colored::Colorize;

use crate::comments::{FileOutcome, LineKind, LineOutcome};
use crate::diff::LineRangeSet;

/// Running counts across a dry run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub files: usize,
    pub changed: usize,
    pub kept: usize,
    pub preserved: usize,
}

impl Totals {
    pub fn add(&mut self, outcome: &FileOutcome) {
        self.files += 1;
        self.changed += outcome.changed_count();
        self.kept += outcome.count(LineKind::Kept);
        self.preserved += outcome.count(LineKind::Preserved);
    }
}

/// Print the per-line changes of one file plus its summary.
pub fn print_preview(
    display_path: &str,
    outcome: &FileOutcome,
    ranges: Option<&LineRangeSet>,
    context_lines: usize,
) {
    match ranges {
        None => println!("\n{} {}\n", "Preview:".yellow(), display_path),
        Some(ranges) => {
            println!("\n{} {}", "Git Preview:".yellow(), display_path);
            if ranges.is_whole_file() {
                println!("{}", "Processing entire file (untracked)".blue());
            } else {
                println!("{} {} line ranges", "Processing".blue(), ranges.ranges().len());
            }
            println!();
        }
    }

    let notable: Vec<&LineOutcome> = outcome
        .lines
        .iter()
        .filter(|l| l.kind != LineKind::Kept)
        .collect();

    if notable.is_empty() {
        println!("{} No comments found to remove\n", "→".bright_black());
        return;
    }

    if context_lines == 0 {
        for line in notable {
            print_line(line);
        }
    } else {
        print_with_context(outcome, context_lines);
    }

    let changed = outcome.changed_count();
    let preserved = outcome.count(LineKind::Preserved);

    println!("\n{}", "-".repeat(50));
    println!("{} {} lines would be changed", "~".yellow(), changed);
    println!(
        "{} {} lines would be kept",
        "✓".green(),
        outcome.count(LineKind::Kept)
    );
    if preserved > 0 {
        println!("{} {} comments would be preserved", "P".cyan(), preserved);
    }
    println!();
}

fn print_line(line: &LineOutcome) {
    let number = format!("{:4}", line.number).bright_black();
    match line.kind {
        LineKind::Removed => {
            println!("{} {} {}", number, "-".red(), line.original.red().strikethrough());
        }
        LineKind::Modified => {
            let new = line.stripped.output(&line.original).unwrap_or_default();
            println!("{} {} {}", number, "~".red(), line.original.red().strikethrough());
            println!("{} {} {}", number, "+".green(), new.green());
        }
        LineKind::Preserved => println!("{} {} {}", number, "P".cyan(), line.original),
        LineKind::Kept => println!("{}   {}", number, line.original.dimmed()),
    }
}

/// Line numbers (1-based) to show: every notable line and `context` lines
/// around it.
fn visible_lines(outcome: &FileOutcome, context: usize) -> BTreeSet<usize> {
    let last = outcome.lines.len();
    let mut visible = BTreeSet::new();

    for line in outcome.lines.iter().filter(|l| l.kind != LineKind::Kept) {
        let from = line.number.saturating_sub(context).max(1);
        let to = (line.number + context).min(last);
        visible.extend(from..=to);
    }

    visible
}

fn print_with_context(outcome: &FileOutcome, context: usize) {
    let mut previous: Option<usize> = None;

    for number in visible_lines(outcome, context) {
        if let Some(prev) = previous
            && number > prev + 1
        {
            println!("{}", "  ...".bright_black());
        }
        print_line(&outcome.lines[number - 1]);
        previous = Some(number);
    }
}

/// Summary printed after a git-scoped dry run.
pub fn print_totals(totals: &Totals) {
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("{}", "GIT PROCESSING TOTALS".blue());
    println!("{rule}");
    println!("{} {} files processed", "#".blue(), totals.files);
    println!("{} {} lines would be changed", "~".yellow(), totals.changed);
    println!("{} {} lines would be kept", "✓".green(), totals.kept);
    if totals.preserved > 0 {
        println!(
            "{} {} comments would be preserved",
            "P".cyan(),
            totals.preserved
        );
    }
    println!("{rule}");
}
