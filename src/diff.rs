//! Unified-diff hunk parsing and the per-line processing gate.

use std::sync::LazyLock;

use regex::Regex;

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@@\s+-(\d+)(?:,(\d+))?\s+\+(\d+)(?:,(\d+))?\s+@@")
        .expect("hunk header regex is valid")
});

/// Inclusive, 1-based range of lines in the new version of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line <= self.end
    }
}

/// Extract the added/modified line ranges from `git diff --unified=0` output.
///
/// Pure-deletion hunks (new count 0) produce nothing. Headers whose numbers
/// do not parse are skipped.
pub fn parse_diff(diff: &str) -> Vec<LineRange> {
    let mut ranges = Vec::new();

    for line in diff.lines() {
        let Some(caps) = HUNK_HEADER.captures(line) else {
            continue;
        };

        let Ok(new_start) = caps[3].parse::<usize>() else {
            continue;
        };

        let new_count = match caps.get(4) {
            None => 1,
            Some(m) => match m.as_str().parse::<usize>() {
                Ok(n) => n,
                Err(_) => continue,
            },
        };

        if new_count > 0 {
            ranges.push(LineRange::new(
                new_start,
                new_start.saturating_add(new_count - 1),
            ));
        }
    }

    ranges
}

/// True iff `line` falls inside any of `ranges`.
pub fn is_in_range(line: usize, ranges: &[LineRange]) -> bool {
    ranges.iter().any(|r| r.contains(line))
}

/// Line ranges to process in one file.
///
/// An empty set means the whole file, not "no lines". A tracked file whose
/// diff holds only deletion hunks therefore parses to the whole file too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRangeSet {
    ranges: Vec<LineRange>,
}

impl LineRangeSet {
    pub fn whole_file() -> Self {
        Self::default()
    }

    pub fn new(ranges: Vec<LineRange>) -> Self {
        Self { ranges }
    }

    pub fn from_diff(diff: &str) -> Self {
        Self::new(parse_diff(diff))
    }

    pub fn is_whole_file(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[LineRange] {
        &self.ranges
    }

    /// Gate for the scanner: process every line when empty, otherwise only
    /// lines inside a range.
    pub fn should_process(&self, line: usize) -> bool {
        self.is_whole_file() || is_in_range(line, &self.ranges)
    }

    /// Union with another set. Whole-file absorbs everything.
    pub fn merge(&mut self, other: LineRangeSet) {
        if self.is_whole_file() {
            return;
        }
        if other.is_whole_file() {
            self.ranges.clear();
            return;
        }
        self.ranges.extend(other.ranges);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_change() {
        let diff = "@@ -10,1 +10,1 @@\n-old line\n+new line";
        assert_eq!(parse_diff(diff), vec![LineRange::new(10, 10)]);
    }

    #[test]
    fn addition_range_is_inclusive() {
        let diff = "@@ -5,0 +5,3 @@\n+line 1\n+line 2\n+line 3";
        assert_eq!(parse_diff(diff), vec![LineRange::new(5, 7)]);
    }

    #[test]
    fn multiple_hunks_in_order() {
        let diff = "diff --git a/x.py b/x.py\n\
                    index 123..456 100644\n\
                    --- a/x.py\n\
                    +++ b/x.py\n\
                    @@ -10,1 +10,1 @@ def foo():\n\
                    -old line\n\
                    +new line\n\
                    @@ -20,0 +20,2 @@\n\
                    +added line 1\n\
                    +added line 2";
        assert_eq!(
            parse_diff(diff),
            vec![LineRange::new(10, 10), LineRange::new(20, 21)]
        );
    }

    #[test]
    fn pure_deletion_yields_nothing() {
        let diff = "@@ -10,2 +10,0 @@\n-deleted line 1\n-deleted line 2";
        assert!(parse_diff(diff).is_empty());
    }

    #[test]
    fn missing_counts_default_to_one() {
        assert_eq!(
            parse_diff("@@ -10 +10 @@\n-old\n+new"),
            vec![LineRange::new(10, 10)]
        );
    }

    #[test]
    fn empty_and_malformed_input_yield_nothing() {
        assert!(parse_diff("").is_empty());
        assert!(parse_diff("@@ -a,b +c,d @@").is_empty());
        assert!(parse_diff("@@ -1,1 +99999999999999999999999,1 @@").is_empty());
    }

    #[test]
    fn is_in_range_is_inclusive_on_both_ends() {
        let ranges = [LineRange::new(5, 7), LineRange::new(20, 20)];
        assert!(!is_in_range(4, &ranges));
        assert!(is_in_range(5, &ranges));
        assert!(is_in_range(7, &ranges));
        assert!(!is_in_range(8, &ranges));
        assert!(is_in_range(20, &ranges));
    }

    #[test]
    fn empty_set_processes_every_line() {
        let set = LineRangeSet::whole_file();
        assert!(set.should_process(1));
        assert!(set.should_process(1_000_000));
        assert!(set.should_process(usize::MAX));
    }

    #[test]
    fn non_empty_set_gates_by_range() {
        let set = LineRangeSet::from_diff("@@ -3,0 +3,2 @@");
        assert!(!set.should_process(2));
        assert!(set.should_process(3));
        assert!(set.should_process(4));
        assert!(!set.should_process(5));
    }

    #[test]
    fn deletion_only_diff_gates_whole_file() {
        let set = LineRangeSet::from_diff("@@ -4,2 +3,0 @@\n-gone\n-gone");
        assert!(set.is_whole_file());
        assert!(set.should_process(1));
    }

    #[test]
    fn merge_with_whole_file_becomes_whole_file() {
        let mut set = LineRangeSet::new(vec![LineRange::new(1, 2)]);
        set.merge(LineRangeSet::new(vec![LineRange::new(8, 9)]));
        assert_eq!(set.ranges().len(), 2);
        assert!(set.should_process(9));

        set.merge(LineRangeSet::whole_file());
        assert!(set.is_whole_file());
    }
}
