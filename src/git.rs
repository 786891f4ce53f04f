//! Change discovery through the `git` executable.
//!
//! Each call shells out synchronously; a failing command aborts the whole
//! git-scoped run.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::diff::LineRangeSet;
use crate::error::ShushError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
    /// Staged, unstaged and untracked.
    All,
    Staged,
    /// Unstaged modifications plus untracked files.
    Unstaged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Staged,
    Unstaged,
    Untracked,
}

/// A changed file and the lines touched in it, relative to the repo root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub status: FileStatus,
    pub ranges: LineRangeSet,
}

/// A git working tree rooted at `root`.
#[derive(Debug, Clone)]
pub struct Repo {
    root: PathBuf,
}

impl Repo {
    /// Find the repository containing `cwd`.
    pub fn discover(cwd: &Path) -> Result<Self, ShushError> {
        let out = run_git(cwd, &["rev-parse", "--show-toplevel"])
            .map_err(|_| ShushError::NotARepository)?;
        let root = out.trim();
        if root.is_empty() {
            return Err(ShushError::NotARepository);
        }
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn changes(&self, scope: ChangeScope) -> Result<Vec<FileChange>, ShushError> {
        match scope {
            ChangeScope::Staged => self.staged_changes(),
            ChangeScope::Unstaged => self.unstaged_changes(),
            ChangeScope::All => {
                let mut all = self.staged_changes()?;
                all.extend(self.unstaged_changes()?);
                Ok(merge_changes(all))
            }
        }
    }

    pub fn staged_changes(&self) -> Result<Vec<FileChange>, ShushError> {
        let names = run_git(&self.root, &["diff", "--cached", "--name-only"])?;
        split_names(&names)
            .map(|file| {
                Ok::<_, ShushError>(FileChange {
                    ranges: self.changed_ranges(file, true)?,
                    path: PathBuf::from(file),
                    status: FileStatus::Staged,
                })
            })
            .collect()
    }

    pub fn unstaged_changes(&self) -> Result<Vec<FileChange>, ShushError> {
        let names = run_git(&self.root, &["diff", "--name-only"])?;
        let mut changes = split_names(&names)
            .map(|file| {
                Ok::<_, ShushError>(FileChange {
                    ranges: self.changed_ranges(file, false)?,
                    path: PathBuf::from(file),
                    status: FileStatus::Unstaged,
                })
            })
            .collect::<Result<Vec<_>, ShushError>>()?;

        let untracked = run_git(&self.root, &["ls-files", "--others", "--exclude-standard"])?;
        changes.extend(split_names(&untracked).map(|file| FileChange {
            path: PathBuf::from(file),
            status: FileStatus::Untracked,
            ranges: LineRangeSet::whole_file(),
        }));

        Ok(changes)
    }

    fn changed_ranges(&self, file: &str, staged: bool) -> Result<LineRangeSet, ShushError> {
        let mut args = vec!["diff"];
        if staged {
            args.push("--cached");
        }
        args.extend(["--unified=0", "--", file]);

        let diff = run_git(&self.root, &args)?;
        let ranges = LineRangeSet::from_diff(&diff);
        debug!(file, hunks = ranges.ranges().len(), "parsed diff");
        Ok(ranges)
    }
}

/// Collapse duplicate paths, unioning their ranges. Untracked wins.
fn merge_changes(changes: Vec<FileChange>) -> Vec<FileChange> {
    let mut merged: Vec<FileChange> = Vec::with_capacity(changes.len());

    for change in changes {
        match merged.iter_mut().find(|c| c.path == change.path) {
            Some(existing) => {
                if change.status == FileStatus::Untracked {
                    existing.status = FileStatus::Untracked;
                }
                existing.ranges.merge(change.ranges);
            }
            None => merged.push(change),
        }
    }

    merged
}

fn split_names(output: &str) -> impl Iterator<Item = &str> {
    output.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn run_git(dir: &Path, args: &[&str]) -> Result<String, ShushError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| ShushError::GitCommand {
            args: args.join(" "),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ShushError::GitCommand {
            args: args.join(" "),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
