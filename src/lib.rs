use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::{DirEntry, WalkBuilder};
use tracing::{debug, info, warn};

pub mod comments;
pub mod config;
pub mod diff;
pub mod error;
pub mod git;
pub mod hooks;
pub mod languages;
pub mod preserve;
pub mod preview;

use crate::comments::{FileOutcome, LineScanner, StripOptions, strip_source};
use crate::config::LoadedConfig;
use crate::diff::LineRangeSet;
use crate::error::ShushError;
use crate::git::{ChangeScope, Repo};
use crate::languages::{describe_rule, is_supported_path, language_for_path, language_name_for_path};
use crate::preserve::PreserveRules;
use crate::preview::Totals;

/// Project-level ignore file, read alongside `.gitignore`.
pub const IGNORE_FILE_NAME: &str = ".shushignore";

/// What to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A file, or a directory of files.
    Path(PathBuf),
    /// Only lines changed in git.
    Git(ChangeScope),
}

/// Configuration passed from the CLI layer (main.rs) into the core logic.
#[derive(Debug)]
pub struct RunConfig {
    pub target: Target,
    pub recursive: bool,
    pub options: StripOptions,
    pub dry_run: bool,
    pub backup: bool,
    /// Overrides `context_lines` from the config file.
    pub context_lines: Option<usize>,
    pub excludes: Vec<String>,
    pub no_gitignore: bool,
}

/// Settings shared by every file of one run.
#[derive(Debug)]
struct Processor {
    preserve: PreserveRules,
    options: StripOptions,
    dry_run: bool,
    backup: bool,
    context_lines: usize,
}

pub fn run_with_config(cfg: RunConfig) -> Result<()> {
    let cwd = env::current_dir().context("Failed to read current directory")?;

    let loaded = match config::load(&cwd) {
        Ok(loaded) => loaded,
        Err(err) => {
            warn!("failed to load config, using defaults: {err:#}");
            LoadedConfig::defaults()
        }
    };
    match &loaded.path {
        Some(path) => debug!("config: {}", path.display()),
        None => debug!("config: built-in defaults"),
    }

    let processor = Processor {
        preserve: loaded.config.preserve_rules(),
        options: cfg.options,
        dry_run: cfg.dry_run,
        backup: cfg.backup,
        context_lines: cfg.context_lines.unwrap_or(loaded.config.context_lines),
    };

    match &cfg.target {
        Target::Git(scope) => processor.run_git(&cwd, *scope),
        Target::Path(path) => {
            let meta = fs::metadata(path)
                .with_context(|| format!("path not found: {}", path.display()))?;
            if meta.is_dir() {
                processor.run_directory(path, &cfg)
            } else {
                let display = path.display().to_string();
                processor
                    .process_file(path, &display, &LineRangeSet::whole_file(), false)
                    .map(|_| ())
            }
        }
    }
}

impl Processor {
    fn run_directory(&self, dir: &Path, cfg: &RunConfig) -> Result<()> {
        let files = collect_files(dir, cfg.recursive, cfg.no_gitignore, &cfg.excludes)?;
        if files.is_empty() {
            bail!("no supported files found in directory: {}", dir.display());
        }
        info!("found {} supported files to process", files.len());

        let mut had_error = false;
        for path in &files {
            let display = normalize_for_matching(path);
            if let Err(err) = self.process_file(path, &display, &LineRangeSet::whole_file(), false)
            {
                eprintln!("Error processing {}: {:#}", display, err);
                had_error = true;
            }
        }

        if had_error {
            bail!("One or more files could not be processed. See stderr for details.");
        }
        Ok(())
    }

    fn run_git(&self, cwd: &Path, scope: ChangeScope) -> Result<()> {
        let repo = Repo::discover(cwd)?;
        info!("git repository detected: {}", repo.root().display());

        let changes = repo
            .changes(scope)
            .context("failed to get git changes")?;
        if changes.is_empty() {
            println!("No changes found to process");
            return Ok(());
        }

        let ignored = shush_ignore(repo.root(), cwd);
        let supported: Vec<_> = changes
            .into_iter()
            .filter(|change| {
                let keep = is_supported_path(&change.path)
                    && !ignored
                        .matched_path_or_any_parents(&change.path, false)
                        .is_ignore()
                    && repo.root().join(&change.path).is_file();
                if !keep {
                    debug!("skipping {}", change.path.display());
                }
                keep
            })
            .collect();

        if supported.is_empty() {
            println!("No supported files found to process");
            return Ok(());
        }
        info!("found {} supported files with changes", supported.len());

        let mut totals = Totals::default();
        let mut had_error = false;

        for change in &supported {
            let path = repo.root().join(&change.path);
            let display = normalize_for_matching(&change.path);
            match self.process_file(&path, &display, &change.ranges, true) {
                Ok(outcome) => totals.add(&outcome),
                Err(err) => {
                    eprintln!("Error processing {}: {:#}", display, err);
                    had_error = true;
                }
            }
        }

        if self.dry_run && totals.files > 0 {
            preview::print_totals(&totals);
        }

        if had_error {
            bail!("One or more files could not be processed. See stderr for details.");
        }
        Ok(())
    }

    /// Strip one file, or preview it in dry-run mode.
    fn process_file(
        &self,
        path: &Path,
        display_path: &str,
        ranges: &LineRangeSet,
        git_scoped: bool,
    ) -> Result<FileOutcome> {
        let rule = language_for_path(path)?;
        debug!(
            "processing {} ({}; {})",
            display_path,
            language_name_for_path(path),
            describe_rule(&rule)
        );
        if git_scoped && ranges.is_whole_file() {
            debug!("processing entire file (untracked)");
        } else if git_scoped {
            debug!("processing {} line ranges", ranges.ranges().len());
        }

        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", display_path))?;
        let text = std::str::from_utf8(&bytes).map_err(|_| ShushError::NotUtf8 {
            path: display_path.to_string(),
        })?;

        let scanner = LineScanner::new(&rule, &self.preserve, self.options);
        let outcome = strip_source(text, &scanner, ranges);

        if self.dry_run {
            preview::print_preview(
                display_path,
                &outcome,
                git_scoped.then_some(ranges),
                self.context_lines,
            );
            return Ok(outcome);
        }

        if !outcome.is_modified() {
            info!("✓ No changes made to {}", display_path);
            return Ok(outcome);
        }

        if self.backup {
            let backup = create_backup(path)
                .with_context(|| format!("failed to create backup of {}", display_path))?;
            info!("✓ Backup created: {}", backup.display());
        }

        fs::write(path, outcome.render())
            .with_context(|| format!("Failed to write {}", display_path))?;
        info!("✓ Comments removed from {}", display_path);

        Ok(outcome)
    }
}

/// Copy `path` to `path.bak`, returning the backup path.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    let backup = PathBuf::from(name);
    fs::copy(path, &backup)?;
    Ok(backup)
}

/// Supported files under `root`, honouring git ignores, `.shushignore`
/// files and the user's `--exclude` globs.
pub fn collect_files(
    root: &Path,
    recursive: bool,
    no_gitignore: bool,
    excludes: &[String],
) -> Result<Vec<PathBuf>> {
    let exclude_globset = build_exclude_globset(excludes)?;

    let mut builder = WalkBuilder::new(root);
    if !recursive {
        builder.max_depth(Some(1));
    }

    if no_gitignore {
        builder
            .git_ignore(false)
            .git_exclude(false)
            .git_global(false)
            .ignore(false);
    } else {
        builder
            .git_ignore(true)
            .git_exclude(true)
            .git_global(true)
            .ignore(true)
            .require_git(false);
    }

    builder.add_custom_ignore_filename(IGNORE_FILE_NAME);
    if let Some(global) = global_ignore_path().filter(|p| p.is_file())
        && let Some(err) = builder.add_ignore(&global)
    {
        warn!("ignoring malformed {}: {err}", global.display());
    }

    // Values moved into the 'static filter closure must be owned separately.
    let root_for_filter = root.to_path_buf();

    builder.filter_entry(move |entry: &DirEntry| {
        // Always keep the root.
        if entry.depth() == 0 {
            return true;
        }

        // Apply user exclude globs, relative to the root.
        if let Some(ref gs) = exclude_globset {
            let path = entry.path();
            let rel = path.strip_prefix(&root_for_filter).unwrap_or(path);
            let rel_norm = normalize_for_matching(rel);

            if gs.is_match(&rel_norm) {
                return false;
            }

            // If this is a directory, also try a trailing slash to make patterns
            // like `tests/**` able to prune the whole subtree early.
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false)
                && !rel_norm.ends_with('/')
            {
                let rel_dir = format!("{rel_norm}/");
                if gs.is_match(&rel_dir) {
                    return false;
                }
            }
        }

        true
    });

    let mut files = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!("walk error: {err}");
                continue;
            }
        };

        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        if is_supported_path(entry.path()) {
            files.push(entry.into_path());
        } else {
            debug!("skipping unsupported file: {}", entry.path().display());
        }
    }

    files.sort();
    Ok(files)
}

/// Build a GlobSet from the user–provided `--exclude` patterns.
/// Returns `Ok(None)` if there are no patterns.
fn build_exclude_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();

    for pat in patterns {
        let pat = pat.trim();
        if pat.is_empty() {
            continue;
        }

        let glob =
            Glob::new(pat).with_context(|| format!("Invalid --exclude glob pattern: {pat}"))?;
        builder.add(glob);
    }

    let set = builder
        .build()
        .context("Failed to build exclude glob set")?;

    Ok(Some(set))
}

fn global_ignore_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(IGNORE_FILE_NAME))
}

/// `.shushignore` rules for git-scoped runs, whose paths come from git
/// rather than a directory walk.
fn shush_ignore(repo_root: &Path, cwd: &Path) -> Gitignore {
    let mut builder = GitignoreBuilder::new(repo_root);
    let candidates = [
        global_ignore_path(),
        Some(repo_root.join(IGNORE_FILE_NAME)),
        Some(cwd.join(IGNORE_FILE_NAME)),
    ];

    let mut seen = Vec::new();
    for path in candidates.into_iter().flatten() {
        if !path.is_file() || seen.contains(&path) {
            continue;
        }
        if let Some(err) = builder.add(&path) {
            warn!("ignoring malformed {}: {err}", path.display());
        }
        seen.push(path);
    }

    builder.build().unwrap_or_else(|err| {
        warn!("failed to build ignore rules: {err}");
        Gitignore::empty()
    })
}

/// Convert paths to a stable, slash-separated form for matching/printing.
fn normalize_for_matching(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    text.strip_prefix("./").map(str::to_string).unwrap_or(text)
}
