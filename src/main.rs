use std::env;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use shush::comments::{StripMode, StripOptions};
use shush::git::ChangeScope;
use shush::hooks::{self, HookScope};
use shush::{RunConfig, Target, config};
use tracing_subscriber::EnvFilter;

/// shush - strip comments from source files.
///
/// Removes line and block comments based on each file's extension. Comments
/// matching a preserve pattern (TODO:, FIXME:, @ts-ignore, ... or the
/// patterns in .shush.toml) are kept.
#[derive(Parser, Debug)]
#[command(
    name = "shush",
    author,
    version,
    about = "Remove comments from source code files",
    long_about = r#"Remove comments from source code files.

By default it:
  • detects comment syntax from the file extension
  • keeps comments matching preserve patterns from .shush.toml
  • deletes lines that held nothing but a comment
  • can limit itself to lines changed in git

Typical usage:
  shush main.py --dry-run
  shush src -r --backup
  shush --staged
"#
)]
struct Args {
    /// Source code file or directory to process.
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Remove only line comments.
    #[arg(long)]
    inline: bool,

    /// Remove only block comments.
    #[arg(long)]
    block: bool,

    /// Process directories recursively.
    #[arg(short = 'r', long)]
    recursive: bool,

    /// Show what would be removed without making changes.
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Create `<file>.bak` before modifying a file.
    #[arg(long)]
    backup: bool,

    /// Show detailed output.
    #[arg(long)]
    verbose: bool,

    /// Remove comments but keep comment-only lines as blank lines.
    #[arg(long = "preserve-lines")]
    preserve_lines: bool,

    /// Context lines to show around changes in --dry-run (default: from config).
    #[arg(short = 'c', long = "context-lines", value_name = "N")]
    context_lines: Option<usize>,

    /// Additional glob patterns to exclude when walking directories.
    ///
    /// Multiple flags and comma-separated values are both allowed.
    #[arg(
        long = "exclude",
        short = 'E',
        value_name = "GLOB",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    excludes: Vec<String>,

    /// Disable reading .gitignore / .ignore / git exclude files.
    #[arg(long = "no-gitignore")]
    no_gitignore: bool,

    /// Remove comments only from git changes (staged + unstaged + untracked).
    #[arg(long = "changes-only")]
    changes_only: bool,

    /// Remove comments only from staged git changes.
    #[arg(long)]
    staged: bool,

    /// Remove comments only from unstaged git changes and untracked files.
    #[arg(long)]
    unstaged: bool,

    /// Install the editor hook that runs `shush --changes-only` after edits.
    #[arg(long = "install-hook")]
    install_hook: bool,

    /// Uninstall the editor hook.
    #[arg(long = "uninstall-hook")]
    uninstall_hook: bool,

    /// List configured editor hooks.
    #[arg(long = "list-hooks")]
    list_hooks: bool,

    /// Check whether the shush hook is installed.
    #[arg(long = "hook-status")]
    hook_status: bool,

    /// Hook scope for --install-hook / --uninstall-hook.
    #[arg(short = 's', long = "hook-scope", value_enum, default_value_t = ScopeArg::User)]
    hook_scope: ScopeArg,

    /// Show current configuration and where it was loaded from.
    #[arg(long)]
    config: bool,

    /// Create an example .shush.toml in the current directory.
    #[arg(long = "create-config")]
    create_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    User,
    Project,
}

impl From<ScopeArg> for HookScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::User => HookScope::User,
            ScopeArg::Project => HookScope::Project,
        }
    }
}

impl Args {
    fn utility_count(&self) -> usize {
        [
            self.install_hook,
            self.uninstall_hook,
            self.list_hooks,
            self.hook_status,
            self.config,
            self.create_config,
        ]
        .into_iter()
        .filter(|f| *f)
        .count()
    }

    fn git_scope(&self) -> Option<ChangeScope> {
        if self.changes_only {
            Some(ChangeScope::All)
        } else if self.staged {
            Some(ChangeScope::Staged)
        } else if self.unstaged {
            Some(ChangeScope::Unstaged)
        } else {
            None
        }
    }

    fn git_count(&self) -> usize {
        [self.changes_only, self.staged, self.unstaged]
            .into_iter()
            .filter(|f| *f)
            .count()
    }

    /// Reject flag combinations that have no sensible meaning.
    fn validate(&self) -> Result<()> {
        let utilities = self.utility_count();
        let git = self.git_count();

        if utilities > 1 {
            bail!(
                "utility commands (--install-hook, --uninstall-hook, --list-hooks, --hook-status, --config, --create-config) are mutually exclusive"
            );
        }

        if utilities > 0 {
            if self.recursive
                || self.inline
                || self.block
                || self.dry_run
                || self.backup
                || self.verbose
            {
                bail!("hook commands cannot be combined with processing flags");
            }
            if git > 0 {
                bail!("hook commands cannot be combined with git flags");
            }
            return Ok(());
        }

        if git > 1 {
            bail!("git flags (--changes-only, --staged, --unstaged) are mutually exclusive");
        }
        if git > 0 && self.path.is_some() {
            bail!("cannot use git flags with explicit path argument");
        }
        if git > 0 && self.recursive {
            bail!("cannot use git flags with --recursive (git handles repository scope)");
        }
        if git == 0 && self.path.is_none() {
            bail!("path argument is required");
        }
        if self.inline && self.block {
            bail!("--inline and --block flags are mutually exclusive");
        }

        Ok(())
    }

    fn strip_options(&self) -> StripOptions {
        let mode = if self.inline {
            StripMode::LineOnly
        } else if self.block {
            StripMode::BlockOnly
        } else {
            StripMode::Both
        };

        StripOptions {
            mode,
            preserve_blank_lines: self.preserve_lines,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "shush=debug" } else { "shush=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run() -> Result<()> {
    let args = Args::parse();
    args.validate()?;
    init_logging(args.verbose);

    if args.utility_count() > 0 {
        return run_utility(&args);
    }

    let target = match (args.git_scope(), &args.path) {
        (Some(scope), _) => Target::Git(scope),
        (None, Some(path)) => Target::Path(path.clone()),
        (None, None) => bail!("path argument is required"),
    };

    let cfg = RunConfig {
        target,
        recursive: args.recursive,
        options: args.strip_options(),
        dry_run: args.dry_run,
        backup: args.backup,
        context_lines: args.context_lines,
        excludes: args.excludes,
        no_gitignore: args.no_gitignore,
    };

    shush::run_with_config(cfg)
}

fn run_utility(args: &Args) -> Result<()> {
    let cwd = env::current_dir()?;
    let scope = HookScope::from(args.hook_scope);

    if args.install_hook {
        hooks::install(scope, &cwd)
    } else if args.uninstall_hook {
        hooks::uninstall(scope, &cwd)
    } else if args.list_hooks {
        hooks::list(&cwd)
    } else if args.hook_status {
        hooks::status(&cwd)
    } else if args.config {
        show_config(&cwd)
    } else {
        let path = config::create_example_config(&cwd)?;
        println!("✓ Created {}", path.display());
        println!("  Edit this file to customize which comments to preserve");
        println!("  Patterns support wildcards with * (e.g., '*IMPORTANT*')");
        Ok(())
    }
}

fn show_config(cwd: &std::path::Path) -> Result<()> {
    let loaded = config::load(cwd)?;

    println!("Shush Configuration:");
    match &loaded.path {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: Using defaults (no config file found)"),
    }

    let rules = loaded.config.preserve_rules();
    println!("\nPreserve patterns ({}):", rules.patterns().len());
    for (i, pattern) in rules.patterns().iter().enumerate() {
        println!("  {:2}. {}", i + 1, pattern);
    }
    println!("\nContext lines: {}", loaded.config.context_lines);

    println!("\nConfig file search order:");
    println!("  1. {} (current directory)", config::CONFIG_FILE_NAME);
    println!("  2. {} (git repository root)", config::CONFIG_FILE_NAME);
    println!("  3. ~/.config/{} (global)", config::CONFIG_FILE_NAME);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("shush").chain(args.iter().copied())).unwrap()
    }

    fn error_of(args: &[&str]) -> String {
        parse(args).validate().unwrap_err().to_string()
    }

    #[test]
    fn single_git_flag_passes() {
        for flag in ["--staged", "--unstaged", "--changes-only"] {
            assert!(parse(&[flag]).validate().is_ok(), "{flag}");
        }
        assert!(parse(&["--staged", "--dry-run", "--verbose", "--backup"]).validate().is_ok());
        assert!(parse(&["--changes-only", "--inline"]).validate().is_ok());
        assert!(parse(&["--unstaged", "--block"]).validate().is_ok());
    }

    #[test]
    fn multiple_git_flags_fail() {
        assert_eq!(
            error_of(&["--staged", "--unstaged"]),
            "git flags (--changes-only, --staged, --unstaged) are mutually exclusive"
        );
    }

    #[test]
    fn git_flags_conflict_with_path_and_recursive() {
        assert_eq!(
            error_of(&["--staged", "src/"]),
            "cannot use git flags with explicit path argument"
        );
        assert_eq!(
            error_of(&["--unstaged", "-r"]),
            "cannot use git flags with --recursive (git handles repository scope)"
        );
    }

    #[test]
    fn path_required_without_git_or_utility() {
        assert_eq!(error_of(&[]), "path argument is required");
        assert!(parse(&["src/", "-r"]).validate().is_ok());
    }

    #[test]
    fn inline_and_block_are_exclusive() {
        assert_eq!(
            error_of(&["a.js", "--inline", "--block"]),
            "--inline and --block flags are mutually exclusive"
        );
    }

    #[test]
    fn utility_commands_are_exclusive() {
        assert!(error_of(&["--config", "--list-hooks"]).contains("mutually exclusive"));
        assert_eq!(
            error_of(&["--install-hook", "--dry-run"]),
            "hook commands cannot be combined with processing flags"
        );
        assert_eq!(
            error_of(&["--hook-status", "--staged"]),
            "hook commands cannot be combined with git flags"
        );
        assert!(parse(&["--install-hook", "-s", "project"]).validate().is_ok());
    }

    #[test]
    fn strip_options_follow_flags() {
        assert_eq!(parse(&["a.js", "--inline"]).strip_options().mode, StripMode::LineOnly);
        assert_eq!(parse(&["a.js", "--block"]).strip_options().mode, StripMode::BlockOnly);
        let opts = parse(&["a.js", "--preserve-lines"]).strip_options();
        assert_eq!(opts.mode, StripMode::Both);
        assert!(opts.preserve_blank_lines);
    }
}
