//! Editor hook registration in `.claude/settings.json`.
//!
//! The settings file belongs to another tool, so every key this module does
//! not model is carried through untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ShushError;

pub const SHUSH_COMMAND: &str = "shush --changes-only";
pub const HOOK_EVENT: &str = "PostToolUse";
pub const HOOK_MATCHER: &str = "Write|Edit|MultiEdit";
const HOOK_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookScope {
    User,
    Project,
}

impl HookScope {
    pub fn label(self) -> &'static str {
        match self {
            HookScope::User => "user-wide",
            HookScope::Project => "project",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HookEntry {
    fn is_shush(&self) -> bool {
        self.command.contains(SHUSH_COMMAND)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatcherGroup {
    #[serde(default)]
    pub matcher: String,
    #[serde(default)]
    pub hooks: Vec<HookEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Event name → ordered matcher groups. A missing section is an empty map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hooks: BTreeMap<String, Vec<MatcherGroup>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Settings {
    pub fn has_shush_hook(&self) -> bool {
        self.hooks
            .get(HOOK_EVENT)
            .is_some_and(|groups| groups.iter().flat_map(|g| &g.hooks).any(HookEntry::is_shush))
    }

    /// Register the hook, joining an existing group with the same matcher.
    pub fn add_shush_hook(&mut self) -> bool {
        if self.has_shush_hook() {
            return false;
        }

        let entry = HookEntry {
            kind: "command".to_string(),
            command: SHUSH_COMMAND.to_string(),
            timeout: Some(HOOK_TIMEOUT_SECS),
            extra: Map::new(),
        };

        let groups = self.hooks.entry(HOOK_EVENT.to_string()).or_default();
        match groups.iter_mut().find(|g| g.matcher == HOOK_MATCHER) {
            Some(group) => group.hooks.push(entry),
            None => groups.push(MatcherGroup {
                matcher: HOOK_MATCHER.to_string(),
                hooks: vec![entry],
                extra: Map::new(),
            }),
        }
        true
    }

    /// Drop every shush entry, then any group or event left empty.
    pub fn remove_shush_hook(&mut self) -> bool {
        let Some(groups) = self.hooks.get_mut(HOOK_EVENT) else {
            return false;
        };

        let mut removed = false;
        for group in groups.iter_mut() {
            let before = group.hooks.len();
            group.hooks.retain(|h| !h.is_shush());
            removed |= group.hooks.len() != before;
        }

        if removed {
            groups.retain(|g| !g.hooks.is_empty());
            if groups.is_empty() {
                self.hooks.remove(HOOK_EVENT);
            }
        }
        removed
    }

    /// `(event, matcher, command)` for every configured hook.
    pub fn entries(&self) -> Vec<(&str, &str, &str)> {
        self.hooks
            .iter()
            .flat_map(|(event, groups)| {
                groups.iter().flat_map(move |g| {
                    g.hooks
                        .iter()
                        .map(move |h| (event.as_str(), g.matcher.as_str(), h.command.as_str()))
                })
            })
            .collect()
    }
}

pub fn settings_path(scope: HookScope, cwd: &Path) -> Result<PathBuf> {
    let base = match scope {
        HookScope::User => dirs::home_dir().context("Failed to locate home directory")?,
        HookScope::Project => cwd.to_path_buf(),
    };
    Ok(base.join(".claude").join("settings.json"))
}

/// Load settings; a missing file is an empty configuration.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read settings {}", path.display()));
        }
    };

    if text.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse settings {}", path.display()))
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write settings {}", path.display()))
}

fn installed_at(scope: HookScope, cwd: &Path) -> Option<PathBuf> {
    let path = settings_path(scope, cwd).ok()?;
    let settings = load_settings(&path).ok()?;
    settings.has_shush_hook().then_some(path)
}

pub fn install(scope: HookScope, cwd: &Path) -> Result<()> {
    let user = installed_at(HookScope::User, cwd);
    let project = installed_at(HookScope::Project, cwd);

    match scope {
        HookScope::User => {
            if let Some(path) = user {
                return Err(ShushError::HookAlreadyInstalled {
                    path: path.display().to_string(),
                }
                .into());
            }
            if let Some(path) = project {
                println!("ℹ  Project-specific hooks found at {}", path.display());
                println!("   User-wide hooks will run in addition to project hooks");
            }
        }
        HookScope::Project => {
            if let Some(path) = user.or(project) {
                return Err(ShushError::HookAlreadyInstalled {
                    path: path.display().to_string(),
                }
                .into());
            }
        }
    }

    let path = settings_path(scope, cwd)?;
    let mut settings = load_settings(&path)?;
    settings.add_shush_hook();
    save_settings(&path, &settings)?;

    println!("✓ Hooks installed for {} scope at {}", scope.label(), path.display());
    println!("  Auto-cleanup will run after files are modified");
    Ok(())
}

pub fn uninstall(scope: HookScope, cwd: &Path) -> Result<()> {
    let path = settings_path(scope, cwd)?;
    let mut settings = load_settings(&path)?;

    if !settings.remove_shush_hook() {
        return Err(ShushError::HookNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    save_settings(&path, &settings)?;
    println!("✓ Hooks uninstalled for {} scope at {}", scope.label(), path.display());
    Ok(())
}

pub fn list(cwd: &Path) -> Result<()> {
    println!("Hooks configuration:");
    for scope in [HookScope::User, HookScope::Project] {
        let path = settings_path(scope, cwd)?;
        println!("{} ({}):", scope.label(), path.display());

        let settings = match load_settings(&path) {
            Ok(s) => s,
            Err(err) => {
                println!("  Unreadable: {err:#}");
                continue;
            }
        };

        let entries = settings.entries();
        if entries.is_empty() {
            println!("  No hooks configured");
            continue;
        }
        for (event, matcher, command) in entries {
            println!("  ✓ {command} ({event}: {matcher})");
        }
        if !settings.has_shush_hook() {
            println!("  (No shush hooks found)");
        }
    }
    Ok(())
}

pub fn status(cwd: &Path) -> Result<()> {
    let mut installed = Vec::new();

    println!("Shush hooks status:");
    for scope in [HookScope::User, HookScope::Project] {
        let path = settings_path(scope, cwd)?;
        let state = match load_settings(&path) {
            Ok(s) if s.has_shush_hook() => {
                installed.push(scope);
                "✓ Installed"
            }
            Ok(_) => "Not installed",
            Err(_) => "Not configured",
        };
        println!("{} ({}): {}", scope.label(), path.display(), state);
    }

    match installed.as_slice() {
        [HookScope::User, HookScope::Project] => {
            println!("\n⚠  Both user-wide and project hooks are installed");
            println!("   shush will run twice on every file modification");
            println!("   Consider: shush --uninstall-hook -s project");
        }
        [HookScope::User] => println!("\n✓ User-wide hooks cover all projects"),
        [HookScope::Project] => println!("\n✓ Project-specific hooks active for this project only"),
        _ => {}
    }
    Ok(())
}
