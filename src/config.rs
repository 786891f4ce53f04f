use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::preserve::{DEFAULT_PRESERVE, PreserveRules};

pub const CONFIG_FILE_NAME: &str = ".shush.toml";

const EXAMPLE_CONFIG: &str = r#"# Shush Configuration
# Patterns to preserve in comments (supports wildcards with *)
preserve = [
    "TODO:",
    "FIXME:",
    "HACK:",
    "XXX:",
    "@ts-ignore",
    "@ts-expect-error",
    "eslint-",
    "prettier-ignore",
    "pylint:",
    "mypy:",
    "type: ignore",
    "*IMPORTANT*",   # preserves any comment containing IMPORTANT
    "*DEBUG*",       # preserves any comment containing DEBUG
]

# Lines of surrounding context shown by --dry-run
context_lines = 0
"#;

/// Contents of a `.shush.toml` file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub preserve: Vec<String>,
    #[serde(default)]
    pub context_lines: usize,
}

impl Config {
    pub fn preserve_rules(&self) -> PreserveRules {
        if self.preserve.is_empty() {
            PreserveRules::default()
        } else {
            PreserveRules::new(self.preserve.clone())
        }
    }
}

/// A resolved configuration and the file it came from (`None` for defaults).
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    pub fn defaults() -> Self {
        Self {
            config: Config {
                preserve: DEFAULT_PRESERVE.iter().map(|p| p.to_string()).collect(),
                context_lines: 0,
            },
            path: None,
        }
    }
}

/// Load the nearest config: `./.shush.toml`, then the git root's, then
/// `~/.config/.shush.toml`, then built-in defaults.
pub fn load(cwd: &Path) -> Result<LoadedConfig> {
    match find_config(cwd) {
        Some(path) => {
            let config = load_from_file(&path)?;
            Ok(LoadedConfig {
                config,
                path: Some(path),
            })
        }
        None => Ok(LoadedConfig::defaults()),
    }
}

pub fn find_config(cwd: &Path) -> Option<PathBuf> {
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    if let Some(root) = find_git_root(cwd) {
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    global_config_path().filter(|p| p.is_file())
}

pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(CONFIG_FILE_NAME))
}

/// Walk up from `start` looking for a directory containing `.git`.
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

pub fn load_from_file(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn parse(text: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(text)?;
    if config.preserve.is_empty() {
        config.preserve = DEFAULT_PRESERVE.iter().map(|p| p.to_string()).collect();
    }
    Ok(config)
}

/// Write the example config into `dir`. Refuses to overwrite.
pub fn create_example_config(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    fs::write(&path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
