//! Configuration file loading and discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".cache-code-updater.yaml",
    ".cache-code-updater.yml",
    "cache-code-updater.yaml",
    "cache-code-updater.yml",
];

const CONFIG_DIR_NAME: &str = "cache-code-updater";

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (`~/.config/cache-code-updater/`)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    search_dirs().iter().find_map(|dir| find_config_in_dir(dir))
}

/// Directories searched for a config file, in order.
#[must_use]
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(root) = find_git_root() {
        dirs.push(root);
    }
    if let Some(config_dir) = dirs::config_dir() {
        dirs.push(config_dir.join(CONFIG_DIR_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        dirs.push(home);
    }
    dirs
}

fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load an explicitly named config file, or the discovered one, or
/// defaults.
///
/// An explicit path that does not exist or does not parse is an error; a
/// broken discovered file only warns.
pub fn load_or_default(
    explicit_path: Option<&Path>,
) -> Result<(AppConfig, Option<PathBuf>), ConfigFileError> {
    if let Some(path) = explicit_path {
        return load_config_file(path).map(|config| (config, Some(path.to_path_buf())));
    }

    let Some(path) = discover_config_file(None) else {
        return Ok((AppConfig::default(), None));
    };
    match load_config_file(&path) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", path.display());
            Ok((config, Some(path)))
        }
        Err(e) => {
            tracing::warn!("Failed to load config from {}: {}", path.display(), e);
            Ok((AppConfig::default(), None))
        }
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// The default config, serialized.
#[must_use]
pub fn generate_example_config() -> String {
    format!(
        "# cache-code-updater configuration\n\
         # Place this file at .cache-code-updater.yaml in your project root or\n\
         # ~/.config/cache-code-updater/\n\n{}",
        serde_yaml::to_string(&AppConfig::default()).unwrap_or_default()
    )
}

/// A commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# cache-code-updater configuration
# ================================
#
# Place this file at:
#   - .cache-code-updater.yaml in your project root
#   - ~/.config/cache-code-updater/cache-code-updater.yaml for global config
#
# CLI flags always override file settings.

matching:
  # Script lines: similarity earned by an agreeing opcode, and on top of
  # that by an agreeing operand. The two should add up to at most 1.0.
  script:
    opcode: 0.7
    operand: 0.3
  # Flat definition records: per-field weights (unlisted fields weigh 1.0,
  # 0 ignores a field)
  record_fields:
    name: 2.0
    # examine: 0.0

rebase:
  # Operand families whose identities shift between cache revisions
  symbol_groups:
    - name: label
      kind: label
    - name: int
      kind: slot
      opcodes: [iload, istore]
      count_directive: .int_var_count
    - name: string
      kind: slot
      opcodes: [sload, sstore]
      count_directive: .string_var_count
  # Opcodes whose operand must name a defined label
  branch_opcodes:
    - jump
    - if_icmpeq
    - if_icmpne
    - if_icmplt
    - if_icmpgt
    - if_icmple
    - if_icmpge
    - branch_if_true
    - branch_if_false
  # Rename locally added labels that collide with new upstream labels
  rename_colliding_labels: true
  # Shift slot-count directives of the local header by the upstream change
  adjust_var_counts: false

pipeline:
  # Worker threads (omit for available parallelism)
  # workers: 4
  dry_run: false
  # Re-tokenize and check every rebased script before writing
  validate_output: true
  # Value written for ids whose object disappeared upstream
  lost_id: -1
  # Cache revision named in the journal subject
  # version: '231'

output:
  # Commit message for the batch
  # journal: ./COMMIT_MSG
  # text or json
  format: text
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
