use crate::error::{Result, TriggerError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TRIGSYNC_DIR: &str = ".trigsync";
pub const CONFIG_FILE: &str = ".trigsync/config.yaml";
pub const STATE_FILE: &str = ".trigsync/state.yaml";

/// Suffix of every catalog metadata document (`<scope>.map.json`).
pub const MAP_SUFFIX: &str = ".map.json";

/// Generated resources live under `<target>/function/<name>`.
pub const FUNCTION_DIR: &str = "function";
/// Module sources live under `<resource dir>/src`.
pub const MODULE_SRC_DIR: &str = "src";
pub const MANIFEST_FILE: &str = ".trigsync-manifest.json";

/// Pseudo-template id for the bring-your-own module.
pub const CUSTOM_TEMPLATE: &str = "custom";

// ---------------------------------------------------------------------------
// Project paths
// ---------------------------------------------------------------------------

pub fn trigsync_dir(root: &Path) -> PathBuf {
    root.join(TRIGSYNC_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

// ---------------------------------------------------------------------------
// Catalog paths
// ---------------------------------------------------------------------------

pub fn catalog_map_path(catalog_path: &Path, scope_key: &str) -> PathBuf {
    catalog_path.join(format!("{scope_key}{MAP_SUFFIX}"))
}

/// Directory holding the template catalog and sources for one trigger kind.
pub fn kind_catalog_dir(catalog_root: &Path, kind: &str) -> PathBuf {
    catalog_root.join(kind)
}

pub fn template_source(catalog_root: &Path, kind: &str, template: &str, ext: &str) -> PathBuf {
    kind_catalog_dir(catalog_root, kind).join(module_file_name(template, ext))
}

pub fn module_file_name(template: &str, ext: &str) -> String {
    format!("{template}.{ext}")
}

// ---------------------------------------------------------------------------
// Generated resource paths
// ---------------------------------------------------------------------------

pub fn resource_name(prefix: &str, kind: &str) -> String {
    format!("{prefix}{kind}")
}

pub fn resource_dir(target_root: &Path, name: &str) -> PathBuf {
    target_root.join(FUNCTION_DIR).join(name)
}

pub fn module_dir(target_root: &Path, name: &str) -> PathBuf {
    resource_dir(target_root, name).join(MODULE_SRC_DIR)
}

pub fn manifest_path(target_root: &Path, name: &str) -> PathBuf {
    resource_dir(target_root, name).join(MANIFEST_FILE)
}

// ---------------------------------------------------------------------------
// Identifier validation
// ---------------------------------------------------------------------------

static KIND_RE: OnceLock<Regex> = OnceLock::new();

fn kind_re() -> &'static Regex {
    KIND_RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_\-]*$").unwrap())
}

/// Trigger kinds end up in directory and resource names, so they are kept to
/// a conservative identifier alphabet.
pub fn validate_kind(kind: &str) -> Result<()> {
    if kind.len() > 64 || !kind_re().is_match(kind) {
        return Err(TriggerError::InvalidKind(kind.to_string()));
    }
    Ok(())
}

/// Template ids become module file names inside a resource's source
/// directory and follow the same alphabet as kinds.
pub fn validate_template(template: &str) -> Result<()> {
    if template.len() > 64 || !kind_re().is_match(template) {
        return Err(TriggerError::InvalidTemplate(template.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
