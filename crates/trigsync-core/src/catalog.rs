//! Trigger and template metadata catalogs.
//!
//! A catalog directory holds a `<scope>.map.json` document describing the
//! choices available in that scope, next to the implementations themselves:
//! one subdirectory per trigger kind at the top level, one module file per
//! template inside each kind's directory. Only catalog entries that have a
//! matching implementation on disk are offered as choices.

use crate::error::{Result, TriggerError};
use crate::paths;
use crate::selection::SelectionSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Value carried by the "show more info" sentinel choice.
pub const LEARN_MORE: &str = "learn";

const LEARN_MORE_LABEL: &str = "Learn More";
const SEPARATOR_LABEL: &str = "--------------";
/// Top-level key holding a catalog-wide help link instead of an entry.
const CATALOG_URL_KEY: &str = "URL";

// ---------------------------------------------------------------------------
// Catalog entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attribute: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    pub policy_name: String,
    pub trigger: String,
    pub actions: Vec<String>,
    pub resources: Vec<ResourceRef>,
}

/// One trigger kind or one template module, depending on the catalog scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "URL", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<PermissionGrant>,
}

pub type TriggerCatalogEntry = CatalogEntry;
pub type TemplateCatalogEntry = CatalogEntry;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Catalog-wide help link; when present, "learn more" shows only this.
    pub url: Option<String>,
    entries: IndexMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn load(catalog_path: &Path, scope_key: &str) -> Result<Self> {
        let path = paths::catalog_map_path(catalog_path, scope_key);
        if !path.is_file() {
            return Err(TriggerError::CatalogNotFound(path));
        }
        let data = std::fs::read_to_string(&path)?;
        Self::parse(&path, &data)
    }

    fn parse(path: &Path, data: &str) -> Result<Self> {
        let raw: IndexMap<String, serde_json::Value> =
            serde_json::from_str(data).map_err(|e| TriggerError::CatalogParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut catalog = Catalog::default();
        for (id, value) in raw {
            if id == CATALOG_URL_KEY {
                if let serde_json::Value::String(url) = value {
                    catalog.url = Some(url);
                    continue;
                }
            }
            let entry: CatalogEntry =
                serde_json::from_value(value).map_err(|e| TriggerError::CatalogParse {
                    path: path.to_path_buf(),
                    reason: format!("entry '{id}': {e}"),
                })?;
            catalog.entries.insert(id, entry);
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Display name for `id`, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|e| e.name.as_str()).unwrap_or(id)
    }
}

// ---------------------------------------------------------------------------
// Choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Choice {
    LearnMore,
    Separator,
    Item { label: String, value: String },
}

impl Choice {
    pub fn item(label: impl Into<String>, value: impl Into<String>) -> Self {
        Choice::Item {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Choice::LearnMore => LEARN_MORE_LABEL,
            Choice::Separator => SEPARATOR_LABEL,
            Choice::Item { label, .. } => label,
        }
    }

    /// The separator carries no value.
    pub fn value(&self) -> Option<&str> {
        match self {
            Choice::LearnMore => Some(LEARN_MORE),
            Choice::Separator => None,
            Choice::Item { value, .. } => Some(value),
        }
    }

    pub fn is_selectable(&self) -> bool {
        !matches!(self, Choice::Separator)
    }
}

/// The "learn more" sentinel followed by the separator.
pub fn sentinel_choices() -> Vec<Choice> {
    vec![Choice::LearnMore, Choice::Separator]
}

/// List the selectable choices of `scope_key`.
///
/// Entries are kept in catalog order and filtered to those with an
/// implementation in `catalog_path`: a subdirectory when
/// `require_directory_entries` is set, a file (matched by stem) otherwise.
pub fn list_choices(
    catalog_path: &Path,
    scope_key: &str,
    require_directory_entries: bool,
) -> Result<Vec<Choice>> {
    let catalog = Catalog::load(catalog_path, scope_key)?;
    let implemented = implementations(catalog_path, require_directory_entries)?;

    let items: Vec<Choice> = catalog
        .iter()
        .filter(|(id, _)| implemented.contains(*id))
        .map(|(id, entry)| Choice::item(&entry.name, id))
        .collect();

    if items.is_empty() {
        return Err(TriggerError::NoImplementations(scope_key.to_string()));
    }

    let mut choices = sentinel_choices();
    choices.extend(items);
    Ok(choices)
}

fn implementations(catalog_path: &Path, directories: bool) -> Result<HashSet<String>> {
    let mut names = HashSet::new();
    for entry in std::fs::read_dir(catalog_path)? {
        let entry = entry?;
        let is_dir = entry.file_type()?.is_dir();
        if directories && is_dir {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        } else if !directories && !is_dir {
            if let Some(stem) = entry.path().file_stem() {
                names.insert(stem.to_string_lossy().into_owned());
            }
        }
    }
    Ok(names)
}

// ---------------------------------------------------------------------------
// Metadata lookups
// ---------------------------------------------------------------------------

/// Environment variable names required by the chosen `modules` of `kind`,
/// concatenated in module order without duplicates.
pub fn trigger_env_variables<'a>(
    catalog_root: &Path,
    kind: &str,
    modules: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<String>> {
    let catalog = Catalog::load(&paths::kind_catalog_dir(catalog_root, kind), kind)?;
    let mut env: Vec<String> = Vec::new();
    for module in modules {
        let Some(entry) = catalog.get(module) else {
            continue;
        };
        for name in &entry.env {
            if !env.contains(name) {
                env.push(name.clone());
            }
        }
    }
    Ok(env)
}

/// Every permission grant declared by a selected template, across all kinds.
pub fn trigger_permissions(
    catalog_root: &Path,
    selection: &SelectionSet,
) -> Result<Vec<PermissionGrant>> {
    let mut grants: Vec<PermissionGrant> = Vec::new();
    for (kind, templates) in selection.iter() {
        let catalog = Catalog::load(&paths::kind_catalog_dir(catalog_root, kind), kind)?;
        for template in templates.iter() {
            let Some(entry) = catalog.get(template) else {
                continue;
            };
            for grant in &entry.permissions {
                if !grants.contains(grant) {
                    grants.push(grant.clone());
                }
            }
        }
    }
    Ok(grants)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
