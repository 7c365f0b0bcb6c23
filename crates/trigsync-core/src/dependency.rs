use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Category of every generated trigger resource.
pub const FUNCTION_CATEGORY: &str = "function";

/// Attributes a dependent resource reads from a trigger function.
pub const DEFAULT_ATTRIBUTES: [&str; 2] = ["Arn", "Name"];

/// Declares that the owning resource depends on one trigger's function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEntry {
    pub category: String,
    /// Trigger kind the function serves. Entries written by older tools may
    /// lack it; those are matched by resource name instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    pub resource_name: String,
    /// Provider tag grouping the entries this tracker owns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_provider: Option<String>,
    pub attributes: Vec<String>,
}

impl DependencyEntry {
    pub fn for_trigger(kind: &str, resource_name: &str, provider: &str) -> Self {
        Self {
            category: FUNCTION_CATEGORY.to_string(),
            trigger: Some(kind.to_string()),
            resource_name: resource_name.to_string(),
            trigger_provider: Some(provider.to_string()),
            attributes: DEFAULT_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn is_owned_by(&self, provider: &str) -> bool {
        self.trigger_provider.as_deref() == Some(provider)
    }

    /// Whether this entry stands for `kind` (served by `resource_name`).
    fn matches(&self, kind: &str, resource_name: &str) -> bool {
        match &self.trigger {
            Some(t) => t == kind,
            None => self.resource_name == resource_name,
        }
    }
}

/// Bring the entries owned by `provider` in line with `selected`
/// (kind -> generated resource name).
///
/// Kinds without an entry get one appended, in selection order. Entries of
/// `provider` whose kind is no longer selected are dropped, as are repeated
/// entries for the same kind (the first one wins). A surviving entry whose
/// resource name is stale is rewritten to the current name. Entries of other
/// providers pass through untouched and in place.
pub fn update_dependencies(
    existing: &[DependencyEntry],
    selected: &IndexMap<String, String>,
    provider: &str,
) -> Vec<DependencyEntry> {
    let mut result: Vec<DependencyEntry> = Vec::with_capacity(existing.len() + selected.len());
    let mut covered: Vec<&str> = Vec::new();

    for entry in existing {
        if !entry.is_owned_by(provider) {
            result.push(entry.clone());
            continue;
        }
        let Some((kind, name)) = selected
            .iter()
            .find(|(kind, name)| entry.matches(kind, name))
        else {
            tracing::debug!(resource = %entry.resource_name, "dropping dependency on deselected trigger");
            continue;
        };
        if covered.contains(&kind.as_str()) {
            continue;
        }
        covered.push(kind);
        if entry.resource_name == *name {
            result.push(entry.clone());
        } else {
            result.push(DependencyEntry {
                resource_name: name.clone(),
                ..entry.clone()
            });
        }
    }

    for (kind, name) in selected {
        if !covered.contains(&kind.as_str()) {
            result.push(DependencyEntry::for_trigger(kind, name, provider));
        }
    }
    result
}
