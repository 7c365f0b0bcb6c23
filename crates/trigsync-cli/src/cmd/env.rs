use super::load_project;
use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use trigsync_core::catalog::trigger_env_variables;
use trigsync_core::paths;

/// Required environment variables for the templates currently selected for
/// `kind`, with the stored value of each when one is set.
pub fn run(root: &Path, kind: &str, json: bool) -> anyhow::Result<()> {
    paths::validate_kind(kind)?;
    let (config, state) = load_project(root)?;
    let selection = state
        .previous()
        .context("stored trigger selection is malformed")?
        .unwrap_or_default();
    let Some(templates) = selection.get(kind) else {
        anyhow::bail!("trigger '{kind}' is not configured");
    };

    let required = trigger_env_variables(&config.catalog_root(root), kind, templates.iter())
        .with_context(|| format!("failed to read environment requirements for {kind}"))?;
    let stored = state.trigger_envs.get(kind);
    let value_of = |key: &str| -> Option<String> {
        stored?.iter().find(|e| e.key == key).map(|e| e.value.clone())
    };

    if json {
        let vars: Vec<serde_json::Value> = required
            .iter()
            .map(|key| serde_json::json!({ "key": key, "value": value_of(key) }))
            .collect();
        return print_json(&serde_json::json!({ "trigger": kind, "env": vars }));
    }

    if required.is_empty() {
        println!("{kind} requires no environment variables.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = required
        .iter()
        .map(|key| {
            vec![
                key.clone(),
                value_of(key).unwrap_or_else(|| "(unset)".to_string()),
            ]
        })
        .collect();
    print_table(&["KEY", "VALUE"], rows);
    Ok(())
}
