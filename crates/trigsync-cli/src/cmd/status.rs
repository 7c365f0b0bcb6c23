use super::load_project;
use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, state) = load_project(root)?;
    let selection = state
        .previous()
        .context("stored trigger selection is malformed")?
        .unwrap_or_default();

    if json {
        let value = serde_json::json!({
            "resource": config.resource,
            "category": config.category,
            "prefix": config.effective_prefix(),
            "triggers": selection,
            "resources": state.resources,
            "trigger_envs": state.trigger_envs,
            "depends_on": state.depends_on,
            "last_updated": state.last_updated,
        });
        return print_json(&value);
    }

    println!("Resource:     {} ({})", config.resource, config.category);
    println!("Prefix:       {}", config.effective_prefix());
    println!("Last updated: {}", state.last_updated.format("%Y-%m-%d %H:%M:%S UTC"));

    if selection.is_empty() {
        println!("\nNo triggers configured.");
        return Ok(());
    }

    println!();
    let rows: Vec<Vec<String>> = selection
        .iter()
        .map(|(kind, templates)| {
            vec![
                kind.to_string(),
                templates.to_vec().join(", "),
                state.resources.get(kind).cloned().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["TRIGGER", "TEMPLATES", "RESOURCE"], rows);
    Ok(())
}
