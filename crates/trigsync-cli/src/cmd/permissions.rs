use super::load_project;
use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use trigsync_core::catalog::trigger_permissions;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, state) = load_project(root)?;
    let selection = state
        .previous()
        .context("stored trigger selection is malformed")?
        .unwrap_or_default();
    let grants = trigger_permissions(&config.catalog_root(root), &selection)
        .context("failed to read permission grants")?;

    if json {
        return print_json(&grants);
    }
    if grants.is_empty() {
        println!("No permissions required.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = grants
        .iter()
        .map(|g| {
            let resources: Vec<String> = g
                .resources
                .iter()
                .map(|r| format!("{}.{}", r.resource_type, r.attribute))
                .collect();
            vec![
                g.policy_name.clone(),
                g.trigger.clone(),
                g.actions.join(", "),
                resources.join(", "),
            ]
        })
        .collect();
    print_table(&["POLICY", "TRIGGER", "ACTIONS", "RESOURCES"], rows);
    Ok(())
}
