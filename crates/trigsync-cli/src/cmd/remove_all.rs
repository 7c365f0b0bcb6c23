use super::{build_reconciler, describe, load_project};
use crate::output::print_json;
use anyhow::Context;
use indexmap::IndexMap;
use std::path::Path;
use trigsync_core::dependency::update_dependencies;
use trigsync_core::reconcile::TriggerEnvs;
use trigsync_core::selection::DesiredState;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, mut state) = load_project(root)?;
    let previous = state
        .previous()
        .context("stored trigger selection is malformed")?
        .unwrap_or_default();

    let mutations = if previous.is_empty() {
        Vec::new()
    } else {
        build_reconciler(root, &config)?
            .remove_all(&previous, config.effective_prefix(), &config.target_root(root))
            .context("failed to remove trigger resources")?
    };

    let depends_on = update_dependencies(&state.depends_on, &IndexMap::new(), &config.trigger_provider);
    state.record(
        &DesiredState::default(),
        IndexMap::new(),
        TriggerEnvs::new(),
        depends_on,
    )?;
    state.save(root).context("failed to save trigger state")?;

    if json {
        return print_json(&serde_json::json!({ "mutations": mutations }));
    }
    if mutations.is_empty() {
        println!("No trigger resources to remove.");
    } else {
        for mutation in &mutations {
            println!("{}", describe(mutation));
        }
    }
    Ok(())
}
