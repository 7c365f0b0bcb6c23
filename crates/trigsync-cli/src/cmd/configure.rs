use super::{load_project, print_report, sync};
use crate::prompt::{OpenEditorHook, StdinPrompter};
use anyhow::Context;
use std::path::Path;
use trigsync_core::catalog::trigger_env_variables;
use trigsync_core::flow::trigger_flow;
use trigsync_core::prompt::Prompter;
use trigsync_core::reconcile::{TriggerEnv, TriggerEnvs};
use trigsync_core::selection::{merge, DesiredState};

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, mut state) = load_project(root)?;
    let previous = state.previous().context("stored trigger selection is malformed")?;
    let mut prompter = StdinPrompter::new()?;

    let Some(outcome) = trigger_flow(
        &mut prompter,
        &config.resource,
        &config.category,
        &config.catalog_root(root),
        previous.as_ref(),
    )?
    else {
        println!("Trigger configuration left unchanged.");
        return Ok(());
    };

    let desired = merge(&outcome.fragments, previous.as_ref(), &outcome.removals);
    let envs = collect_envs(
        &mut prompter,
        &config.catalog_root(root),
        &desired,
        &state.trigger_envs,
    )?;

    let hook = if config.edit_prompt {
        Some(OpenEditorHook::new(StdinPrompter::new()?))
    } else {
        None
    };
    let report = sync(root, &config, &mut state, &desired, envs, hook)?;
    print_report(&report, json)
}

/// Environment values for every desired kind: values already stored are
/// kept, missing ones are asked for.
fn collect_envs(
    prompter: &mut dyn Prompter,
    catalog_root: &Path,
    desired: &DesiredState,
    stored: &TriggerEnvs,
) -> anyhow::Result<TriggerEnvs> {
    let mut envs = TriggerEnvs::new();
    for (kind, templates) in desired.iter() {
        let required = trigger_env_variables(catalog_root, kind, templates.iter())
            .with_context(|| format!("failed to read environment requirements for {kind}"))?;
        let known = stored.get(kind).map(Vec::as_slice).unwrap_or_default();
        let mut values = Vec::with_capacity(required.len());
        for key in required {
            let value = match known.iter().find(|e| e.key == key) {
                Some(existing) => existing.value.clone(),
                None => prompter.input(&format!("Enter a value for {key} ({kind})"))?,
            };
            values.push(TriggerEnv { key, value });
        }
        if !values.is_empty() {
            envs.insert(kind.to_string(), values);
        }
    }
    Ok(envs)
}
