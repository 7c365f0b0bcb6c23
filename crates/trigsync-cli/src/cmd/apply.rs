use super::{load_project, print_report, sync};
use anyhow::Context;
use std::path::Path;
use trigsync_core::reconcile::TriggerEnv;
use trigsync_core::selection::{merge, DesiredState, Removal, SelectionFragment, TemplateList};

pub fn run(
    root: &Path,
    select: &[String],
    remove: &[String],
    env: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let (config, mut state) = load_project(root)?;
    let previous = state.previous().context("stored trigger selection is malformed")?;

    // Without --select every current kind stays enabled.
    let fragments = if select.is_empty() {
        previous
            .clone()
            .map(|p| DesiredState::from_selection(p).fragments())
            .unwrap_or_default()
    } else {
        select
            .iter()
            .map(|s| parse_fragment(s))
            .collect::<anyhow::Result<Vec<_>>>()?
    };
    let removals: Vec<Removal> = remove
        .iter()
        .map(|s| parse_removals(s))
        .collect::<anyhow::Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    let desired = merge(&fragments, previous.as_ref(), &removals);

    let mut envs = state.trigger_envs.clone();
    for spec in env {
        let (kind, entry) = parse_env(spec)?;
        let values = envs.entry(kind).or_default();
        match values.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => existing.value = entry.value,
            None => values.push(entry),
        }
    }
    envs.retain(|kind, _| desired.contains_kind(kind));

    let report = sync(root, &config, &mut state, &desired, envs, None)?;
    print_report(&report, json)
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

fn split_kind(spec: &str) -> anyhow::Result<(&str, Vec<&str>)> {
    let (kind, templates) = spec
        .split_once('=')
        .with_context(|| format!("expected KIND=template[,template...], got '{spec}'"))?;
    let kind = kind.trim();
    if kind.is_empty() {
        anyhow::bail!("missing trigger kind in '{spec}'");
    }
    let templates = templates
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    Ok((kind, templates))
}

fn parse_fragment(spec: &str) -> anyhow::Result<SelectionFragment> {
    let (kind, templates) = split_kind(spec)?;
    Ok(SelectionFragment::new(kind, TemplateList::from_iter(templates)))
}

fn parse_removals(spec: &str) -> anyhow::Result<Vec<Removal>> {
    let (kind, templates) = split_kind(spec)?;
    if templates.is_empty() {
        anyhow::bail!("no templates to remove in '{spec}'");
    }
    Ok(templates.into_iter().map(|t| Removal::new(kind, t)).collect())
}

fn parse_env(spec: &str) -> anyhow::Result<(String, TriggerEnv)> {
    let parsed = spec
        .split_once(':')
        .and_then(|(kind, rest)| rest.split_once('=').map(|(key, value)| (kind, key, value)));
    let Some((kind, key, value)) = parsed else {
        anyhow::bail!("expected KIND:KEY=VALUE, got '{spec}'");
    };
    if kind.is_empty() || key.is_empty() {
        anyhow::bail!("expected KIND:KEY=VALUE, got '{spec}'");
    }
    Ok((
        kind.to_string(),
        TriggerEnv {
            key: key.to_string(),
            value: value.to_string(),
        },
    ))
}
