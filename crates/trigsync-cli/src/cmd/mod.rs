pub mod apply;
pub mod choices;
pub mod config;
pub mod configure;
pub mod env;
pub mod init;
pub mod permissions;
pub mod remove_all;
pub mod status;

use crate::output::print_json;
use crate::prompt::OpenEditorHook;
use anyhow::Context;
use std::path::Path;
use trigsync_core::config::Config;
use trigsync_core::dependency::update_dependencies;
use trigsync_core::provision::CommandProvisioner;
use trigsync_core::reconcile::{
    Mutation, ReconcileReport, ReconcileRequest, Reconciler, ReconcilerSettings, TriggerEnvs,
};
use trigsync_core::selection::DesiredState;
use trigsync_core::state::TriggerState;

pub(crate) fn load_project(root: &Path) -> anyhow::Result<(Config, TriggerState)> {
    let config = Config::load(root).context("failed to load config")?;
    let state = TriggerState::load(root).context("failed to load trigger state")?;
    Ok((config, state))
}

/// Build a reconciler backed by the configured provisioner command.
pub(crate) fn build_reconciler(
    root: &Path,
    config: &Config,
) -> anyhow::Result<Reconciler<CommandProvisioner>> {
    let command = config.provisioner.resolved_command(root);
    let provisioner = CommandProvisioner::detect(&command);
    if let Some(p) = &provisioner {
        tracing::debug!(program = %p.program().display(), "using provisioner");
    }
    let settings = ReconcilerSettings {
        catalog_root: config.catalog_root(root),
        custom_template: config.custom_template_path(root),
        module_extension: config.module_extension.clone(),
        provider: config.provisioner.provider.clone(),
        service: config.provisioner.service.clone(),
    };
    Reconciler::new(settings, provisioner)
        .with_context(|| format!("provisioner '{}' is not available", config.provisioner.command))
}

/// Reconcile `desired`, then record the outcome and the refreshed
/// dependency list in the trigger state.
pub(crate) fn sync(
    root: &Path,
    config: &Config,
    state: &mut TriggerState,
    desired: &DesiredState,
    trigger_envs: TriggerEnvs,
    edit_hook: Option<OpenEditorHook>,
) -> anyhow::Result<ReconcileReport> {
    let previous = state.previous().context("stored trigger selection is malformed")?;
    let mut reconciler = build_reconciler(root, config)?;
    if let Some(hook) = edit_hook {
        reconciler = reconciler.with_edit_hook(hook);
    }

    let target_root = config.target_root(root);
    let request = ReconcileRequest {
        desired,
        previous: previous.as_ref(),
        resource_name_prefix: config.effective_prefix(),
        category: &config.category,
        target_root: &target_root,
        parent_stack: config.parent_stack.as_deref(),
        trigger_envs: &trigger_envs,
    };
    let report = reconciler.reconcile(&request).context("reconciliation failed")?;

    let depends_on =
        update_dependencies(&state.depends_on, &report.resources, &config.trigger_provider);
    state.record(desired, report.resources.clone(), trigger_envs, depends_on)?;
    state.save(root).context("failed to save trigger state")?;
    Ok(report)
}

pub(crate) fn print_report(report: &ReconcileReport, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(report);
    }
    if report.mutations.is_empty() {
        println!("Triggers are up to date.");
        return Ok(());
    }
    for mutation in &report.mutations {
        println!("{}", describe(mutation));
    }
    Ok(())
}

pub(crate) fn describe(mutation: &Mutation) -> String {
    match mutation {
        Mutation::ResourceAdded { kind, name } => format!("  added:   {name} ({kind})"),
        Mutation::ResourceUpdated { kind, name } => format!("  updated: {name} ({kind})"),
        Mutation::ResourceRemoved { kind, name } => format!("  removed: {name} ({kind})"),
        Mutation::ModuleCopied { path, .. } => format!("  created: {}", path.display()),
        Mutation::ModuleDeleted { path, .. } => format!("  deleted: {}", path.display()),
    }
}
