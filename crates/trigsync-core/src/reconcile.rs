//! Artifact reconciliation: make generated resources and module files match
//! the desired trigger state.
//!
//! Kinds are handled one at a time, in desired order, then kinds that only
//! exist in the previous selection are removed. A failure stops the run
//! where it happened; whatever was already applied stays applied.
//!
//! Every generated resource directory carries a [`TriggerManifest`] recording
//! the modules and environment it was last provisioned with. A kind whose
//! manifest already matches is not provisioned again, which is what makes a
//! repeated run with the same inputs perform no mutations at all.

use crate::catalog::Catalog;
use crate::error::{Result, TriggerError};
use crate::io;
use crate::paths::{self, CUSTOM_TEMPLATE};
use crate::provision::{ProvisionRequest, Provisioner};
use crate::selection::{DesiredState, SelectionSet, TemplateList};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// One environment variable handed to a trigger function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEnv {
    pub key: String,
    pub value: String,
}

/// Kind -> environment variables for that kind's function.
pub type TriggerEnvs = IndexMap<String, Vec<TriggerEnv>>;

#[derive(Debug, Clone)]
pub struct ReconcileRequest<'a> {
    pub desired: &'a DesiredState,
    pub previous: Option<&'a SelectionSet>,
    pub resource_name_prefix: &'a str,
    pub category: &'a str,
    pub target_root: &'a Path,
    pub parent_stack: Option<&'a str>,
    pub trigger_envs: &'a TriggerEnvs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    ResourceAdded { kind: String, name: String },
    ResourceUpdated { kind: String, name: String },
    ResourceRemoved { kind: String, name: String },
    ModuleCopied { kind: String, template: String, path: PathBuf },
    ModuleDeleted { kind: String, path: PathBuf },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Kind -> generated resource name, for every desired kind.
    pub resources: IndexMap<String, String>,
    /// Side effects performed, in order.
    pub mutations: Vec<Mutation>,
}

/// One generated module file for a (kind, template) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub kind: String,
    pub template: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub exists: bool,
}

/// What a resource directory was last provisioned with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerManifest {
    pub trigger: String,
    pub modules: Vec<String>,
    pub trigger_envs: String,
}

impl TriggerManifest {
    fn read(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable trigger manifest");
                None
            }
        }
    }

    fn write(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        io::atomic_write(path, data.as_bytes())
    }
}

/// Called once for every module file the reconciler copies into place.
pub trait EditHook {
    fn module_created(&mut self, kind: &str, template: &str, path: &Path) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    pub catalog_root: PathBuf,
    pub custom_template: PathBuf,
    pub module_extension: String,
    pub provider: String,
    pub service: String,
}

pub struct Reconciler<P: Provisioner> {
    settings: ReconcilerSettings,
    provisioner: P,
    edit_hook: Option<Box<dyn EditHook>>,
}

impl<P: Provisioner> Reconciler<P> {
    /// A reconciler cannot exist without a provisioning backend.
    pub fn new(settings: ReconcilerSettings, provisioner: Option<P>) -> Result<Self> {
        let provisioner = provisioner.ok_or_else(|| {
            TriggerError::ProvisioningUnavailable("no provisioning backend configured".to_string())
        })?;
        Ok(Self {
            settings,
            provisioner,
            edit_hook: None,
        })
    }

    pub fn with_edit_hook(mut self, hook: impl EditHook + 'static) -> Self {
        self.edit_hook = Some(Box::new(hook));
        self
    }

    pub fn provisioner(&self) -> &P {
        &self.provisioner
    }

    pub fn reconcile(&mut self, request: &ReconcileRequest<'_>) -> Result<ReconcileReport> {
        validate(request)?;

        let mut report = ReconcileReport::default();
        for (kind, templates) in request.desired.iter() {
            let name = self.sync_kind(request, kind, templates, &mut report.mutations)?;
            report.resources.insert(kind.to_string(), name);
        }

        if let Some(previous) = request.previous {
            for kind in previous.kinds() {
                if request.desired.contains_kind(kind) {
                    continue;
                }
                if let Some(m) =
                    self.remove_kind(kind, request.resource_name_prefix, request.target_root)?
                {
                    report.mutations.push(m);
                }
            }
        }
        Ok(report)
    }

    /// Remove the resource of every kind in `previous`.
    pub fn remove_all(
        &mut self,
        previous: &SelectionSet,
        resource_name_prefix: &str,
        target_root: &Path,
    ) -> Result<Vec<Mutation>> {
        if resource_name_prefix.is_empty() {
            return Err(TriggerError::MissingParameter("resource name prefix"));
        }
        let mut mutations = Vec::new();
        for kind in previous.kinds() {
            paths::validate_kind(kind)?;
            if let Some(m) = self.remove_kind(kind, resource_name_prefix, target_root)? {
                mutations.push(m);
            }
        }
        Ok(mutations)
    }

    /// Module files `templates` of `kind` map to under `module_dir`.
    pub fn plan_artifacts(
        &self,
        kind: &str,
        templates: &TemplateList,
        module_dir: &Path,
    ) -> Vec<ArtifactRecord> {
        let ext = &self.settings.module_extension;
        templates
            .iter()
            .map(|template| {
                let source = if template == CUSTOM_TEMPLATE {
                    self.settings.custom_template.clone()
                } else {
                    paths::template_source(&self.settings.catalog_root, kind, template, ext)
                };
                let destination = module_dir.join(paths::module_file_name(template, ext));
                ArtifactRecord {
                    kind: kind.to_string(),
                    template: template.to_string(),
                    exists: destination.exists(),
                    source,
                    destination,
                }
            })
            .collect()
    }

    // ---------------------------------------------------------------------------
    // Per-kind steps
    // ---------------------------------------------------------------------------

    fn sync_kind(
        &mut self,
        request: &ReconcileRequest<'_>,
        kind: &str,
        templates: &TemplateList,
        mutations: &mut Vec<Mutation>,
    ) -> Result<String> {
        let name = paths::resource_name(request.resource_name_prefix, kind);
        let resource_dir = paths::resource_dir(request.target_root, &name);
        let module_dir = paths::module_dir(request.target_root, &name);
        let manifest_path = paths::manifest_path(request.target_root, &name);

        let artifacts = self.plan_artifacts(kind, templates, &module_dir);
        if let Some(missing) = artifacts.iter().find(|a| !a.exists && !a.source.is_file()) {
            return Err(TriggerError::TemplateNotFound(missing.source.clone()));
        }

        let envs = request.trigger_envs.get(kind).cloned().unwrap_or_default();
        let manifest = TriggerManifest {
            trigger: kind.to_string(),
            modules: templates.to_vec(),
            trigger_envs: serde_json::to_string(&envs)?,
        };
        let provisioned = TriggerManifest::read(&manifest_path);
        let needs_provisioning = provisioned.as_ref() != Some(&manifest);

        if needs_provisioning {
            let provision = ProvisionRequest {
                trigger: kind.to_string(),
                category: request.category.to_string(),
                modules: manifest.modules.clone(),
                resource_name: name.clone(),
                function_name: name.clone(),
                role_name: name.clone(),
                parent_stack: request.parent_stack.map(str::to_string),
                trigger_envs: manifest.trigger_envs.clone(),
                target_dir: resource_dir.clone(),
            };
            let in_previous = request
                .previous
                .is_some_and(|p| p.contains_kind(kind));
            let (provider, service) = (&self.settings.provider, &self.settings.service);
            if in_previous || resource_dir.exists() {
                self.provisioner.update(provider, service, &provision)?;
                tracing::info!(kind, resource = %name, "updated trigger resource");
                mutations.push(Mutation::ResourceUpdated {
                    kind: kind.to_string(),
                    name: name.clone(),
                });
            } else {
                self.provisioner.add(provider, service, &provision)?;
                tracing::info!(kind, resource = %name, "added trigger resource");
                mutations.push(Mutation::ResourceAdded {
                    kind: kind.to_string(),
                    name: name.clone(),
                });
            }
        } else {
            tracing::debug!(kind, resource = %name, "trigger resource up to date");
        }

        io::ensure_dir(&module_dir)?;
        for artifact in artifacts.iter().filter(|a| !a.exists) {
            if io::copy_if_missing(&artifact.source, &artifact.destination)? {
                tracing::info!(kind, template = %artifact.template, "copied module");
                mutations.push(Mutation::ModuleCopied {
                    kind: kind.to_string(),
                    template: artifact.template.clone(),
                    path: artifact.destination.clone(),
                });
                if let Some(hook) = self.edit_hook.as_mut() {
                    hook.module_created(kind, &artifact.template, &artifact.destination)?;
                }
            }
        }

        self.clean_modules(kind, templates, &module_dir, mutations)?;

        if needs_provisioning {
            manifest.write(&manifest_path)?;
        }
        Ok(name)
    }

    /// Delete module files that belong to templates no longer selected:
    /// catalog templates of `kind`, and the custom module. Anything else in
    /// the directory is left alone.
    fn clean_modules(
        &self,
        kind: &str,
        templates: &TemplateList,
        module_dir: &Path,
        mutations: &mut Vec<Mutation>,
    ) -> Result<()> {
        let catalog = Catalog::load(
            &paths::kind_catalog_dir(&self.settings.catalog_root, kind),
            kind,
        )?;
        let ext = self.settings.module_extension.as_str();

        let mut entries: Vec<PathBuf> = std::fs::read_dir(module_dir)?
            .map(|e| e.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        entries.sort();

        for path in entries {
            if path.extension().and_then(|e| e.to_str()) != Some(ext) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let recognized = stem == CUSTOM_TEMPLATE || catalog.contains(stem);
            if !recognized || templates.contains(stem) {
                continue;
            }
            io::remove_module(&path)?;
            tracing::info!(kind, module = stem, "deleted deselected module");
            mutations.push(Mutation::ModuleDeleted {
                kind: kind.to_string(),
                path,
            });
        }
        Ok(())
    }

    fn remove_kind(
        &mut self,
        kind: &str,
        resource_name_prefix: &str,
        target_root: &Path,
    ) -> Result<Option<Mutation>> {
        let name = paths::resource_name(resource_name_prefix, kind);
        let resource_dir = paths::resource_dir(target_root, &name);
        if !resource_dir.exists() {
            tracing::debug!(kind, resource = %name, "trigger resource already removed");
            return Ok(None);
        }
        self.provisioner.remove(
            &self.settings.provider,
            &self.settings.service,
            &name,
            &resource_dir,
        )?;
        tracing::info!(kind, resource = %name, "removed trigger resource");
        Ok(Some(Mutation::ResourceRemoved {
            kind: kind.to_string(),
            name,
        }))
    }
}

/// Reject bad input before any side effect.
fn validate(request: &ReconcileRequest<'_>) -> Result<()> {
    if request.resource_name_prefix.is_empty() {
        return Err(TriggerError::MissingParameter("resource name prefix"));
    }
    if request.category.is_empty() {
        return Err(TriggerError::MissingParameter("category"));
    }
    let previous = request.previous.into_iter().flat_map(SelectionSet::iter);
    for (kind, templates) in request.desired.iter().chain(previous) {
        paths::validate_kind(kind)?;
        for template in templates.iter() {
            paths::validate_template(template)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::fixture_catalog;
    use crate::provision::testing::{Call, RecordingProvisioner};
    use crate::selection::{merge, SelectionFragment};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct Fixture {
        catalog: TempDir,
        target: TempDir,
        envs: TriggerEnvs,
    }

    impl Fixture {
        fn new() -> Self {
            let catalog = fixture_catalog();
            std::fs::write(catalog.path().join("trigger-custom.js"), "// custom\n").unwrap();
            Self {
                catalog,
                target: TempDir::new().unwrap(),
                envs: TriggerEnvs::new(),
            }
        }

        fn reconciler(&self) -> Reconciler<RecordingProvisioner> {
            Reconciler::new(
                ReconcilerSettings {
                    catalog_root: self.catalog.path().to_path_buf(),
                    custom_template: self.catalog.path().join("trigger-custom.js"),
                    module_extension: "js".to_string(),
                    provider: "awscloudformation".to_string(),
                    service: "Lambda".to_string(),
                },
                Some(RecordingProvisioner::default()),
            )
            .unwrap()
        }

        fn request<'a>(
            &'a self,
            desired: &'a DesiredState,
            previous: Option<&'a SelectionSet>,
        ) -> ReconcileRequest<'a> {
            ReconcileRequest {
                desired,
                previous,
                resource_name_prefix: "myapp",
                category: "auth",
                target_root: self.target.path(),
                parent_stack: Some("authStack"),
                trigger_envs: &self.envs,
            }
        }

        fn module(&self, name: &str, file: &str) -> PathBuf {
            paths::module_dir(self.target.path(), name).join(file)
        }
    }

    fn desired(pairs: &[(&str, &[&str])]) -> DesiredState {
        let fragments: Vec<SelectionFragment> = pairs
            .iter()
            .map(|(k, t)| SelectionFragment::new(*k, t.iter().copied().collect()))
            .collect();
        merge(&fragments, None, &[])
    }

    #[test]
    fn new_kind_is_added_and_modules_copied() {
        let mut fx = Fixture::new();
        fx.envs.insert(
            "PreSignUp".to_string(),
            vec![TriggerEnv {
                key: "CAPTCHA_SECRET".to_string(),
                value: "s3cret".to_string(),
            }],
        );
        let d = desired(&[("PreSignUp", &["recaptcha", "custom"])]);
        let mut reconciler = fx.reconciler();

        let report = reconciler.reconcile(&fx.request(&d, None)).unwrap();

        assert_eq!(report.resources["PreSignUp"], "myappPreSignUp");
        let calls = &reconciler.provisioner().calls;
        assert_eq!(calls.len(), 1);
        let Call::Add(req) = &calls[0] else {
            panic!("expected add, got {:?}", calls[0]);
        };
        assert_eq!(req.trigger, "PreSignUp");
        assert_eq!(req.modules, vec!["recaptcha", "custom"]);
        assert_eq!(req.role_name, "myappPreSignUp");
        assert_eq!(req.parent_stack.as_deref(), Some("authStack"));
        assert_eq!(
            req.trigger_envs,
            r#"[{"key":"CAPTCHA_SECRET","value":"s3cret"}]"#
        );

        assert_eq!(
            std::fs::read_to_string(fx.module("myappPreSignUp", "recaptcha.js")).unwrap(),
            "// recaptcha\n"
        );
        assert_eq!(
            std::fs::read_to_string(fx.module("myappPreSignUp", "custom.js")).unwrap(),
            "// custom\n"
        );
        assert_eq!(report.mutations.len(), 3);
    }

    #[test]
    fn second_run_performs_no_mutations() {
        let fx = Fixture::new();
        let d = desired(&[("PreSignUp", &["recaptcha"]), ("PostConfirmation", &["add-to-group"])]);
        let mut reconciler = fx.reconciler();

        let first = reconciler.reconcile(&fx.request(&d, None)).unwrap();
        assert!(!first.mutations.is_empty());
        let calls_after_first = reconciler.provisioner().calls.len();

        let second = reconciler.reconcile(&fx.request(&d, None)).unwrap();
        assert!(second.mutations.is_empty(), "{:?}", second.mutations);
        assert_eq!(reconciler.provisioner().calls.len(), calls_after_first);
        assert_eq!(first.resources, second.resources);
    }

    #[test]
    fn update_copies_new_templates_without_overwriting_edits() {
        let fx = Fixture::new();
        let mut reconciler = fx.reconciler();
        let first = desired(&[("PreSignUp", &["recaptcha"])]);
        reconciler.reconcile(&fx.request(&first, None)).unwrap();

        let edited = fx.module("myappPreSignUp", "recaptcha.js");
        std::fs::write(&edited, "// my edits\n").unwrap();

        let previous = first.as_selection().clone();
        let next = desired(&[("PreSignUp", &["recaptcha", "email-filter-allowlist"])]);
        let report = reconciler.reconcile(&fx.request(&next, Some(&previous))).unwrap();

        assert_eq!(std::fs::read_to_string(&edited).unwrap(), "// my edits\n");
        assert!(fx.module("myappPreSignUp", "email-filter-allowlist.js").exists());
        assert!(matches!(
            report.mutations[0],
            Mutation::ResourceUpdated { ref kind, .. } if kind == "PreSignUp"
        ));
        assert!(matches!(reconciler.provisioner().calls.last(), Some(Call::Update(_))));
    }

    #[test]
    fn update_deletes_deselected_catalog_and_custom_modules_only() {
        let fx = Fixture::new();
        let mut reconciler = fx.reconciler();
        let first = desired(&[("PreSignUp", &["recaptcha", "email-filter-allowlist", "custom"])]);
        reconciler.reconcile(&fx.request(&first, None)).unwrap();
        let unrelated = fx.module("myappPreSignUp", "helpers.js");
        std::fs::write(&unrelated, "// user helper\n").unwrap();

        let previous = first.as_selection().clone();
        let next = desired(&[("PreSignUp", &["email-filter-allowlist"])]);
        let report = reconciler.reconcile(&fx.request(&next, Some(&previous))).unwrap();

        assert!(!fx.module("myappPreSignUp", "recaptcha.js").exists());
        assert!(!fx.module("myappPreSignUp", "custom.js").exists());
        assert!(fx.module("myappPreSignUp", "email-filter-allowlist.js").exists());
        assert!(unrelated.exists());
        let deleted = report
            .mutations
            .iter()
            .filter(|m| matches!(m, Mutation::ModuleDeleted { .. }))
            .count();
        assert_eq!(deleted, 2);
    }

    #[test]
    fn dropped_kind_is_removed_exactly_once() {
        let fx = Fixture::new();
        let mut reconciler = fx.reconciler();
        let first = desired(&[("PreSignUp", &["recaptcha"]), ("PostConfirmation", &["add-to-group"])]);
        reconciler.reconcile(&fx.request(&first, None)).unwrap();

        let previous = first.as_selection().clone();
        let next = desired(&[("PostConfirmation", &["add-to-group"])]);
        let report = reconciler.reconcile(&fx.request(&next, Some(&previous))).unwrap();
        reconciler.reconcile(&fx.request(&next, Some(&previous))).unwrap();

        assert_eq!(
            report.mutations,
            vec![Mutation::ResourceRemoved {
                kind: "PreSignUp".to_string(),
                name: "myappPreSignUp".to_string(),
            }]
        );
        let removes = reconciler
            .provisioner()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Remove(n) if n == "myappPreSignUp"))
            .count();
        assert_eq!(removes, 1);
        assert!(!paths::resource_dir(fx.target.path(), "myappPreSignUp").exists());
        assert!(!report.resources.contains_key("PreSignUp"));
    }

    #[test]
    fn missing_provisioner_fails_at_construction() {
        let result = Reconciler::<RecordingProvisioner>::new(
            ReconcilerSettings {
                catalog_root: PathBuf::from("triggers"),
                custom_template: PathBuf::from("triggers/trigger-custom.js"),
                module_extension: "js".to_string(),
                provider: "awscloudformation".to_string(),
                service: "Lambda".to_string(),
            },
            None,
        );
        assert!(matches!(
            result,
            Err(TriggerError::ProvisioningUnavailable(_))
        ));
    }

    #[test]
    fn missing_prefix_fails_before_side_effects() {
        let fx = Fixture::new();
        let mut reconciler = fx.reconciler();
        let d = desired(&[("PreSignUp", &["recaptcha"])]);
        let mut request = fx.request(&d, None);
        request.resource_name_prefix = "";

        let err = reconciler.reconcile(&request).unwrap_err();
        assert!(matches!(err, TriggerError::MissingParameter(_)));
        assert!(reconciler.provisioner().calls.is_empty());
        assert!(std::fs::read_dir(fx.target.path()).unwrap().next().is_none());
    }

    #[test]
    fn failure_keeps_earlier_kinds_applied() {
        let fx = Fixture::new();
        let mut reconciler = fx.reconciler();
        let d = desired(&[("PreSignUp", &["recaptcha"]), ("PostConfirmation", &["add-to-group"])]);
        let mut provisioner = RecordingProvisioner::default();
        provisioner.fail_on = Some("myappPostConfirmation".to_string());
        reconciler.provisioner = provisioner;

        let err = reconciler.reconcile(&fx.request(&d, None)).unwrap_err();
        assert!(matches!(err, TriggerError::ProvisioningFailed { .. }));
        assert!(fx.module("myappPreSignUp", "recaptcha.js").exists());
        assert!(!paths::resource_dir(fx.target.path(), "myappPostConfirmation").exists());
    }

    #[test]
    fn unknown_template_is_rejected_before_provisioning() {
        let fx = Fixture::new();
        let mut reconciler = fx.reconciler();
        let d = desired(&[("PreSignUp", &["does-not-exist"])]);
        let err = reconciler.reconcile(&fx.request(&d, None)).unwrap_err();
        assert!(matches!(err, TriggerError::TemplateNotFound(_)));
        assert!(reconciler.provisioner().calls.is_empty());
    }

    #[test]
    fn template_ids_with_path_segments_are_rejected() {
        let fx = Fixture::new();
        let mut reconciler = fx.reconciler();
        let d = desired(&[("PreSignUp", &["../PreSignUp/recaptcha"])]);

        let err = reconciler.reconcile(&fx.request(&d, None)).unwrap_err();
        assert!(matches!(err, TriggerError::InvalidTemplate(_)));
        assert!(reconciler.provisioner().calls.is_empty());
        assert!(std::fs::read_dir(fx.target.path()).unwrap().next().is_none());

        let stored: SelectionSet = [("PreSignUp", TemplateList::from_iter(["../x"]))]
            .into_iter()
            .collect();
        let ok = desired(&[("PreSignUp", &["recaptcha"])]);
        let err = reconciler.reconcile(&fx.request(&ok, Some(&stored))).unwrap_err();
        assert!(matches!(err, TriggerError::InvalidTemplate(_)));
        assert!(reconciler.provisioner().calls.is_empty());
    }

    #[test]
    fn deletion_failure_is_fatal() {
        let fx = Fixture::new();
        let mut reconciler = fx.reconciler();
        let first = desired(&[("PreSignUp", &["email-filter-allowlist"])]);
        reconciler.reconcile(&fx.request(&first, None)).unwrap();
        // A directory where a module file is expected cannot be unlinked.
        std::fs::create_dir_all(fx.module("myappPreSignUp", "recaptcha.js")).unwrap();

        let previous = first.as_selection().clone();
        let next = desired(&[("PreSignUp", &["email-filter-allowlist", "custom"])]);
        let err = reconciler.reconcile(&fx.request(&next, Some(&previous))).unwrap_err();
        assert!(matches!(err, TriggerError::ArtifactDeletion { .. }));
    }

    #[test]
    fn edit_hook_sees_each_new_module_once() {
        struct Recorder(Rc<RefCell<Vec<String>>>);
        impl EditHook for Recorder {
            fn module_created(&mut self, _kind: &str, template: &str, _path: &Path) -> Result<()> {
                self.0.borrow_mut().push(template.to_string());
                Ok(())
            }
        }

        let fx = Fixture::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut reconciler = fx.reconciler().with_edit_hook(Recorder(seen.clone()));
        let d = desired(&[("PreSignUp", &["recaptcha", "custom"])]);
        reconciler.reconcile(&fx.request(&d, None)).unwrap();
        reconciler.reconcile(&fx.request(&d, None)).unwrap();

        assert_eq!(*seen.borrow(), vec!["recaptcha", "custom"]);
    }

    #[test]
    fn remove_all_removes_every_previous_kind() {
        let fx = Fixture::new();
        let mut reconciler = fx.reconciler();
        let d = desired(&[("PreSignUp", &["recaptcha"]), ("PostConfirmation", &["add-to-group"])]);
        reconciler.reconcile(&fx.request(&d, None)).unwrap();

        let mutations = reconciler
            .remove_all(d.as_selection(), "myapp", fx.target.path())
            .unwrap();
        assert_eq!(mutations.len(), 2);
        assert!(!paths::resource_dir(fx.target.path(), "myappPreSignUp").exists());
        assert!(!paths::resource_dir(fx.target.path(), "myappPostConfirmation").exists());
    }

    #[test]
    fn plan_marks_existing_destinations() {
        let fx = Fixture::new();
        let reconciler = fx.reconciler();
        let module_dir = paths::module_dir(fx.target.path(), "myappPreSignUp");
        std::fs::create_dir_all(&module_dir).unwrap();
        std::fs::write(module_dir.join("custom.js"), "").unwrap();

        let plan = reconciler.plan_artifacts(
            "PreSignUp",
            &TemplateList::from_iter(["recaptcha", "custom"]),
            &module_dir,
        );
        assert!(!plan[0].exists);
        assert!(plan[0].source.ends_with("PreSignUp/recaptcha.js"));
        assert!(plan[1].exists);
        assert!(plan[1].source.ends_with("trigger-custom.js"));
    }
}
